//! Chart Routes
//!
//! Endpoint the dashboard calls on every control change.
//!
//! - POST /api/v1/charts - Compute all charts for a selection

use axum::{extract::State, Json};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::ChartQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::dataset::{parse_date, Dataset};
use crate::query::{compute, AggregationMode, ChartData, ChartRequest};

/// POST /api/v1/charts
///
/// Recompute every chart for the submitted selection. Empty selections and
/// inverted date ranges return empty charts.
pub async fn render_charts(
    State(state): State<Arc<AppState>>,
    Json(query): Json<ChartQuery>,
) -> ApiResult<Json<ChartData>> {
    let request = resolve_request(&state.dataset, query)?;

    let start = Instant::now();
    let data = compute(&state.dataset, &request);

    tracing::debug!(
        countries = ?request.countries,
        start_date = %request.start_date,
        end_date = %request.end_date,
        mode = %request.mode,
        log_scale = request.log_scale,
        rows = data.meta.rows,
        elapsed_us = start.elapsed().as_micros() as u64,
        "Charts computed"
    );

    Ok(Json(data))
}

/// Decode a chart query, filling omitted dates from the dataset bounds
pub fn resolve_request(dataset: &Dataset, query: ChartQuery) -> ApiResult<ChartRequest> {
    let mode = match query.mode.as_deref() {
        Some(s) => s.parse::<AggregationMode>().map_err(ApiError::Validation)?,
        None => AggregationMode::default(),
    };

    let start_date = query.start_date.as_deref().map(parse_date_param).transpose()?;
    let end_date = query.end_date.as_deref().map(parse_date_param).transpose()?;

    let (start_date, end_date) = match (start_date, end_date) {
        (Some(start), Some(end)) => (start, end),
        (start, end) => {
            let (min, max) = dataset.date_bounds().ok_or_else(|| {
                ApiError::ServiceUnavailable("dataset has no rows".to_string())
            })?;
            (start.unwrap_or(min), end.unwrap_or(max))
        }
    };

    Ok(ChartRequest {
        countries: query.countries,
        start_date,
        end_date,
        mode,
        log_scale: query.log_scale,
    })
}

fn parse_date_param(s: &str) -> ApiResult<NaiveDate> {
    parse_date(s.trim())
        .ok_or_else(|| ApiError::Validation(format!("Cannot parse date: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{normalize, Metric, RawObservation};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dataset() -> Dataset {
        let rows = ["2021-01-01", "2021-01-05"]
            .iter()
            .map(|d| RawObservation {
                country: "India".to_string(),
                date: date(d),
                values: [Some(1.0); Metric::COUNT],
            })
            .collect();
        Dataset::from_sorted(normalize(rows))
    }

    fn query(json: &str) -> ChartQuery {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolve_defaults_to_bounds() {
        let request = resolve_request(&dataset(), query(r#"{"countries": ["India"]}"#)).unwrap();
        assert_eq!(request.start_date, date("2021-01-01"));
        assert_eq!(request.end_date, date("2021-01-05"));
        assert_eq!(request.mode, AggregationMode::Daily);
        assert!(!request.log_scale);
    }

    #[test]
    fn test_resolve_explicit_values() {
        let request = resolve_request(
            &dataset(),
            query(r#"{"countries": ["India"], "start_date": "2021-01-02T00:00:00", "mode": "cumulative", "log_scale": true}"#),
        )
        .unwrap();
        assert_eq!(request.start_date, date("2021-01-02"));
        assert_eq!(request.end_date, date("2021-01-05"));
        assert_eq!(request.mode, AggregationMode::Cumulative);
        assert!(request.log_scale);
    }

    #[test]
    fn test_inverted_range_is_not_an_error() {
        let request = resolve_request(
            &dataset(),
            query(r#"{"start_date": "2021-01-05", "end_date": "2021-01-01"}"#),
        )
        .unwrap();
        assert!(request.is_inverted());
    }

    #[test]
    fn test_bad_inputs_rejected() {
        let err = resolve_request(&dataset(), query(r#"{"start_date": "last week"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = resolve_request(&dataset(), query(r#"{"mode": "weekly"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_empty_dataset_needs_explicit_dates() {
        let empty = Dataset::default();
        let err = resolve_request(&empty, query("{}")).unwrap_err();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));

        let ok = resolve_request(
            &empty,
            query(r#"{"start_date": "2021-01-01", "end_date": "2021-01-02"}"#),
        );
        assert!(ok.is_ok());
    }
}
