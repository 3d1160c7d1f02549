//! Control Routes
//!
//! What the dashboard needs to build its input widgets.
//!
//! - GET /api/v1/controls - Dropdown options, date bounds and defaults
//! - GET /api/v1/countries - Loaded countries with row counts

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{ControlsResponse, CountriesResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::DEFAULT_SELECTION;
use crate::query::AggregationMode;

/// Dashboard title
pub const DASHBOARD_TITLE: &str = "COVID-19 Interactive Dashboard";

/// GET /api/v1/controls
pub async fn get_controls(State(state): State<Arc<AppState>>) -> ApiResult<Json<ControlsResponse>> {
    let (min_date, max_date) = state
        .dataset
        .date_bounds()
        .ok_or_else(|| ApiError::ServiceUnavailable("dataset has no rows".to_string()))?;

    let countries: Vec<String> = state.dataset.countries().map(str::to_string).collect();
    let default_selection = DEFAULT_SELECTION
        .iter()
        .filter(|c| state.dataset.contains_country(c))
        .map(|c| c.to_string())
        .collect();

    Ok(Json(ControlsResponse {
        title: DASHBOARD_TITLE.to_string(),
        countries,
        default_selection,
        min_date,
        max_date,
        modes: vec![AggregationMode::Daily, AggregationMode::Cumulative],
        default_mode: AggregationMode::default(),
        log_scale: false,
    }))
}

/// GET /api/v1/countries
pub async fn list_countries(State(state): State<Arc<AppState>>) -> Json<CountriesResponse> {
    Json(CountriesResponse {
        countries: state.dataset.summaries(),
    })
}
