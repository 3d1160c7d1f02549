//! Dataset Loader
//!
//! Turns the upstream CSV into a `Dataset`:
//!
//! ```text
//! fetch → header check → whitelist filter → parse dates → sort
//!       → de-duplicate → forward-fill per country → zero-fill
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use super::error::{RetrievalError, RetrievalResult};
use super::source::DatasetSource;
use super::types::{Dataset, Metric, Observation};

/// Column holding the country name
pub const COUNTRY_COLUMN: &str = "country";
/// Column holding the observation date
pub const DATE_COLUMN: &str = "date";

/// A parsed row before gap filling
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub country: String,
    pub date: NaiveDate,
    pub values: [Option<f64>; Metric::COUNT],
}

/// Column positions resolved from the header row
struct ColumnMap {
    country: usize,
    date: usize,
    metrics: [usize; Metric::COUNT],
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> RetrievalResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut missing = Vec::new();
        let country = position(COUNTRY_COLUMN);
        let date = position(DATE_COLUMN);
        if country.is_none() {
            missing.push(COUNTRY_COLUMN.to_string());
        }
        if date.is_none() {
            missing.push(DATE_COLUMN.to_string());
        }

        let mut metrics = [0usize; Metric::COUNT];
        for metric in Metric::ALL {
            match position(metric.column()) {
                Some(idx) => metrics[metric.index()] = idx,
                None => missing.push(metric.column().to_string()),
            }
        }

        match (country, date) {
            (Some(country), Some(date)) if missing.is_empty() => Ok(Self {
                country,
                date,
                metrics,
            }),
            _ => Err(RetrievalError::MissingColumns(missing)),
        }
    }
}

/// Loads and normalizes the dataset for a fixed country whitelist
pub struct DatasetLoader {
    countries: Vec<String>,
}

impl DatasetLoader {
    /// Create a loader restricted to `countries`
    pub fn new(countries: Vec<String>) -> Self {
        Self { countries }
    }

    /// Fetch from `source` and normalize
    pub async fn load(&self, source: &dyn DatasetSource) -> RetrievalResult<Dataset> {
        tracing::info!(source = %source.describe(), "Fetching dataset");
        let bytes = source.fetch().await?;
        tracing::info!(bytes = bytes.len(), "Dataset downloaded, normalizing");

        let dataset = self.load_bytes(&bytes)?;

        tracing::info!(
            rows = dataset.len(),
            countries = dataset.summaries().len(),
            "Dataset ready"
        );
        Ok(dataset)
    }

    /// Parse and normalize CSV bytes
    pub fn load_bytes(&self, bytes: &[u8]) -> RetrievalResult<Dataset> {
        let raw = self.parse(bytes)?;
        if raw.is_empty() {
            return Err(RetrievalError::NoRows(self.countries.clone()));
        }
        Ok(Dataset::from_sorted(normalize(raw)))
    }

    /// Parse whitelisted rows, leaving gaps as `None`
    pub fn parse(&self, bytes: &[u8]) -> RetrievalResult<Vec<RawObservation>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let columns = ColumnMap::from_headers(reader.headers()?)?;
        let whitelist: HashSet<&str> = self.countries.iter().map(String::as_str).collect();

        let mut rows = Vec::new();
        let mut skipped_cells = 0usize;

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let country = record.get(columns.country).unwrap_or("").trim();
            if !whitelist.contains(country) {
                continue;
            }

            let date_str = record.get(columns.date).unwrap_or("").trim();
            let date = parse_date(date_str).ok_or_else(|| RetrievalError::InvalidDate {
                line,
                value: date_str.to_string(),
            })?;

            let mut values = [None; Metric::COUNT];
            for metric in Metric::ALL {
                let cell = record.get(columns.metrics[metric.index()]).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(v) if v.is_finite() => values[metric.index()] = Some(v),
                    _ => {
                        skipped_cells += 1;
                        tracing::debug!(line, column = %metric, value = %cell, "Non-numeric cell treated as missing");
                    }
                }
            }

            rows.push(RawObservation {
                country: country.to_string(),
                date,
                values,
            });
        }

        if skipped_cells > 0 {
            tracing::warn!(skipped_cells, "Some numeric cells could not be parsed");
        }

        Ok(rows)
    }
}

/// Parse a date cell, tolerating a trailing time component
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Sort, de-duplicate and gap-fill raw rows
///
/// Forward-fill carries the last seen value of each metric within a country;
/// the carry resets at every country boundary. Anything still missing is 0.
pub fn normalize(mut raw: Vec<RawObservation>) -> Vec<Observation> {
    raw.sort_by(|a, b| a.country.cmp(&b.country).then(a.date.cmp(&b.date)));

    let before = raw.len();
    raw.dedup_by(|next, kept| next.country == kept.country && next.date == kept.date);
    if raw.len() < before {
        tracing::warn!(
            dropped = before - raw.len(),
            "Duplicate (country, date) rows dropped"
        );
    }

    let mut rows = Vec::with_capacity(raw.len());
    let mut last_seen: [Option<f64>; Metric::COUNT] = [None; Metric::COUNT];
    let mut current_country: Option<String> = None;

    for row in raw {
        if current_country.as_deref() != Some(row.country.as_str()) {
            last_seen = [None; Metric::COUNT];
            current_country = Some(row.country.clone());
        }

        let mut obs = Observation::new(row.country, row.date);
        for (i, value) in row.values.iter().enumerate() {
            if value.is_some() {
                last_seen[i] = *value;
            }
            obs.values[i] = last_seen[i].unwrap_or(0.0);
        }
        rows.push(obs);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        let mut cols = vec!["country".to_string(), "date".to_string(), "continent".to_string()];
        cols.extend(Metric::ALL.iter().map(|m| m.column().to_string()));
        cols.join(",")
    }

    /// Build a CSV line with `new_cases` and `stringency_index` set
    fn line(country: &str, date: &str, new_cases: &str, stringency: &str) -> String {
        let mut cells = vec![country.to_string(), date.to_string(), "Asia".to_string()];
        for metric in Metric::ALL {
            let cell = match metric {
                Metric::NewCases => new_cases,
                Metric::StringencyIndex => stringency,
                Metric::Population => "1000",
                _ => "",
            };
            cells.push(cell.to_string());
        }
        cells.join(",")
    }

    fn loader() -> DatasetLoader {
        DatasetLoader::new(vec!["India".to_string(), "France".to_string()])
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_load_filters_sorts_and_fills() {
        let csv = [
            header(),
            line("India", "2021-01-03", "", "50"),
            line("India", "2021-01-01", "10", ""),
            line("Germany", "2021-01-01", "99", "1"),
            line("France", "2021-01-01", "", ""),
            line("India", "2021-01-02", "", "40"),
            line("France", "2021-01-02", "7", "30"),
        ]
        .join("\n");

        let dataset = loader().load_bytes(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.countries().collect::<Vec<_>>(), vec!["France", "India"]);

        let india = dataset.rows_for("India");
        let dates: Vec<_> = india.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2021-01-01"), date("2021-01-02"), date("2021-01-03")]);

        // Forward-filled within India
        let cases: Vec<_> = india.iter().map(|r| r.get(Metric::NewCases)).collect();
        assert_eq!(cases, vec![10.0, 10.0, 10.0]);

        // Leading gap zero-filled, then carried
        let stringency: Vec<_> = india.iter().map(|r| r.get(Metric::StringencyIndex)).collect();
        assert_eq!(stringency, vec![0.0, 40.0, 50.0]);

        // France does not inherit India's values
        let france = dataset.rows_for("France");
        assert_eq!(france[0].get(Metric::NewCases), 0.0);
        assert_eq!(france[1].get(Metric::NewCases), 7.0);
    }

    #[test]
    fn test_no_value_missing_after_load() {
        let csv = [
            header(),
            line("India", "2021-01-01", "", ""),
            line("India", "2021-01-02", "abc", "12.5"),
        ]
        .join("\n");

        let dataset = loader().load_bytes(csv.as_bytes()).unwrap();
        for row in dataset.rows() {
            assert!(row.values.iter().all(|v| v.is_finite()));
        }
        assert_eq!(dataset.rows()[1].get(Metric::NewCases), 0.0);
    }

    #[test]
    fn test_missing_columns() {
        let csv = "country,date,new_cases\nIndia,2021-01-01,5\n";
        let err = loader().load_bytes(csv.as_bytes()).unwrap_err();

        match err {
            RetrievalError::MissingColumns(cols) => {
                assert!(cols.contains(&"total_cases".to_string()));
                assert!(!cols.contains(&"new_cases".to_string()));
                assert!(!cols.contains(&"date".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_date_is_fatal() {
        let csv = [header(), line("India", "01/02/2021x", "1", "1")].join("\n");
        let err = loader().load_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidDate { .. }));
    }

    #[test]
    fn test_invalid_date_outside_whitelist_is_ignored() {
        let csv = [
            header(),
            line("Germany", "garbage", "1", "1"),
            line("India", "2021-01-01", "1", "1"),
        ]
        .join("\n");
        let dataset = loader().load_bytes(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_no_whitelisted_rows() {
        let csv = [header(), line("Germany", "2021-01-01", "1", "1")].join("\n");
        let err = loader().load_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RetrievalError::NoRows(_)));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let csv = [
            header(),
            line("India", "2021-01-01", "5", ""),
            line("India", "2021-01-01", "6", ""),
        ]
        .join("\n");
        let dataset = loader().load_bytes(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows()[0].get(Metric::NewCases), 5.0);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2021-03-04"), Some(date("2021-03-04")));
        assert_eq!(parse_date("2021-03-04T00:00:00"), Some(date("2021-03-04")));
        assert_eq!(parse_date("2021-03-04 12:30:00"), Some(date("2021-03-04")));
        assert_eq!(parse_date("March 4"), None);
    }

    #[tokio::test]
    async fn test_load_from_file_source() {
        use super::super::source::FileSource;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", header()).unwrap();
        writeln!(file, "{}", line("France", "2021-01-01", "3", "20")).unwrap();

        let dataset = loader().load(&FileSource::new(file.path())).await.unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows()[0].get(Metric::Population), 1000.0);
    }
}
