//! Chart Requests
//!
//! The selection state the dashboard sends on every control change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How case and death counters are aggregated
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Raw per-day values
    #[default]
    Daily,
    /// Running sum per country, restarting at the window start
    Cumulative,
}

impl AggregationMode {
    /// Title-case label used in chart titles
    pub fn label(self) -> &'static str {
        match self {
            AggregationMode::Daily => "Daily",
            AggregationMode::Cumulative => "Cumulative",
        }
    }
}

impl FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(AggregationMode::Daily),
            "cumulative" => Ok(AggregationMode::Cumulative),
            other => Err(format!(
                "Invalid mode: {}. Use daily or cumulative",
                other
            )),
        }
    }
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationMode::Daily => write!(f, "daily"),
            AggregationMode::Cumulative => write!(f, "cumulative"),
        }
    }
}

/// A fully resolved chart request
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub countries: Vec<String>,
    /// Inclusive start
    pub start_date: NaiveDate,
    /// Inclusive end
    pub end_date: NaiveDate,
    pub mode: AggregationMode,
    /// Only affects axis metadata
    pub log_scale: bool,
}

impl ChartRequest {
    /// Daily, linear request
    pub fn new(countries: &[&str], start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            countries: countries.iter().map(|c| c.to_string()).collect(),
            start_date,
            end_date,
            mode: AggregationMode::Daily,
            log_scale: false,
        }
    }

    /// Builder method: set the aggregation mode
    pub fn mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method: set the log scale flag
    pub fn log_scale(mut self, log_scale: bool) -> Self {
        self.log_scale = log_scale;
        self
    }

    /// True when the date window cannot contain any row
    pub fn is_inverted(&self) -> bool {
        self.start_date > self.end_date
    }
}
