//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::CountrySummary;
use crate::query::AggregationMode;

// ============================================
// CHART DTOs
// ============================================

/// Chart request as sent by the dashboard controls
///
/// Dates are strings (`YYYY-MM-DD`, optionally with a time part) and default
/// to the dataset bounds.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Selected countries
    #[serde(default)]
    pub countries: Vec<String>,
    /// Inclusive start date
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive end date
    #[serde(default)]
    pub end_date: Option<String>,
    /// Log-scale y axis for cases and deaths
    #[serde(default)]
    pub log_scale: bool,
    /// "daily" or "cumulative"
    #[serde(default)]
    pub mode: Option<String>,
}

// ============================================
// CONTROL DTOs
// ============================================

/// Initial state of the dashboard controls
#[derive(Debug, Serialize)]
pub struct ControlsResponse {
    pub title: String,
    /// Country dropdown options
    pub countries: Vec<String>,
    /// Preselected countries
    pub default_selection: Vec<String>,
    /// Date picker bounds and initial range
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub modes: Vec<AggregationMode>,
    pub default_mode: AggregationMode,
    pub log_scale: bool,
}

/// Loaded countries
#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<CountrySummary>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Rows in the loaded dataset
    pub rows: usize,
    /// Countries in the loaded dataset
    pub countries: usize,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Version string
    pub version: String,
}
