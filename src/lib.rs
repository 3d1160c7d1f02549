//! # COVID-19 Dashboard
//!
//! Backend for an interactive COVID-19 dashboard: loads the Our World in Data
//! dataset once, then turns dashboard selections (countries, date range,
//! daily/cumulative, log/linear) into chart-ready series.
//!
//! ## Modules
//!
//! - [`dataset`]: Fetch, whitelist, sort and gap-fill the upstream CSV
//! - [`query`]: Filter, aggregate and package charts
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covid_dashboard::config::DatasetConfig;
//! use covid_dashboard::query::{compute, AggregationMode, ChartId, ChartRequest};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = covid_dashboard::dataset::load(&DatasetConfig::default()).await?;
//!
//!     let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//!     let end = NaiveDate::from_ymd_opt(2021, 3, 31).unwrap();
//!     let request = ChartRequest::new(&["India", "France"], start, end)
//!         .mode(AggregationMode::Cumulative);
//!
//!     let charts = compute(&dataset, &request);
//!     if let Some(cases) = charts.chart(ChartId::Cases) {
//!         println!("{}: {} points", cases.title, cases.points.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dataset;
pub mod query;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, DatasetConfig, LoggingConfig};

pub use dataset::{Dataset, DatasetLoader, Metric, Observation, RetrievalError};

pub use query::{compute, AggregationMode, ChartData, ChartId, ChartRequest, FilteredView};
