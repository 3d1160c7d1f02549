//! Dataset Loader/Normalizer
//!
//! Fetches the COVID-19 CSV once at startup and produces the read-only
//! `Dataset` shared by every request.
//!
//! # Architecture
//!
//! ```text
//! DatasetSource (HTTP | file) → DatasetLoader → Dataset (Arc, read-only)
//! ```

mod error;
mod loader;
mod source;
mod types;

pub use error::{RetrievalError, RetrievalResult};
pub use loader::{normalize, parse_date, DatasetLoader, RawObservation};
pub use source::{DatasetSource, FileSource, HttpSource};
pub use types::{CountrySummary, Dataset, Metric, Observation};

use crate::config::DatasetConfig;
use std::time::Duration;

/// Load the dataset described by `config`
///
/// Reads `config.file` when set, otherwise fetches `config.url`.
pub async fn load(config: &DatasetConfig) -> RetrievalResult<Dataset> {
    let loader = DatasetLoader::new(config.countries.clone());

    match &config.file {
        Some(path) => loader.load(&FileSource::new(path)).await,
        None => {
            let source = HttpSource::new(
                config.url.clone(),
                Duration::from_secs(config.fetch_timeout_secs),
            )?;
            loader.load(&source).await
        }
    }
}
