//! Dataset error types
//!
//! Every failure here is fatal at startup: the dashboard has nothing to show
//! without data.

use thiserror::Error;

/// Errors that can occur while retrieving and normalizing the dataset
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status} for {url}")]
    Status { url: String, status: u16 },

    /// Local file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV was malformed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Header lacks required columns
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A whitelisted row has a date that cannot be parsed
    #[error("Invalid date {value:?} on line {line}")]
    InvalidDate { line: u64, value: String },

    /// No row matched the country whitelist
    #[error("No rows found for countries: {}", .0.join(", "))]
    NoRows(Vec<String>),
}

/// Result type alias for dataset operations
pub type RetrievalResult<T> = Result<T, RetrievalError>;
