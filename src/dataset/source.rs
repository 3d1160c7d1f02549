//! Dataset Sources
//!
//! Where the raw CSV comes from: the upstream HTTP endpoint in production, a
//! local file for offline runs and tests.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{RetrievalError, RetrievalResult};

/// Common trait for all dataset sources
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable location, used in logs
    fn describe(&self) -> String;

    /// Fetch the raw CSV bytes
    async fn fetch(&self) -> RetrievalResult<Vec<u8>>;
}

/// Fetches the CSV over HTTP
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create a source for `url` with a request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> RetrievalResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("covid-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> RetrievalResult<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!(url = %self.url, bytes = body.len(), "Fetched dataset");
        Ok(body.to_vec())
    }
}

/// Reads the CSV from disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> RetrievalResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_reads_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "country,date\nIndia,2021-01-01\n").unwrap();

        let source = FileSource::new(file.path());
        let bytes = source.fetch().await.unwrap();

        assert_eq!(bytes, b"country,date\nIndia,2021-01-01\n");
        assert_eq!(source.describe(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("absent.csv"));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, RetrievalError::Io(_)));
    }

    #[test]
    fn test_http_source_keeps_url() {
        let source = HttpSource::new("http://localhost:9/compact.csv", Duration::from_secs(1)).unwrap();
        assert_eq!(source.describe(), "http://localhost:9/compact.csv");
    }
}
