//! HTTP source.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use lengua_core::error::LoadError;

use crate::source::ItemSource;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches a data file with a GET request.
pub struct HttpSource {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LoadError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.to_string(),
            timeout_secs,
            client,
        })
    }
}

#[async_trait]
impl ItemSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LoadError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    LoadError::Unreachable(format!("{} not reachable", self.url))
                } else {
                    LoadError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(LoadError::Status {
                status,
                location: self.url.clone(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout(self.timeout_secs)
            } else {
                LoadError::Unreachable(format!("failed to read body from {}: {e}", self.url))
            }
        })
    }
}
