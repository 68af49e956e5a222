use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    StatusCode,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    /// Non-2xx response. The message uses the canonical reason phrase for the
    /// code, not the server's own status line.
    #[error("Failed to fetch paste count: {0}")]
    Status(StatusCode),
    #[error("Failed to fetch paste count: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Malformed paste count response: {0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasteCountResponse {
    num_pastes: u64,
}

#[async_trait]
pub trait PasteCountSource: Send + Sync {
    async fn fetch_paste_count(&self) -> Result<u64, FetchError>;
}

#[derive(Clone, Debug)]
pub struct PasteCountClient {
    http: reqwest::Client,
    url: String,
}

impl PasteCountClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PasteCountSource for PasteCountClient {
    async fn fetch_paste_count(&self) -> Result<u64, FetchError> {
        let start = std::time::Instant::now();
        let response = self
            .http
            .get(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let parsed: PasteCountResponse = serde_json::from_str(&body)?;
        debug!("Got paste count {} in {:?}", parsed.num_pastes, start.elapsed());
        Ok(parsed.num_pastes)
    }
}
