//! HTTP page client for the remote holiday calendar.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid table selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Settings for talking to the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Country page without a year, e.g. `https://www.officeholidays.com/countries/malaysia`.
    pub base_url: String,
    /// CSS selector of the holiday table.
    pub table_selector: String,
    /// Per-request timeout. Requests are not retried.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.officeholidays.com/countries/malaysia".to_string(),
            table_selector: "table.country-table".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Something that can GET a page body.
#[async_trait]
pub trait PageClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed [`PageClient`].
pub struct HttpPageClient {
    client: reqwest::Client,
}

impl HttpPageClient {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageClient for HttpPageClient {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        info!(url = %url, "fetching holiday page");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}
