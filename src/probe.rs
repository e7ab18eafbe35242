//! One round trip against the Prometheus query endpoint.

use std::time::Duration;

use color_eyre::eyre::{Context, Report};
use reqwest::{IntoUrl, StatusCode, Url};
use tracing::{debug, warn};

use crate::api::ApiResponse;

/// Everything that can go wrong during a run. All of it is CRITICAL.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("API request error: {0}")]
    Request(#[source] reqwest::Error),
    #[error("API request error: {0}")]
    Status(StatusCode),
    #[error("API response read error: {0}")]
    Read(#[source] reqwest::Error),
    #[error("API response parse error {0}")]
    Parse(#[source] serde_json::Error),
    #[error("API response error - no data")]
    NoData,
    #[error("API response error - malformed value")]
    MalformedValue,
    #[error("{0}")]
    Value(String),
    #[error("unable to scrape instance {0}")]
    NotScraped(String),
}

/// Issues instant queries against a single Prometheus endpoint.
pub struct ScrapeProbe {
    /// the `/api/v1/query` endpoint
    url: Url,
    client: reqwest::Client,
}

impl ScrapeProbe {
    pub fn new(url: impl IntoUrl, timeout: Option<Duration>) -> Result<Self, Report> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            url: url.into_url().wrap_err("ScrapeProbe: invalid query endpoint")?,
            client: builder.build().wrap_err("ScrapeProbe: building HTTP client")?,
        })
    }

    /// Runs `query` and returns the value of the first sample as text.
    pub async fn query(&self, query: &str) -> Result<String, ProbeError> {
        debug!(url = %self.url, query, "querying prometheus");
        let res = self.fetch(query).await;
        match &res {
            Ok(value) => debug!(query, value = %value, "prometheus answered"),
            Err(e) => warn!(query, error = %e, "probe failed"),
        }
        res
    }

    async fn fetch(&self, query: &str) -> Result<String, ProbeError> {
        let resp = self
            .client
            .get(self.url.clone())
            .query(&[("query", query)])
            .send()
            .await
            .map_err(ProbeError::Request)?;

        if resp.status() != StatusCode::OK {
            return Err(ProbeError::Status(resp.status()));
        }

        let body = resp.text().await.map_err(ProbeError::Read)?;
        let parsed: ApiResponse = serde_json::from_str(&body).map_err(ProbeError::Parse)?;
        parsed
            .first()
            .ok_or(ProbeError::NoData)?
            .value_text()
            .ok_or(ProbeError::MalformedValue)
    }
}
