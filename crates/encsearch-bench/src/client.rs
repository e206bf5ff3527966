//! Thin HTTP client over the gateway REST surface.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use encsearch_core::{SearchField, SearchMode, SearchOperator, SearchResponse, ThrottleStats};

/// Errors surfaced by the test client.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned HTTP {status}: {message}")]
    Gateway { status: u16, message: String },
}

/// Health endpoint payload, as served by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    pub version: String,
    pub primary_connected: bool,
    pub secondary_connected: bool,
    pub primary_records: u64,
    #[serde(default)]
    pub throttle: Option<ThrottleStats>,
    pub timestamp: String,
}

impl HealthSnapshot {
    pub fn is_healthy(&self) -> bool {
        self.primary_connected && self.secondary_connected
    }
}

/// HTTP client bound to one gateway base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BenchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one search. Equality requests use the short route; every other
    /// operator is spelled out in the path.
    pub async fn search(
        &self,
        field: SearchField,
        operator: SearchOperator,
        value: &str,
        mode: SearchMode,
        limit: Option<usize>,
    ) -> Result<SearchResponse, BenchError> {
        let url = format!("{}{}", self.base_url, search_path(field, operator));
        let mut request = self
            .http
            .get(&url)
            .query(&[("value", value), ("mode", mode.as_str())]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        parse(request.send().await?).await
    }

    pub async fn health(&self) -> Result<HealthSnapshot, BenchError> {
        let url = format!("{}/health", self.base_url);
        parse(self.http.get(&url).send().await?).await
    }
}

fn search_path(field: SearchField, operator: SearchOperator) -> String {
    match operator {
        SearchOperator::Equality => format!("/api/v1/customers/search/{field}"),
        other => format!("/api/v1/customers/search/{field}/{other}"),
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, BenchError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BenchError::Gateway {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}
