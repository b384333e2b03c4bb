//! ECCC datamart client for thunderstorm outlooks.
//!
//! Enumerates candidate filenames for the current date and probes them one at
//! a time against the MSC datamart directory.

pub mod candidates;

use std::future::Future;
use std::time::Duration;

use common::Error;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

pub use candidates::Candidate;

/// Result of probing a single filename. Every variant other than `Found`
/// counts as a failed fetch, but none of them stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Value),
    NotFound,
    UnexpectedStatus(u16),
    Transport(String),
    InvalidPayload(String),
}

/// Anything that can answer "does this outlook file exist, and what is in it".
pub trait OutlookSource {
    fn fetch(&self, filename: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// HTTP client for the thunderstorm-outlooks directory.
#[derive(Debug, Clone)]
pub struct EcccClient {
    client: reqwest::Client,
    base_url: String,
}

impl EcccClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("thunderstorm-outlooks/0.1 (outlook aggregator)")
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build ECCC HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, filename.trim_start_matches('/'))
    }
}

impl OutlookSource for EcccClient {
    async fn fetch(&self, filename: &str) -> FetchOutcome {
        let url = self.url_for(filename);
        debug!("Attempting to fetch: {}", url);

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => return FetchOutcome::Transport(e.to_string()),
        };

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return FetchOutcome::NotFound,
            other => return FetchOutcome::UnexpectedStatus(other.as_u16()),
        }

        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Transport(e.to_string()),
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => FetchOutcome::Found(value),
            Err(e) => FetchOutcome::InvalidPayload(e.to_string()),
        }
    }
}
