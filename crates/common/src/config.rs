//! Fetcher configuration types.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://dd.alpha.weather.gc.ca/thunderstorm-outlooks";
pub const DEFAULT_OUTPUT_PATH: &str = "outlooks_data.json";

/// Top-level fetcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Datamart directory holding the outlook files.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where the snapshot is written. Overwritten on every run.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Emit a progress line every N candidates.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.into()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_progress_every() -> usize {
    20
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_path: default_output_path(),
            request_timeout_secs: default_request_timeout(),
            progress_every: default_progress_every(),
        }
    }
}
