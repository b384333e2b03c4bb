//! Thunderstorm outlook fetcher.
//!
//! One-shot Tokio application that:
//! 1. Enumerates every outlook filename that could exist for today
//! 2. Probes each one on the ECCC datamart, in order
//! 3. Keeps the newest revision per outlook
//! 4. Writes the consolidated snapshot to a JSON file

mod config;

use std::path::PathBuf;
use std::time::Duration;

use aggregator::{write_snapshot, OutlookAggregator};
use chrono::Utc;
use clap::Parser;
use eccc_client::{candidates, EcccClient};
use tracing::{error, info};

use crate::config::CliOverrides;

/// ECCC thunderstorm outlook aggregator
#[derive(Parser)]
#[command(
    name = "thunderstorm-outlooks",
    about = "Collect today's ECCC thunderstorm outlooks into one JSON snapshot"
)]
struct Cli {
    /// Config file (TOML). Ignored if missing.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Snapshot output path.
    #[arg(long)]
    output: Option<String>,

    /// Datamart base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "thunderstorm_outlooks=info,eccc_client=info,aggregator=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Starting ECCC Thunderstorm Outlook data fetch");

    let overrides = CliOverrides {
        base_url: cli.base_url,
        output: cli.output,
        timeout_secs: cli.timeout_secs,
    };
    let cfg = match config::load_config(&cli.config, &overrides) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Source: {}", cfg.base_url);
    info!(
        "Output: {} (timeout={}s)",
        cfg.output_path, cfg.request_timeout_secs
    );

    let client = match EcccClient::new(&cfg.base_url, Duration::from_secs(cfg.request_timeout_secs)) {
        Ok(c) => c,
        Err(e) => {
            error!("HTTP client initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let started = Utc::now();
    let candidates = candidates::for_today();

    let mut aggregator = OutlookAggregator::new(client).progress_every(cfg.progress_every);
    aggregator.run(&candidates).await;
    let (snapshot, stats) = aggregator.into_parts();

    let output = PathBuf::from(&cfg.output_path);
    if let Err(e) = write_snapshot(&output, &snapshot, &stats) {
        error!("Snapshot write failed: {}", e);
        std::process::exit(1);
    }

    info!(
        "Completed ECCC Thunderstorm Outlook data fetch in {}s",
        (Utc::now() - started).num_seconds()
    );
}
