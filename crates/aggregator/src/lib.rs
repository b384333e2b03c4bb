//! Fetch-and-merge loop for thunderstorm outlooks.
//!
//! Probes every candidate in order, files each payload under its horizon
//! bucket and keeps the newest revision per logical outlook.

pub mod writer;

use chrono::{DateTime, Utc};
use common::{FetchStats, Snapshot};
use eccc_client::{Candidate, FetchOutcome, OutlookSource};
use tracing::{debug, error, info, warn};

pub use writer::write_snapshot;

pub const DEFAULT_PROGRESS_EVERY: usize = 20;

/// Owns the snapshot and counters for a single run.
pub struct OutlookAggregator<S> {
    source: S,
    snapshot: Snapshot,
    stats: FetchStats,
    progress_every: usize,
}

impl<S: OutlookSource> OutlookAggregator<S> {
    pub fn new(source: S) -> Self {
        Self::with_timestamp(source, Utc::now())
    }

    pub fn with_timestamp(source: S, last_updated: DateTime<Utc>) -> Self {
        Self {
            source,
            snapshot: Snapshot::new(last_updated),
            stats: FetchStats::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Probe every candidate, strictly one at a time. No failure is fatal.
    pub async fn run(&mut self, candidates: &[Candidate]) {
        let total = candidates.len();
        info!(
            "Starting to fetch today's outlook data for {} possible patterns",
            total
        );

        for (index, candidate) in candidates.iter().enumerate() {
            self.process(candidate).await;

            let done = index + 1;
            if done % self.progress_every == 0 {
                info!("Progress: {}/{} patterns processed", done, total);
            }
        }

        info!(
            "Fetch complete: {} successful, {} failed, {} outlooks kept",
            self.stats.successful,
            self.stats.failed,
            self.snapshot.entry_count()
        );
    }

    async fn process(&mut self, candidate: &Candidate) {
        let filename = candidate.filename();

        match self.source.fetch(&filename).await {
            FetchOutcome::Found(payload) => {
                self.stats.successful += 1;
                self.accept(candidate, payload);
            }
            FetchOutcome::NotFound => {
                debug!("File not found: {}", filename);
                self.stats.failed += 1;
            }
            FetchOutcome::UnexpectedStatus(status) => {
                warn!("Unexpected status code {} for {}", status, filename);
                self.stats.failed += 1;
            }
            FetchOutcome::InvalidPayload(e) => {
                warn!("Invalid JSON payload in {}: {}", filename, e);
                self.stats.failed += 1;
            }
            FetchOutcome::Transport(e) => {
                error!("Error fetching {}: {}", filename, e);
                self.stats.failed += 1;
            }
        }
    }

    fn accept(&mut self, candidate: &Candidate, payload: serde_json::Value) {
        let outlook_key = candidate.outlook_key();
        let stored = self.snapshot.merge(
            candidate.horizon,
            &candidate.date_key(),
            &outlook_key,
            candidate.revision,
            payload,
        );

        if stored {
            info!(
                "Updated to newer version {} for {} ({})",
                candidate.revision,
                outlook_key,
                candidate.horizon.bucket()
            );
        } else {
            debug!(
                "Ignoring {} for {}: newer version already stored",
                candidate.revision_label(),
                outlook_key
            );
        }
    }

    pub fn into_parts(self) -> (Snapshot, FetchStats) {
        (self.snapshot, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::Horizon;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory datamart: anything not listed answers 404.
    #[derive(Default)]
    struct FakeSource {
        responses: HashMap<String, FetchOutcome>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, filename: &str, outcome: FetchOutcome) -> Self {
            self.responses.insert(filename.to_string(), outcome);
            self
        }
    }

    impl OutlookSource for FakeSource {
        async fn fetch(&self, filename: &str) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(filename)
                .cloned()
                .unwrap_or(FetchOutcome::NotFound)
        }
    }

    const ON_12H: &str = "20250615T1700Z_MSC_ThunderstormOutlook_OSPC_ON_PT012H00M";

    fn june_15() -> Vec<Candidate> {
        eccc_client::candidates::for_date(NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date"))
    }

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-15T21:00:00Z")
            .expect("valid time")
            .with_timezone(&Utc)
    }

    async fn run_with(source: FakeSource) -> (Snapshot, FetchStats) {
        let mut agg = OutlookAggregator::with_timestamp(source, fixed_time());
        agg.run(&june_15()).await;
        agg.into_parts()
    }

    #[tokio::test]
    async fn test_single_outlook_end_to_end() {
        let source = FakeSource::default()
            .with(&format!("{ON_12H}_v1.json"), FetchOutcome::Found(json!({"v": 1})));

        let (snapshot, stats) = run_with(source).await;

        assert_eq!(stats, FetchStats { successful: 1, failed: 479 });
        let day = snapshot.day1.get("20250615").expect("date present");
        assert_eq!(day.len(), 1);
        let entry = day.get("20250615T1700Z_OSPC_ON").expect("entry present");
        assert_eq!(entry.current_version, 1);
        assert_eq!(entry.outlooks.len(), 1);
        assert_eq!(entry.outlooks.get("v1"), Some(&json!({"v": 1})));
        assert!(snapshot.day2.is_empty() && snapshot.day3.is_empty() && snapshot.day4.is_empty());
    }

    #[tokio::test]
    async fn test_revision_gap_is_preserved() {
        let source = FakeSource::default()
            .with(&format!("{ON_12H}_v1.json"), FetchOutcome::Found(json!({"v": 1})))
            .with(&format!("{ON_12H}_v3.json"), FetchOutcome::Found(json!({"v": 3})));

        let (snapshot, stats) = run_with(source).await;

        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 478);
        let entry = snapshot
            .entry(Horizon::Pt012h, "20250615", "20250615T1700Z_OSPC_ON")
            .expect("entry present");
        assert_eq!(entry.current_version, 3);
        let labels: Vec<_> = entry.outlooks.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["v1", "v3"]);
    }

    #[tokio::test]
    async fn test_classification_by_horizon() {
        let base = "20250615T1900Z_MSC_ThunderstormOutlook_QSPC_QC";
        let mut source = FakeSource::default();
        for horizon in Horizon::ALL {
            source = source.with(
                &format!("{base}_{}_v2.json", horizon.token()),
                FetchOutcome::Found(json!(horizon.bucket())),
            );
        }

        let (snapshot, _) = run_with(source).await;

        for horizon in Horizon::ALL {
            let bucket = snapshot.bucket(horizon);
            assert_eq!(bucket.len(), 1);
            let entry = &bucket["20250615"]["20250615T1900Z_QSPC_QC"];
            assert_eq!(entry.outlooks["v2"], json!(horizon.bucket()));
        }
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        // Every kind of failure right before a good candidate.
        let source = FakeSource::default()
            .with(
                &format!("{ON_12H}_v1.json"),
                FetchOutcome::Transport("connection reset".into()),
            )
            .with(&format!("{ON_12H}_v2.json"), FetchOutcome::UnexpectedStatus(503))
            .with(
                &format!("{ON_12H}_v3.json"),
                FetchOutcome::InvalidPayload("expected value at line 1".into()),
            )
            .with(&format!("{ON_12H}_v4.json"), FetchOutcome::Found(json!({"v": 4})))
            .with(
                "20250615T1700Z_MSC_ThunderstormOutlook_OSPC_ON_PT024H00M_v1.json",
                FetchOutcome::Found(json!({"d2": true})),
            );

        let (snapshot, stats) = run_with(source).await;

        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 478);
        assert_eq!(snapshot.entry_count(), 2);

        let entry = snapshot
            .entry(Horizon::Pt012h, "20250615", "20250615T1700Z_OSPC_ON")
            .expect("entry present");
        assert_eq!(entry.current_version, 4);
        assert_eq!(entry.outlooks.len(), 1);
        assert!(snapshot
            .entry(Horizon::Pt024h, "20250615", "20250615T1700Z_OSPC_ON")
            .is_some());
    }

    #[tokio::test]
    async fn test_every_candidate_is_probed_once() {
        let mut agg = OutlookAggregator::with_timestamp(FakeSource::default(), fixed_time())
            .progress_every(7);
        agg.run(&june_15()).await;

        assert_eq!(agg.stats().total(), 480);
        assert_eq!(agg.stats().failed, 480);
        assert_eq!(agg.snapshot().entry_count(), 0);
        assert_eq!(agg.source.calls.load(Ordering::SeqCst), 480);
    }

    #[tokio::test]
    async fn test_write_failure_after_complete_run() {
        let (snapshot, stats) = run_with(FakeSource::default()).await;
        assert_eq!(stats, FetchStats { successful: 0, failed: 480 });

        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("missing").join("out.json");
        let err = write_snapshot(&target, &snapshot, &stats).expect_err("write must fail");
        assert!(matches!(err, common::Error::Io { .. }));
    }
}
