//! Domain types shared across the fetcher.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Candidate space ───────────────────────────────────────────────────

/// UTC publication hour markers used in outlook filenames.
pub const PUBLICATION_TIMES: [&str; 3] = ["T1700Z", "T1900Z", "T2000Z"];

/// Highest revision probed per logical outlook.
pub const MAX_REVISION: u32 = 4;

/// Forecast lead time covered by a bulletin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Horizon {
    Pt012h,
    Pt024h,
    Pt036h,
    Pt060h,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Pt012h,
        Horizon::Pt024h,
        Horizon::Pt036h,
        Horizon::Pt060h,
    ];

    /// ISO-8601 duration token as it appears in filenames.
    pub fn token(self) -> &'static str {
        match self {
            Horizon::Pt012h => "PT012H00M",
            Horizon::Pt024h => "PT024H00M",
            Horizon::Pt036h => "PT036H00M",
            Horizon::Pt060h => "PT060H00M",
        }
    }

    /// Snapshot bucket this horizon is filed under.
    pub fn bucket(self) -> &'static str {
        match self {
            Horizon::Pt012h => "day1",
            Horizon::Pt024h => "day2",
            Horizon::Pt036h => "day3",
            Horizon::Pt060h => "day4",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A storm prediction centre and one of the areas it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionPair {
    pub center: &'static str,
    pub sub_region: &'static str,
}

impl RegionPair {
    pub const fn new(center: &'static str, sub_region: &'static str) -> Self {
        Self { center, sub_region }
    }
}

/// Every centre/sub-region combination the datamart publishes under.
pub const REGION_PAIRS: [RegionPair; 10] = [
    RegionPair::new("OSPC", "ON"),
    RegionPair::new("QSPC", "QC"),
    RegionPair::new("PSPC", "BC-YT"),
    RegionPair::new("ASPC", "NB"),
    RegionPair::new("ASPC", "NS"),
    RegionPair::new("ASPC", "PE"),
    RegionPair::new("ASPC", "NL"),
    RegionPair::new("BCSPC", "BC"),
    RegionPair::new("PASPC", "MK"),
    RegionPair::new("PASPC", "PRAIRIES"),
];

// ── Snapshot ──────────────────────────────────────────────────────────

/// All revisions kept for one logical outlook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlookEntry {
    /// Highest revision stored in `outlooks`.
    pub current_version: u32,
    /// Payloads keyed by revision label (`v1`, `v3`, ...).
    pub outlooks: BTreeMap<String, Value>,
}

/// Date (`YYYYMMDD`) → outlook key → entry.
pub type HorizonBucket = BTreeMap<String, BTreeMap<String, OutlookEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    pub description: String,
    pub update_frequency: String,
    /// Centre code → human-readable centre name.
    pub regions: BTreeMap<String, String>,
}

impl Default for Metadata {
    fn default() -> Self {
        let regions = [
            ("OSPC", "Ontario Storm Prediction Centre"),
            ("QSPC", "Quebec Storm Prediction Centre"),
            ("PSPC", "Prairie Storm Prediction Centre (MB, SK, AB)"),
            ("ASPC", "Atlantic Storm Prediction Centre (NB, NS, PE, NL)"),
            ("BCSPC", "British Columbia Storm Prediction Centre"),
            ("PASPC", "Prairie and Arctic Storm Prediction Centre"),
        ]
        .into_iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();

        Self {
            source: "Environment and Climate Change Canada".into(),
            description: "Thunderstorm Outlook Data".into(),
            update_frequency: "Every 6 hours".into(),
            regions,
        }
    }
}

/// Consolidated view of every outlook found during one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 12-hour forecasts.
    pub day1: HorizonBucket,
    /// 24-hour forecasts.
    pub day2: HorizonBucket,
    /// 36-hour forecasts.
    pub day3: HorizonBucket,
    /// 60-hour forecasts.
    pub day4: HorizonBucket,
    pub last_updated: DateTime<Utc>,
    pub metadata: Metadata,
}

impl Snapshot {
    pub fn new(last_updated: DateTime<Utc>) -> Self {
        Self {
            day1: HorizonBucket::new(),
            day2: HorizonBucket::new(),
            day3: HorizonBucket::new(),
            day4: HorizonBucket::new(),
            last_updated,
            metadata: Metadata::default(),
        }
    }

    pub fn bucket(&self, horizon: Horizon) -> &HorizonBucket {
        match horizon {
            Horizon::Pt012h => &self.day1,
            Horizon::Pt024h => &self.day2,
            Horizon::Pt036h => &self.day3,
            Horizon::Pt060h => &self.day4,
        }
    }

    pub fn bucket_mut(&mut self, horizon: Horizon) -> &mut HorizonBucket {
        match horizon {
            Horizon::Pt012h => &mut self.day1,
            Horizon::Pt024h => &mut self.day2,
            Horizon::Pt036h => &mut self.day3,
            Horizon::Pt060h => &mut self.day4,
        }
    }

    pub fn entry(&self, horizon: Horizon, date_key: &str, outlook_key: &str) -> Option<&OutlookEntry> {
        self.bucket(horizon).get(date_key)?.get(outlook_key)
    }

    /// Merge one fetched revision.
    ///
    /// The entry is created on first sight. The payload is stored only when
    /// `revision` is strictly greater than the entry's `current_version`;
    /// older or repeated revisions are dropped. Lower revisions already stored
    /// are kept. Returns `true` when the payload was stored.
    pub fn merge(
        &mut self,
        horizon: Horizon,
        date_key: &str,
        outlook_key: &str,
        revision: u32,
        payload: Value,
    ) -> bool {
        let entry = self
            .bucket_mut(horizon)
            .entry(date_key.to_string())
            .or_default()
            .entry(outlook_key.to_string())
            .or_default();

        if revision <= entry.current_version {
            return false;
        }

        entry.current_version = revision;
        entry.outlooks.insert(format!("v{revision}"), payload);
        true
    }

    /// Number of outlook entries across all buckets.
    pub fn entry_count(&self) -> usize {
        Horizon::ALL
            .iter()
            .map(|h| self.bucket(*h).values().map(|d| d.len()).sum::<usize>())
            .sum()
    }
}

/// Run-level fetch counters. Logged, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub successful: u64,
    pub failed: u64,
}

impl FetchStats {
    pub fn total(&self) -> u64 {
        self.successful + self.failed
    }
}
