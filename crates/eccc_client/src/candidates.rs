//! Candidate filename generation.
//!
//! The datamart has no listing endpoint, so every filename that could exist
//! for a date is enumerated and probed. Each candidate keeps the parameters it
//! was built from; keys are derived from those, never by splitting the name.

use chrono::{NaiveDate, Utc};
use common::{Horizon, RegionPair, MAX_REVISION, PUBLICATION_TIMES, REGION_PAIRS};
use tracing::info;

/// One filename that may or may not exist on the datamart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub date: NaiveDate,
    pub publication_time: &'static str,
    pub region: RegionPair,
    pub horizon: Horizon,
    pub revision: u32,
}

impl Candidate {
    /// `YYYYMMDD`.
    pub fn date_key(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Identity of the logical outlook, shared by all of its revisions.
    pub fn outlook_key(&self) -> String {
        format!(
            "{}{}_{}_{}",
            self.date_key(),
            self.publication_time,
            self.region.center,
            self.region.sub_region
        )
    }

    pub fn revision_label(&self) -> String {
        format!("v{}", self.revision)
    }

    pub fn filename(&self) -> String {
        format!(
            "{}{}_MSC_ThunderstormOutlook_{}_{}_{}_v{}.json",
            self.date_key(),
            self.publication_time,
            self.region.center,
            self.region.sub_region,
            self.horizon.token(),
            self.revision
        )
    }
}

/// All candidates for `date`: time, then region pair, then horizon, then
/// revision ascending.
pub fn for_date(date: NaiveDate) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(
        PUBLICATION_TIMES.len() * REGION_PAIRS.len() * Horizon::ALL.len() * MAX_REVISION as usize,
    );

    for publication_time in PUBLICATION_TIMES {
        for region in REGION_PAIRS {
            for horizon in Horizon::ALL {
                for revision in 1..=MAX_REVISION {
                    out.push(Candidate {
                        date,
                        publication_time,
                        region,
                        horizon,
                        revision,
                    });
                }
            }
        }
    }

    out
}

/// Candidates for the current UTC date only.
pub fn for_today() -> Vec<Candidate> {
    let today = Utc::now().date_naive();
    info!("Only fetching outlooks for current date: {}", today.format("%Y%m%d"));

    let candidates = for_date(today);
    info!("Generated {} possible filename patterns for today", candidates.len());
    candidates
}
