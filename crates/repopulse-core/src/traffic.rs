// Durable per-repository history of daily traffic
use chrono::{DateTime, Duration, Utc};
use repopulse_api::{TrafficDay, TrafficKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{time, Error, Result};

/// GitHub reports the last fortnight of traffic
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Longest window a config may ask for
pub const MAX_WINDOW_DAYS: u32 = 366;

/// One day of traffic: unique visitors or cloners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSample {
    pub timestamp: DateTime<Utc>,
    pub uniques: u64,
}

impl TrafficSample {
    pub fn new(timestamp: DateTime<Utc>, uniques: u64) -> Self {
        Self { timestamp, uniques }
    }

    /// Zero-count placeholder that every new series starts with
    pub fn sentinel() -> Self {
        Self::new(time::ledger_epoch(), 0)
    }

    pub fn is_sentinel(&self) -> bool {
        self.timestamp == time::ledger_epoch() && self.uniques == 0
    }
}

impl From<TrafficDay> for TrafficSample {
    fn from(day: TrafficDay) -> Self {
        Self::new(day.timestamp, day.uniques)
    }
}

pub type RepoTraffic = BTreeMap<TrafficKind, Vec<TrafficSample>>;

/// repo id -> traffic kind -> samples, ascending by day, one per day.
///
/// Merging only ever appends, so history older than the API window survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrafficLedger {
    repos: BTreeMap<String, RepoTraffic>,
}

impl TrafficLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every fresh sample newer than the last stored one.
    ///
    /// `fresh` is expected in ascending order, as the traffic API returns it.
    /// Missing entries are created on the way, seeded with the sentinel.
    pub fn merge(&mut self, repo: &str, kind: TrafficKind, fresh: &[TrafficSample]) -> &[TrafficSample] {
        let traffic = self.repos.entry(repo.to_string()).or_insert_with(|| {
            warn!("{} does not exist in the traffic ledger - creating", repo);
            RepoTraffic::new()
        });

        let samples = traffic.entry(kind).or_insert_with(|| {
            warn!("{} {} does not exist in the traffic ledger - creating", repo, kind);
            vec![TrafficSample::sentinel()]
        });

        let mut appended = 0;
        for sample in fresh {
            // never empty: seeded above, and merging never removes
            let newest = samples.last().map(|s| s.timestamp).unwrap_or_else(time::ledger_epoch);
            if sample.timestamp > newest {
                samples.push(*sample);
                appended += 1;
            }
        }

        debug!("Merged {} new {} samples for {}", appended, kind, repo);
        samples
    }

    /// Stored samples, sentinel included. Empty if never merged.
    pub fn samples(&self, repo: &str, kind: TrafficKind) -> &[TrafficSample] {
        self.repos
            .get(repo)
            .and_then(|traffic| traffic.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of uniques over the whole retained history
    pub fn total_uniques(&self, repo: &str, kind: TrafficKind) -> u64 {
        self.samples(repo, kind).iter().map(|s| s.uniques).sum()
    }
}

/// Did days fall between the ledger's last entry and the API's window?
///
/// True when the newest real sample predates the start of the window, i.e.
/// the previous refresh was too long ago for the API to fill the gap.
pub fn has_window_gap(samples: &[TrafficSample], now: DateTime<Utc>, window_days: u32) -> bool {
    match samples.last() {
        Some(last) if !last.is_sentinel() => {
            last.timestamp < time::sub_saturating(now, Duration::days(i64::from(window_days)))
        }
        _ => false,
    }
}

/// The traffic ledger on disk, as a single JSON document.
///
/// Every merge reads the whole file and writes the whole file back. There is
/// no locking: two processes refreshing at once will lose one side's writes.
/// Run one refresh at a time (one user, one cron job).
#[derive(Debug, Clone)]
pub struct TrafficStore {
    path: PathBuf,
    window_days: u32,
}

impl TrafficStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// How many trailing days the traffic API reports
    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger. A missing file is an empty ledger, not an error.
    pub fn load(&self) -> Result<TrafficLedger> {
        if !self.path.exists() {
            warn!("{} does not exist - creating", self.path.display());
            return Ok(TrafficLedger::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::LedgerError(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Overwrite the file with the full ledger
    pub fn save(&self, ledger: &TrafficLedger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(ledger)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Load, merge one (repo, kind) series, persist. Returns the stored series.
    pub fn merge_traffic(
        &self,
        repo: &str,
        kind: TrafficKind,
        fresh: &[TrafficSample],
    ) -> Result<Vec<TrafficSample>> {
        let mut ledger = self.load()?;

        if has_window_gap(ledger.samples(repo, kind), Utc::now(), self.window_days) {
            warn!(
                "Last {} sample for {} is older than {} days, some days were never recorded",
                kind, repo, self.window_days
            );
        }

        let merged = ledger.merge(repo, kind, fresh).to_vec();
        self.save(&ledger)?;
        Ok(merged)
    }

    /// Cumulative uniques for (repo, kind), read from disk
    pub fn total_uniques(&self, repo: &str, kind: TrafficKind) -> Result<u64> {
        Ok(self.load()?.total_uniques(repo, kind))
    }
}
