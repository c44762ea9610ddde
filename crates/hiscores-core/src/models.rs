//! Core data models for the hiscores pipeline.
//!
//! A [`Snapshot`] is one capture of every category at a single instant.
//! [`History`] is the append-only sequence of rows from every snapshot ever
//! stored for a player. The partitioned views ([`ActivityRow`],
//! [`ActivityTotal`]) are derived from a history and never persisted.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

/// Capture instant of a snapshot. Full date-time, UTC, second precision.
pub type Timestamp = DateTime<Utc>;

/// Text form used for persisted and exported timestamps. Sorts lexically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` with optional fractional seconds (UTC),
/// RFC 3339, and date-only `YYYY-MM-DD`. Date-only rows come from histories
/// written before captures carried a time of day; those dates were local,
/// so they are read as local midnight.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let midnight = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn serialize_timestamp<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

/// The scraped statistics table exactly as received: rows in page order,
/// each row the text of its cells in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

/// One category's measurement at one point in time.
///
/// For activities `level` is an unused dimension (0) and `experience`
/// carries the kill count or score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRow {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: Timestamp,
    pub category: String,
    pub rank: Option<u64>,
    pub level: u32,
    pub experience: u64,
}

/// All rows of a single capture, sharing one timestamp, one row per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    captured_at: Timestamp,
    rows: Vec<SnapshotRow>,
}

impl Snapshot {
    pub fn new(captured_at: Timestamp) -> Self {
        Self {
            captured_at,
            rows: Vec::new(),
        }
    }

    /// Add a category to the snapshot, stamped with its capture time.
    ///
    /// Returns `false` (and adds nothing) if the category is already present.
    pub fn push(
        &mut self,
        category: impl Into<String>,
        rank: Option<u64>,
        level: u32,
        experience: u64,
    ) -> bool {
        let category = category.into();
        if self.get(&category).is_some() {
            return false;
        }
        self.rows.push(SnapshotRow {
            timestamp: self.captured_at,
            category,
            rank,
            level,
            experience,
        });
        true
    }

    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }

    /// The same rows recorded at `captured_at` instead.
    pub fn restamped(&self, captured_at: Timestamp) -> Snapshot {
        Snapshot {
            captured_at,
            rows: self
                .rows
                .iter()
                .map(|r| SnapshotRow {
                    timestamp: captured_at,
                    ..r.clone()
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn get(&self, category: &str) -> Option<&SnapshotRow> {
        self.rows.iter().find(|r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Append-only record of every stored row for one player, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    rows: Vec<SnapshotRow>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<SnapshotRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct capture timestamps, ascending.
    pub fn timestamps(&self) -> BTreeSet<Timestamp> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn snapshot_count(&self) -> usize {
        self.timestamps().len()
    }

    pub fn latest_timestamp(&self) -> Option<Timestamp> {
        self.rows.iter().map(|r| r.timestamp).max()
    }

    /// The most recent stored snapshot: every row carrying the newest timestamp.
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        let latest = self.latest_timestamp()?;
        let rows = self
            .rows
            .iter()
            .filter(|r| r.timestamp == latest)
            .cloned()
            .collect();
        Some(Snapshot {
            captured_at: latest,
            rows,
        })
    }

    pub fn append(&mut self, snapshot: &Snapshot) {
        self.rows.extend(snapshot.rows.iter().cloned());
    }
}

/// A non-skill row of the history, relabeled for kill-count presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: Timestamp,
    pub activity: String,
    pub rank: Option<u64>,
    pub kill_count: u64,
}

/// Sum of all activity kill counts at one timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTotal {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: Timestamp,
    pub kill_count: u64,
}
