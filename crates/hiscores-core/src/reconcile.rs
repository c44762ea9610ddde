//! History reconciliation.
//!
//! Decides whether a freshly normalized [`Snapshot`] is new information
//! compared to the most recent snapshot already in the [`History`], and
//! appends it if so.
//!
//! Comparison ignores `rank`: ranks drift as other players progress, so a
//! rank-only difference is not a change in the player's own stats. A
//! snapshot that is missing categories present in the stored one (a partial
//! scrape) compares as changed and is appended.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;

use crate::error::Result;
use crate::models::{History, Snapshot};
use crate::store::HistoryStore;

/// Why the reconciler did or did not append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileReason {
    /// Nothing stored yet; the snapshot is appended unconditionally.
    FirstSnapshot,
    /// Level or experience differs, or the category sets differ.
    Changed {
        changed: usize,
        added: usize,
        missing: usize,
    },
    /// Identical to the latest stored snapshot apart from ranks.
    Unchanged,
}

impl fmt::Display for ReconcileReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileReason::FirstSnapshot => write!(f, "no stored history, first snapshot"),
            ReconcileReason::Changed {
                changed,
                added,
                missing,
            } => {
                write!(f, "{} categories changed", changed)?;
                if *added > 0 {
                    write!(f, ", {} new", added)?;
                }
                if *missing > 0 {
                    write!(f, ", {} missing from this read", missing)?;
                }
                Ok(())
            }
            ReconcileReason::Unchanged => write!(f, "no difference in stats since last update"),
        }
    }
}

/// Outcome of reconciling one snapshot against a history.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The history after the decision (with the snapshot appended if updated).
    pub history: History,
    /// The snapshot as it was (or would have been) recorded.
    pub snapshot: Snapshot,
    pub was_updated: bool,
    pub reason: ReconcileReason,
}

/// Rank-insensitive difference between two snapshots.
fn diff(stored: &Snapshot, fresh: &Snapshot) -> ReconcileReason {
    let key = |s: &Snapshot| -> BTreeMap<String, (u32, u64)> {
        s.rows()
            .iter()
            .map(|r| (r.category.clone(), (r.level, r.experience)))
            .collect()
    };
    let old = key(stored);
    let new = key(fresh);

    let mut changed = 0;
    let mut added = 0;
    for (category, values) in &new {
        match old.get(category) {
            Some(prev) if prev == values => {}
            Some(_) => changed += 1,
            None => added += 1,
        }
    }
    let missing = old.keys().filter(|c| !new.contains_key(*c)).count();

    if changed == 0 && added == 0 && missing == 0 {
        ReconcileReason::Unchanged
    } else {
        ReconcileReason::Changed {
            changed,
            added,
            missing,
        }
    }
}

/// True when both snapshots hold the same categories with the same level
/// and experience, whatever their ranks.
pub fn snapshots_match(stored: &Snapshot, fresh: &Snapshot) -> bool {
    diff(stored, fresh) == ReconcileReason::Unchanged
}

/// Reconcile `snapshot` against `history`, appending it in memory if it
/// carries new information.
///
/// A changed snapshot captured at or before the latest stored one is
/// recorded one second after it, so the history stays sorted by timestamp
/// with one row per (timestamp, category).
pub fn reconcile(mut history: History, snapshot: &Snapshot) -> Result<Reconciliation> {
    let mut snapshot = snapshot.clone();
    let reason = match history.latest_snapshot() {
        None => ReconcileReason::FirstSnapshot,
        Some(latest) => {
            let reason = diff(&latest, &snapshot);
            if reason != ReconcileReason::Unchanged && snapshot.captured_at() <= latest.captured_at()
            {
                let restamped = latest.captured_at() + Duration::seconds(1);
                tracing::warn!(
                    captured_at = %snapshot.captured_at(),
                    latest = %latest.captured_at(),
                    recorded_at = %restamped,
                    "snapshot is not newer than the stored history"
                );
                snapshot = snapshot.restamped(restamped);
            }
            reason
        }
    };

    let was_updated = reason != ReconcileReason::Unchanged;
    if was_updated {
        history.append(&snapshot);
    }

    tracing::info!(was_updated, reason = %reason, "reconciled snapshot");
    Ok(Reconciliation {
        history,
        snapshot,
        was_updated,
        reason,
    })
}

/// Read the stored history for `player`, reconcile, and append the snapshot
/// to the store when it is new.
///
/// A missing history is treated as empty. A corrupt one is returned as
/// [`HiscoresError::HistoryCorrupt`](crate::HiscoresError::HistoryCorrupt) for the caller to handle.
pub fn update_history<S: HistoryStore + ?Sized>(
    store: &S,
    player: &str,
    snapshot: &Snapshot,
) -> Result<Reconciliation> {
    let history = store.read_history(player)?.unwrap_or_default();
    let outcome = reconcile(history, snapshot)?;
    if outcome.was_updated {
        store.append_history(player, &outcome.snapshot)?;
    }
    Ok(outcome)
}
