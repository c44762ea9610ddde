//! History storage abstraction.
//!
//! The [`HistoryStore`] trait is the only way the core touches persisted
//! history. Implementations are append-only: rows are never rewritten or
//! deleted once stored.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`read_history`](HistoryStore::read_history) | Read every stored row for a player |
//! | [`append_history`](HistoryStore::append_history) | Append one snapshot |
//!
//! The application crate provides the CSV file store; [`memory`] holds an
//! in-memory implementation for tests.

pub mod memory;

use crate::error::Result;
use crate::models::{History, Snapshot};

pub trait HistoryStore: Send + Sync {
    /// Read the full history for `player` in write order.
    ///
    /// Returns `Ok(None)` when nothing has ever been stored for the player,
    /// and [`HistoryCorrupt`](crate::HiscoresError::HistoryCorrupt) when the
    /// stored rows do not fit the canonical schema.
    fn read_history(&self, player: &str) -> Result<Option<History>>;

    /// Append every row of `snapshot` to the player's history.
    fn append_history(&self, player: &str, snapshot: &Snapshot) -> Result<()>;
}
