//! In-memory [`HistoryStore`] used by tests.
//!
//! Histories live in a `HashMap` keyed by player name behind a
//! `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{HiscoresError, Result};
use crate::models::{History, Snapshot};

use super::HistoryStore;

pub struct InMemoryStore {
    histories: RwLock<HashMap<String, History>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a player's history directly.
    pub fn with_history(self, player: &str, history: History) -> Self {
        if let Ok(mut map) = self.histories.write() {
            map.insert(player.to_string(), history);
        }
        self
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> HiscoresError {
    HiscoresError::Io(std::io::Error::other("history store lock poisoned"))
}

impl HistoryStore for InMemoryStore {
    fn read_history(&self, player: &str) -> Result<Option<History>> {
        let map = self.histories.read().map_err(|_| poisoned())?;
        Ok(map.get(player).cloned())
    }

    fn append_history(&self, player: &str, snapshot: &Snapshot) -> Result<()> {
        let mut map = self.histories.write().map_err(|_| poisoned())?;
        map.entry(player.to_string()).or_default().append(snapshot);
        Ok(())
    }
}
