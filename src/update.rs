//! Update pipeline orchestration.
//!
//! Coordinates one refresh of a player's history: fetch (or read a saved
//! page) → extract table → normalize → reconcile against the stored
//! history → append when the stats changed.

use std::path::Path;

use anyhow::{Context, Result};
use hiscores_core::normalize::normalize_now;
use hiscores_core::reconcile::{update_history, Reconciliation};
use hiscores_core::HiscoresError;

use crate::config::{Config, Options};
use crate::fetch;
use crate::prompt::confirm;
use crate::store::CsvHistoryStore;

pub fn run_update(
    config: &Config,
    options: &Options,
    from_html: Option<&Path>,
    assume_yes: bool,
) -> Result<Reconciliation> {
    let player = options.player.as_str();

    let page = match from_html {
        Some(path) => fetch::read_saved_page(path)?,
        None => fetch::fetch_page(&config.fetch, player)?,
    };
    let raw = fetch::extract_raw_table(&page, player)?;
    let snapshot = normalize_now(&raw)?;

    let store = CsvHistoryStore::new(&config.store.dir);
    let outcome = match update_history(&store, player, &snapshot) {
        Err(HiscoresError::HistoryCorrupt { line, reason }) => {
            let path = store.path_for(player);
            let question = format!(
                "History file {} is corrupt (line {}: {}). Move it aside and start a new history?",
                path.display(),
                line,
                reason
            );
            if !confirm(&question, assume_yes)? {
                return Err(HiscoresError::HistoryCorrupt { line, reason })
                    .with_context(|| format!("Cannot update {}", path.display()));
            }
            let moved = store.quarantine(player)?;
            println!("Moved corrupt history to {}", moved.display());
            update_history(&store, player, &snapshot)?
        }
        other => other?,
    };

    println!("update {}", player);
    println!("  categories: {}", snapshot.len());
    println!("  stored snapshots: {}", outcome.history.snapshot_count());
    if outcome.was_updated {
        println!("  result: appended ({})", outcome.reason);
        println!("  history: {}", store.path_for(player).display());
    } else {
        println!("  result: no change ({})", outcome.reason);
    }
    println!("ok");

    Ok(outcome)
}
