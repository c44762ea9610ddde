//! The default run: refresh the history if asked, then show the summary.

use std::path::Path;

use anyhow::Result;

use crate::config::{Config, Options};
use crate::prompt::confirm;
use crate::store::CsvHistoryStore;
use crate::summary;
use crate::update;

pub fn run(config: &Config, options: &Options, from_html: Option<&Path>, assume_yes: bool) -> Result<()> {
    let player = options.player.as_str();

    if options.update {
        update::run_update(config, options, from_html, assume_yes)?;
    } else {
        let store = CsvHistoryStore::new(&config.store.dir);
        if !store.path_for(player).exists() {
            let question = format!("History for player {} does not exist. Create it now?", player);
            if !confirm(&question, assume_yes)? {
                println!("Exiting...");
                return Ok(());
            }
            update::run_update(config, options, from_html, assume_yes)?;
        }
    }

    if !options.no_plot {
        summary::run_summary(config, player)?;
    }
    Ok(())
}
