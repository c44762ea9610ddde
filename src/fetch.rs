//! Fetch adapter: download a player's hiscores page and extract the
//! statistics table.
//!
//! The table is handed to the core normalizer untouched apart from
//! whitespace cleanup, so row and column order match the page.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use hiscores_core::models::RawTable;
use hiscores_core::normalize::check_player_exists;
use hiscores_core::HiscoresError;
use scraper::{ElementRef, Html, Selector};

use crate::config::FetchConfig;

/// The stats table is the third `<table>` on the personal hiscores page.
const RAW_TABLE_INDEX: usize = 2;

/// Download the raw hiscores page for `player`.
pub fn fetch_page(config: &FetchConfig, player: &str) -> Result<String, HiscoresError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(network)?;

    tracing::info!(url = %config.base_url, player, "fetching hiscores page");
    let resp = client
        .get(&config.base_url)
        .query(&[("user1", player)])
        .send()
        .map_err(network)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(HiscoresError::Network(format!(
            "HTTP {} from {}",
            status,
            resp.url()
        )));
    }

    resp.text().map_err(network)
}

/// Read a previously saved hiscores page from disk.
pub fn read_saved_page(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read saved page: {}", path.display()))
}

/// Extract the statistics table from a raw page.
///
/// Checks the "player not found" marker first, then takes the third table
/// in document order and returns each of its rows as the text of its cells.
pub fn extract_raw_table(page: &str, player: &str) -> Result<RawTable, HiscoresError> {
    check_player_exists(page, player)?;

    let document = Html::parse_document(page);
    let table_selector = Selector::parse("table")
        .map_err(|e| HiscoresError::MalformedSourceTable(e.to_string()))?;

    let tables: Vec<ElementRef> = document.select(&table_selector).collect();
    let table = tables.get(RAW_TABLE_INDEX).ok_or_else(|| {
        HiscoresError::MalformedSourceTable(format!(
            "expected at least {} tables on the page, found {}",
            RAW_TABLE_INDEX + 1,
            tables.len()
        ))
    })?;

    let rows: Vec<Vec<String>> = table_rows(*table)
        .into_iter()
        .map(|tr| {
            child_elements(tr)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(cell_text)
                .collect()
        })
        .collect();

    tracing::debug!(rows = rows.len(), "extracted raw table");
    Ok(RawTable::new(rows))
}

fn network(e: reqwest::Error) -> HiscoresError {
    HiscoresError::Network(e.to_string())
}

fn child_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Direct rows of a table, including those inside thead/tbody/tfoot but
/// not rows of nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child_elements(child).filter(|c| c.value().name() == "tr"))
            }
            _ => {}
        }
    }
    rows
}

/// Cell text with runs of whitespace (including `&nbsp;`) collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
