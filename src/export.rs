//! Export one partitioned view for external charting.
//!
//! Views keep their documented column names:
//!
//! | View | Columns |
//! |------|---------|
//! | `skills` | timestamp, category, rank, level, experience |
//! | `activities` | timestamp, activity, rank, kill_count |
//! | `totals` | timestamp, kill_count |
//!
//! JSON output is an array of objects; CSV output has a header row and an
//! empty rank cell for unranked rows.

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use hiscores_core::models::format_timestamp;
use hiscores_core::partition::Partition;

use crate::config::Config;
use crate::store::{push_field, CsvHistoryStore};
use crate::summary::load_partition;

const SKILL_COLUMNS: [&str; 5] = ["timestamp", "category", "rank", "level", "experience"];
const ACTIVITY_COLUMNS: [&str; 4] = ["timestamp", "activity", "rank", "kill_count"];
const TOTAL_COLUMNS: [&str; 2] = ["timestamp", "kill_count"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Skills,
    Activities,
    Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Csv,
}

/// Render `view` of `partition` in `format`.
pub fn render_view(partition: &Partition, view: View, format: Format) -> Result<String> {
    let out = match format {
        Format::Json => match view {
            View::Skills => serde_json::to_string_pretty(&partition.skills)?,
            View::Activities => serde_json::to_string_pretty(&partition.activities)?,
            View::Totals => serde_json::to_string_pretty(&partition.activity_totals)?,
        },
        Format::Csv => {
            let (header, rows): (&[&str], Vec<Vec<String>>) = match view {
                View::Skills => (
                    SKILL_COLUMNS.as_slice(),
                    partition
                        .skills
                        .iter()
                        .map(|r| {
                            vec![
                                format_timestamp(&r.timestamp),
                                r.category.clone(),
                                rank_cell(r.rank),
                                r.level.to_string(),
                                r.experience.to_string(),
                            ]
                        })
                        .collect(),
                ),
                View::Activities => (
                    ACTIVITY_COLUMNS.as_slice(),
                    partition
                        .activities
                        .iter()
                        .map(|r| {
                            vec![
                                format_timestamp(&r.timestamp),
                                r.activity.clone(),
                                rank_cell(r.rank),
                                r.kill_count.to_string(),
                            ]
                        })
                        .collect(),
                ),
                View::Totals => (
                    TOTAL_COLUMNS.as_slice(),
                    partition
                        .activity_totals
                        .iter()
                        .map(|t| vec![format_timestamp(&t.timestamp), t.kill_count.to_string()])
                        .collect(),
                ),
            };
            let mut buf = String::new();
            write_csv_row(&mut buf, header.iter().copied());
            for row in &rows {
                write_csv_row(&mut buf, row.iter().map(String::as_str));
            }
            buf
        }
    };
    Ok(out)
}

/// Number of rows `view` holds.
pub fn view_len(partition: &Partition, view: View) -> usize {
    match view {
        View::Skills => partition.skills.len(),
        View::Activities => partition.activities.len(),
        View::Totals => partition.activity_totals.len(),
    }
}

/// Export a view of `player`'s history.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub fn run_export(
    config: &Config,
    player: &str,
    view: View,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let store = CsvHistoryStore::new(&config.store.dir);
    let partition = load_partition(&store, player)?.unwrap_or_default();
    let rendered = render_view(&partition, view, format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &rendered)?;
            eprintln!(
                "Exported {} rows to {}",
                view_len(&partition, view),
                path.display()
            );
        }
        None => {
            print!("{}", rendered);
            if format == Format::Json {
                println!();
            }
        }
    }
    Ok(())
}

fn rank_cell(rank: Option<u64>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_default()
}

fn write_csv_row<'a>(buf: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            buf.push(',');
        }
        push_field(buf, cell);
    }
    buf.push('\n');
}
