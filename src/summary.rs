//! Text summary of a player's history.
//!
//! Reads the stored history, partitions it, and prints the overall
//! progression, per-skill standings, the total kill count per snapshot,
//! and per-activity kill counts. Output goes to stdout.

use anyhow::Result;
use hiscores_core::models::{format_timestamp, SnapshotRow};
use hiscores_core::partition::{partition, Partition};
use hiscores_core::store::HistoryStore;
use hiscores_core::HiscoresError;

use crate::config::Config;
use crate::store::CsvHistoryStore;

/// Read and partition a player's history.
///
/// Returns `Ok(None)` when nothing is stored yet or the history is empty.
pub fn load_partition<S: HistoryStore + ?Sized>(store: &S, player: &str) -> Result<Option<Partition>> {
    let Some(history) = store.read_history(player)? else {
        return Ok(None);
    };
    match partition(&history) {
        Ok(p) => Ok(Some(p)),
        Err(HiscoresError::EmptyHistory) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn run_summary(config: &Config, player: &str) -> Result<()> {
    let store = CsvHistoryStore::new(&config.store.dir);
    match load_partition(&store, player)? {
        Some(p) => print_summary(player, &p),
        None => {
            println!(
                "No stored history for {}. Run with --update to fetch stats.",
                player
            );
        }
    }
    Ok(())
}

pub fn print_summary(player: &str, p: &Partition) {
    let stamps: Vec<_> = p
        .skills
        .iter()
        .map(|r| r.timestamp)
        .chain(p.activities.iter().map(|a| a.timestamp))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    println!("Hiscores: {}", player);
    println!("================================");
    println!();
    if let (Some(first), Some(last)) = (stamps.first(), stamps.last()) {
        println!(
            "  Snapshots:   {} ({} to {})",
            stamps.len(),
            format_timestamp(first),
            format_timestamp(last)
        );
    }

    let overall: Vec<&SnapshotRow> = p.overall().collect();
    if let (Some(first), Some(last)) = (overall.first(), overall.last()) {
        println!(
            "  Total level: {} ({})",
            last.level,
            signed(delta(last.level.into(), first.level.into()))
        );
        println!(
            "  Total XP:    {} ({})",
            format_number(last.experience),
            signed(delta(last.experience, first.experience))
        );
    }

    let skills = p.skill_names();
    if !skills.is_empty() {
        println!();
        println!("  Skills:");
        println!(
            "  {:<16} {:>6} {:>14} {:>12} {:>10}",
            "SKILL", "LEVEL", "XP", "CHANGE", "RANK"
        );
        println!("  {}", "-".repeat(62));
        for skill in skills {
            let series: Vec<&SnapshotRow> = p.skill_series(skill).collect();
            let (Some(first), Some(last)) = (series.first(), series.last()) else {
                continue;
            };
            println!(
                "  {:<16} {:>6} {:>14} {:>12} {:>10}",
                skill,
                last.level,
                format_number(last.experience),
                signed(delta(last.experience, first.experience)),
                format_rank(last.rank)
            );
        }
    }

    if !p.activity_totals.is_empty() {
        println!();
        println!("  Total kill count:");
        println!("  {:<20} {:>10}", "DATE", "KILLS");
        println!("  {}", "-".repeat(31));
        for total in &p.activity_totals {
            println!(
                "  {:<20} {:>10}",
                format_timestamp(&total.timestamp),
                format_number(total.kill_count)
            );
        }

        println!();
        println!("  Activities:");
        println!(
            "  {:<32} {:>8} {:>8} {:>10}",
            "ACTIVITY", "KC", "CHANGE", "RANK"
        );
        println!("  {}", "-".repeat(61));
        for name in p.activity_names() {
            let series: Vec<_> = p.activity_series(name).collect();
            let (Some(first), Some(last)) = (series.first(), series.last()) else {
                continue;
            };
            println!(
                "  {:<32} {:>8} {:>8} {:>10}",
                name,
                format_number(last.kill_count),
                signed(delta(last.kill_count, first.kill_count)),
                format_rank(last.rank)
            );
        }
    }

    println!();
}

fn format_rank(rank: Option<u64>) -> String {
    rank.map(format_number).unwrap_or_else(|| "--".to_string())
}

/// `last - first` without overflow for any pair of counts.
fn delta(last: u64, first: u64) -> i128 {
    i128::from(last) - i128::from(first)
}

fn signed(delta: i128) -> String {
    let magnitude = u64::try_from(delta.unsigned_abs()).unwrap_or(u64::MAX);
    if delta >= 0 {
        format!("+{}", format_number(magnitude))
    } else {
        format!("-{}", format_number(magnitude))
    }
}

/// Group digits in thousands: `1234567` -> `1,234,567`.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}
