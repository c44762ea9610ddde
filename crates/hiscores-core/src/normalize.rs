//! Raw snapshot normalizer.
//!
//! Turns the statistics table scraped from a player's hiscores page into a
//! canonical [`Snapshot`].
//!
//! # Expected layout
//!
//! ```text
//! row 0   legend / page noise
//! row 1   <idx> | Skill | Rank | Level | XP        ← column names
//! row 2   noise
//! row 3.. <idx> | Overall | 1,234 | 2,277 | 500,000,000
//!         ...
//!         <idx> | Minigame | Rank | Score         ← section separator
//!         <idx> | Zulrah | 500 | 300              ← activity rows
//! ```
//!
//! The first column duplicates the row index and is dropped. Activity rows
//! have no level cell; their level is stored as 0 and their score lands in
//! `experience`.
//!
//! Any deviation from this layout is reported as
//! [`HiscoresError::MalformedSourceTable`]: the page format changed and
//! guessing the new schema is not attempted.

use chrono::{SubsecRound, Utc};

use crate::error::{HiscoresError, Result};
use crate::models::{RawTable, Snapshot, Timestamp};

/// Substring the hiscores site shows instead of the table for unknown names.
pub const PLAYER_NOT_FOUND_MARKER: &str = "No player";

/// Leading rows before the first data row.
const HEADER_ROWS: usize = 3;
/// Row holding the real column names.
const NAMES_ROW: usize = 1;

const CATEGORY_COLUMN: &str = "Skill";
const RANK_COLUMN: &str = "Rank";
const LEVEL_COLUMN: &str = "Level";
const EXPERIENCE_COLUMN: &str = "XP";
const SEPARATOR_ROW: &str = "Minigame";

/// Fail with [`HiscoresError::PlayerNotFound`] if the raw page says the player
/// does not exist. Run before any table extraction.
pub fn check_player_exists(page: &str, player: &str) -> Result<()> {
    if page.contains(PLAYER_NOT_FOUND_MARKER) {
        return Err(HiscoresError::PlayerNotFound {
            player: player.to_string(),
        });
    }
    Ok(())
}

/// Normalize a raw table, stamping every row with the current time.
pub fn normalize_now(raw: &RawTable) -> Result<Snapshot> {
    normalize(raw, Utc::now().trunc_subsecs(0))
}

/// Normalize a raw table into a snapshot captured at `captured_at`.
pub fn normalize(raw: &RawTable, captured_at: Timestamp) -> Result<Snapshot> {
    if raw.rows.len() < HEADER_ROWS {
        return Err(malformed(format!(
            "expected at least {} header rows, found {} rows",
            HEADER_ROWS,
            raw.rows.len()
        )));
    }

    let columns = Columns::from_names_row(&raw.rows[NAMES_ROW])?;

    let mut snapshot = Snapshot::new(captured_at);
    let mut separators = 0usize;

    for (offset, row) in raw.rows[HEADER_ROWS..].iter().enumerate() {
        let row_no = HEADER_ROWS + offset;
        let cells = row
            .get(1..)
            .ok_or_else(|| malformed(format!("row {} is empty", row_no)))?;

        let category = cells
            .get(columns.category)
            .map(|c| c.trim())
            .unwrap_or_default();
        if category.is_empty() {
            return Err(malformed(format!("row {} has no category name", row_no)));
        }

        if category == SEPARATOR_ROW {
            separators += 1;
            continue;
        }

        let (rank, level, experience) = if cells.len() == columns.width {
            (
                parse_rank(&cells[columns.rank], row_no)?,
                parse_level(&cells[columns.level], row_no)?,
                parse_count(&cells[columns.experience], row_no)?,
            )
        } else if separators > 0 && cells.len() == columns.width - 1 {
            // Activity rows: category, rank, score.
            let values: Vec<&String> = cells
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != columns.category)
                .map(|(_, c)| c)
                .collect();
            (
                parse_rank(values[0], row_no)?,
                0,
                parse_count(values[values.len() - 1], row_no)?,
            )
        } else {
            return Err(malformed(format!(
                "row {} ('{}') has {} cells, expected {}",
                row_no,
                category,
                cells.len(),
                columns.width
            )));
        };

        if !snapshot.push(category, rank, level, experience) {
            return Err(malformed(format!(
                "category '{}' appears more than once",
                category
            )));
        }
    }

    match separators {
        0 => return Err(malformed(format!("no '{}' separator row", SEPARATOR_ROW))),
        1 => {}
        n => {
            return Err(malformed(format!(
                "{} '{}' separator rows, expected one",
                n, SEPARATOR_ROW
            )))
        }
    }

    if snapshot.is_empty() {
        return Err(malformed("table has no data rows".to_string()));
    }

    tracing::debug!(
        categories = snapshot.len(),
        captured_at = %captured_at,
        "normalized hiscores table"
    );
    Ok(snapshot)
}

/// Column positions after the duplicate index column is dropped.
struct Columns {
    width: usize,
    category: usize,
    rank: usize,
    level: usize,
    experience: usize,
}

impl Columns {
    fn from_names_row(row: &[String]) -> Result<Self> {
        let names: Vec<&str> = row.iter().skip(1).map(|n| n.trim()).collect();
        if names.len() < 2 {
            return Err(malformed(format!(
                "column name row has {} names after the index column",
                names.len()
            )));
        }
        let find = |wanted: &str| {
            names
                .iter()
                .position(|n| *n == wanted)
                .ok_or_else(|| malformed(format!("no '{}' column", wanted)))
        };
        Ok(Self {
            width: names.len(),
            category: find(CATEGORY_COLUMN)?,
            rank: find(RANK_COLUMN)?,
            level: find(LEVEL_COLUMN)?,
            experience: find(EXPERIENCE_COLUMN)?,
        })
    }
}

fn malformed(reason: String) -> HiscoresError {
    HiscoresError::MalformedSourceTable(reason)
}

fn is_blank(cell: &str) -> bool {
    matches!(cell.trim(), "" | "--")
}

/// Strip thousands separators and parse a non-negative integer.
fn parse_count(cell: &str, row_no: usize) -> Result<u64> {
    let digits: String = cell.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    digits
        .parse::<u64>()
        .map_err(|_| malformed(format!("row {}: '{}' is not a number", row_no, cell)))
}

/// Unranked categories show `--` (or `-1`) instead of a rank.
fn parse_rank(cell: &str, row_no: usize) -> Result<Option<u64>> {
    if is_blank(cell) || cell.trim() == "-1" {
        return Ok(None);
    }
    parse_count(cell, row_no).map(Some)
}

fn parse_level(cell: &str, row_no: usize) -> Result<u32> {
    if is_blank(cell) {
        return Ok(0);
    }
    let value = parse_count(cell, row_no)?;
    u32::try_from(value)
        .map_err(|_| malformed(format!("row {}: level '{}' out of range", row_no, cell)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sample_table() -> RawTable {
        RawTable::new(vec![
            row(&["Personal scores for Zezima"]),
            row(&["", "Skill", "Rank", "Level", "XP"]),
            row(&[""]),
            row(&["", "Overall", "1", "2,277", "500,000,000"]),
            row(&["", "Attack", "15", "99", "200,000,000"]),
            row(&["", "Minigame", "Rank", "Score"]),
            row(&["", "Clue Scrolls (all)", "--", "17"]),
            row(&["", "Zulrah", "500", "300"]),
        ])
    }

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn normalizes_skills_and_activities() {
        let snap = normalize(&sample_table(), at()).unwrap();
        assert_eq!(snap.len(), 4);
        assert!(snap.rows().iter().all(|r| r.timestamp == at()));

        let overall = snap.get("Overall").unwrap();
        assert_eq!(overall.rank, Some(1));
        assert_eq!(overall.level, 2277);
        assert_eq!(overall.experience, 500_000_000);

        let zulrah = snap.get("Zulrah").unwrap();
        assert_eq!(zulrah.rank, Some(500));
        assert_eq!(zulrah.level, 0);
        assert_eq!(zulrah.experience, 300);

        assert_eq!(snap.get("Clue Scrolls (all)").unwrap().rank, None);
        assert!(snap.get("Minigame").is_none());
    }

    #[test]
    fn keeps_page_order() {
        let snap = normalize(&sample_table(), at()).unwrap();
        let names: Vec<&str> = snap.rows().iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, ["Overall", "Attack", "Clue Scrolls (all)", "Zulrah"]);
    }

    #[test]
    fn full_width_activity_rows_are_accepted() {
        let mut table = sample_table();
        table.rows.push(row(&["", "Vorkath", "1,020", "", "42"]));
        let snap = normalize(&table, at()).unwrap();
        let vorkath = snap.get("Vorkath").unwrap();
        assert_eq!(vorkath.level, 0);
        assert_eq!(vorkath.experience, 42);
    }

    #[test]
    fn missing_separator_is_malformed() {
        let mut table = sample_table();
        table.rows.retain(|r| r.get(1).map(String::as_str) != Some("Minigame"));
        let err = normalize(&table, at()).unwrap_err();
        assert!(matches!(err, HiscoresError::MalformedSourceTable(_)));
    }

    #[test]
    fn missing_skill_column_is_malformed() {
        let mut table = sample_table();
        table.rows[1] = row(&["", "Name", "Rank", "Level", "XP"]);
        let err = normalize(&table, at()).unwrap_err();
        assert!(matches!(err, HiscoresError::MalformedSourceTable(ref m) if m.contains("Skill")));
    }

    #[test]
    fn too_few_rows_is_malformed() {
        let table = RawTable::new(vec![row(&["noise"]), row(&["", "Skill"])]);
        assert!(matches!(
            normalize(&table, at()),
            Err(HiscoresError::MalformedSourceTable(_))
        ));
    }

    #[test]
    fn short_skill_row_is_malformed() {
        let mut table = sample_table();
        table.rows.insert(4, row(&["", "Defence", "12"]));
        assert!(matches!(
            normalize(&table, at()),
            Err(HiscoresError::MalformedSourceTable(_))
        ));
    }

    #[test]
    fn non_numeric_experience_is_malformed() {
        let mut table = sample_table();
        table.rows[4] = row(&["", "Attack", "15", "99", "lots"]);
        assert!(matches!(
            normalize(&table, at()),
            Err(HiscoresError::MalformedSourceTable(_))
        ));
    }

    #[test]
    fn duplicate_category_is_malformed() {
        let mut table = sample_table();
        table.rows.insert(4, row(&["", "Overall", "2", "2,000", "1"]));
        assert!(matches!(
            normalize(&table, at()),
            Err(HiscoresError::MalformedSourceTable(_))
        ));
    }

    #[test]
    fn not_found_marker_is_detected() {
        let page = "<html><body>No player \"Nobody\" found</body></html>";
        let err = check_player_exists(page, "Nobody").unwrap_err();
        assert!(matches!(err, HiscoresError::PlayerNotFound { ref player } if player == "Nobody"));
        assert!(check_player_exists("<table></table>", "Zezima").is_ok());
    }

    #[test]
    fn normalize_now_truncates_to_seconds() {
        let snap = normalize_now(&sample_table()).unwrap();
        assert_eq!(snap.captured_at().timestamp_subsec_nanos(), 0);
    }
}
