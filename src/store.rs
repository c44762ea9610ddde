//! CSV file history store.
//!
//! One file per player at `<dir>/<player>-hiscores.csv`, no header row,
//! one record per line:
//!
//! ```text
//! timestamp,category,rank,level,experience
//! 2024-05-01 12:30:00,Overall,1,2277,500000000
//! 2024-05-01 12:30:00,Zulrah,500,0,300
//! ```
//!
//! Files are only ever appended to. An unranked category is written with
//! rank `-1`.

use std::fs::OpenOptions;
use std::io::Write;
use std::mem::take;
use std::path::{Path, PathBuf};

use hiscores_core::models::{format_timestamp, parse_timestamp, History, Snapshot, SnapshotRow};
use hiscores_core::store::HistoryStore;
use hiscores_core::HiscoresError;

const SEP: char = ',';
const COLUMNS: usize = 5;
const UNRANKED: &str = "-1";

pub struct CsvHistoryStore {
    dir: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, player: &str) -> PathBuf {
        self.dir.join(format!("{}-hiscores.csv", player))
    }

    /// Move a corrupt history file aside to `<file>.corrupt` so a run can
    /// start a fresh history. Returns the new location.
    pub fn quarantine(&self, player: &str) -> std::io::Result<PathBuf> {
        let path = self.path_for(player);
        let mut target = path.clone().into_os_string();
        target.push(".corrupt");
        let target = PathBuf::from(target);
        std::fs::rename(&path, &target)?;
        tracing::warn!(from = %path.display(), to = %target.display(), "quarantined corrupt history");
        Ok(target)
    }
}

impl HistoryStore for CsvHistoryStore {
    fn read_history(&self, player: &str) -> Result<Option<History>, HiscoresError> {
        let path = self.path_for(player);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        let history = decode_history(&text)?;
        tracing::debug!(path = %path.display(), rows = history.len(), "read history");
        Ok(Some(history))
    }

    fn append_history(&self, player: &str, snapshot: &Snapshot) -> Result<(), HiscoresError> {
        let path = self.path_for(player);
        ensure_parent(&path)?;

        let mut buf = String::new();
        for row in snapshot.rows() {
            buf.push_str(&encode_row(row));
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(buf.as_bytes())?;
        file.flush()?;
        tracing::info!(path = %path.display(), rows = snapshot.len(), "appended snapshot");
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/* ---------------- Encoding ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append `field` to `out`, quoted when it holds a separator, quote or line break.
pub(crate) fn push_field(out: &mut String, field: &str) {
    if needs_quotes(field) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// One history record as a CSV line, newline included.
pub fn encode_row(row: &SnapshotRow) -> String {
    let rank = row
        .rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| UNRANKED.to_string());
    let fields = [
        format_timestamp(&row.timestamp),
        row.category.clone(),
        rank,
        row.level.to_string(),
        row.experience.to_string(),
    ];

    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(SEP);
        }
        push_field(&mut out, field);
    }
    out.push('\n');
    out
}

/* ---------------- Decoding ---------------- */

/// Split CSV text into records, each tagged with the line it starts on.
/// Quotes and CRLF tolerant; blank lines are skipped.
fn parse_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut field = String::new();
    let mut record = Vec::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            c if c == SEP && !in_quotes => record.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                record.push(take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push((record_line, take(&mut record)));
                } else {
                    record.clear();
                }
                line += 1;
                record_line = line;
            }
            c => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }

    record.push(field);
    if !(record.len() == 1 && record[0].is_empty()) {
        records.push((record_line, record));
    }
    records
}

fn corrupt(line: usize, reason: String) -> HiscoresError {
    HiscoresError::HistoryCorrupt { line, reason }
}

fn decode_row(line: usize, fields: &[String]) -> Result<SnapshotRow, HiscoresError> {
    if fields.len() != COLUMNS {
        return Err(corrupt(
            line,
            format!("expected {} columns, found {}", COLUMNS, fields.len()),
        ));
    }

    let timestamp = parse_timestamp(&fields[0])
        .ok_or_else(|| corrupt(line, format!("bad timestamp '{}'", fields[0])))?;

    let category = fields[1].trim().to_string();
    if category.is_empty() {
        return Err(corrupt(line, "empty category".to_string()));
    }

    let rank = match fields[2].trim() {
        "" | "--" | UNRANKED => None,
        r => Some(
            r.parse::<u64>()
                .map_err(|_| corrupt(line, format!("bad rank '{}'", r)))?,
        ),
    };
    let level = fields[3]
        .trim()
        .parse::<u32>()
        .map_err(|_| corrupt(line, format!("bad level '{}'", fields[3])))?;
    let experience = fields[4]
        .trim()
        .parse::<u64>()
        .map_err(|_| corrupt(line, format!("bad experience '{}'", fields[4])))?;

    Ok(SnapshotRow {
        timestamp,
        category,
        rank,
        level,
        experience,
    })
}

/// Parse a whole history file.
pub fn decode_history(text: &str) -> Result<History, HiscoresError> {
    let rows = parse_records(text)
        .iter()
        .map(|(line, fields)| decode_row(*line, fields))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(History::from_rows(rows))
}
