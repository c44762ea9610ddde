//! Error taxonomy shared by every stage of the pipeline.
//!
//! Each failure kind is its own variant so callers can tell them apart:
//! a missing player is terminal, a corrupt history may be quarantined
//! after asking the user, and an empty history simply has nothing to show.

#[derive(Debug, thiserror::Error)]
pub enum HiscoresError {
    /// The statistics page says the queried player does not exist.
    #[error("no player named '{player}' found on the hiscores")]
    PlayerNotFound { player: String },

    /// The scraped table no longer has the expected layout.
    #[error("hiscores table has an unexpected layout: {0}")]
    MalformedSourceTable(String),

    /// A persisted history row failed schema validation.
    #[error("history is corrupt at line {line}: {reason}")]
    HistoryCorrupt { line: usize, reason: String },

    #[error("history has no rows to partition")]
    EmptyHistory,

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HiscoresError>;
