//! # Hiscores Core
//!
//! Pure transform logic for the hiscores tracker: the snapshot data model,
//! the raw table normalizer, history reconciliation, and the skill/activity
//! partitioner.
//!
//! This crate does no network or filesystem I/O. Fetching pages and
//! persisting history belong to the application crate, which talks to the
//! core through [`store::HistoryStore`] and plain values.
//!
//! ## Data Flow
//!
//! ```text
//! RawTable ──▶ normalize ──▶ Snapshot ──▶ reconcile ──▶ History
//!                                                         │
//!                                                         ▼
//!                                  SkillView / ActivityView / ActivityTotals
//! ```

pub mod error;
pub mod models;
pub mod normalize;
pub mod partition;
pub mod reconcile;
pub mod skills;
pub mod store;

pub use error::HiscoresError;
