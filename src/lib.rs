//! # Hiscores Tracker
//!
//! **Track an Old School RuneScape player's hiscores over time.**
//!
//! Each update fetches the player's personal hiscores page, normalizes the
//! statistics table into a snapshot, and appends it to a per-player CSV
//! history unless nothing but ranks changed. The history is then split into
//! a skill view and an activity (kill count) view for summaries and export.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │   fetch     │──▶│ hiscores-core    │──▶│  CSV store   │
//! │ HTTP + HTML │   │ normalize        │   │ <p>-hiscores │
//! └─────────────┘   │ reconcile        │   └──────┬───────┘
//!                   │ partition        │◀─────────┘
//!                   └────────┬─────────┘
//!                            ▼
//!                 ┌─────────────────────┐
//!                 │ summary / export    │
//!                 └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hiscores init                     # write ./hiscores.toml
//! hiscores --player Zezima --update # fetch, store, summarize
//! hiscores export --view totals --format csv
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration, generation and CLI overrides |
//! | [`fetch`] | Download the hiscores page and extract the stats table |
//! | [`store`] | Append-only CSV history file per player |
//! | [`update`] | Fetch → normalize → reconcile → append |
//! | [`track`] | Default run: update if requested, then summarize |
//! | [`summary`] | Text summary of the partitioned history |
//! | [`export`] | JSON/CSV export of one partitioned view |
//! | [`prompt`] | Yes/no confirmation |

pub mod config;
pub mod export;
pub mod fetch;
pub mod prompt;
pub mod store;
pub mod summary;
pub mod track;
pub mod update;
