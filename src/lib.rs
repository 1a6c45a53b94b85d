//! # ynab-snapshot
//!
//! Category snapshots of YNAB budgets for any month.
//!
//! The bulk category listing only carries current-month figures. For any other
//! month every category has to be fetched on its own; this crate does that
//! concurrently, under a global request-rate limit, and merges the results
//! back into the listed category tree.
//!
//! ## Architecture
//!
//! ```text
//!   list_categories ──► SnapshotEngine::merge_month
//!                            │
//!                ┌───────────┴───────────┐
//!                ▼                       ▼
//!          dispatch (1 task        RateGovernor
//!          per category) ◄──────── (1 token / interval)
//!                │
//!                ▼
//!          collect (poll handles, merge or report)
//!                │
//!                ▼
//!          CategorySink
//! ```
//!
//! ## Modules
//! - `ynab`: data model, `YnabClient` trait, HTTP and in-memory clients
//! - `snapshot`: the fetch-and-merge engine and a full snapshot run
//! - `sink`: row filtering and destinations
//! - `month`: the `current` / `YYYY-MM` month value
//! - `config`: environment configuration

pub mod config;
pub mod month;
pub mod sink;
pub mod snapshot;
pub mod util;
pub mod ynab;

pub use config::Config;
pub use month::Month;
pub use snapshot::{EngineOptions, MergePolicy, SnapshotEngine};
pub use ynab::{HttpYnabClient, YnabClient};
