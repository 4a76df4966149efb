//! Harvest engine
//!
//! The engine walks an ordered list of shards, skips the ones the resumable
//! dataset already satisfies, fetches the rest under a strict rate budget
//! with retry/backoff, and checkpoints the merged dataset periodically.
//!
//! # Components
//!
//! - [`pacer`] - minimum-delay-plus-jitter pacing between requests and shards
//! - [`retry`] - retry classification, exponential backoff, and the fetcher
//! - [`orchestrator`] - the shard loop with skip/checkpoint policy
//! - [`channels`] / [`teams`] / [`dumps`] - per-shard domain fetch collaborators
//! - [`config`] - the recognized configuration surface with defaults
//!
//! # Failure policy
//!
//! A request failure is terminal for its sub-call only. The orchestrator
//! records it on the owning shard result and moves on; nothing short of a
//! configuration error before the first shard aborts a run.

pub mod channels;
pub mod config;
pub mod dumps;
pub mod orchestrator;
pub mod pacer;
pub mod retry;
pub mod teams;

pub use config::HarvestConfig;
pub use orchestrator::{Orchestrator, RunStats, ShardHarvester};
pub use pacer::Pacer;
pub use retry::{Fetcher, RetryPolicy};

use crate::store::StoreError;

/// Errors that abort a harvest run.
///
/// Deliberately narrow: per-shard network failures are demoted to shard
/// errors inside the dataset and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Persisting a checkpoint or the final dataset failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
