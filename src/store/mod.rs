//! Resumable dataset storage
//!
//! The dataset is the unit of resumption: a keyed map of per-shard results
//! persisted atomically as JSON, from which the merged entity index is
//! derived by replay. Loading never fails a run; a missing or corrupt file
//! degrades to an empty dataset with a warning so the harvest starts over.

pub mod dataset;
pub mod merge;
pub mod persist;

pub use dataset::{Dataset, ShardResult, SubResult, SCHEMA_VERSION};
pub use merge::merge_channel;
pub use persist::{load_or_default, save};

use std::path::PathBuf;

/// Errors raised while persisting a dataset.
///
/// Load-side problems never surface here; they degrade to an empty dataset.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
