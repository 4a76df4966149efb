//! Atomic dataset persistence
//!
//! Writes go through a temp file in the target directory followed by a
//! rename, so a crash mid-checkpoint leaves the previous dataset intact.
//! Loads are deliberately forgiving: a missing or corrupt file degrades to
//! an empty dataset with a warning and the harvest starts from scratch.

use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{Dataset, StoreError};

/// Load the dataset at `path`, or an empty one when the file is missing or
/// unreadable. Never fails the run.
pub fn load_or_default(path: &Path) -> Dataset {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no dataset file, starting fresh");
            return Dataset::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read dataset, starting fresh");
            return Dataset::new();
        }
    };

    match serde_json::from_str::<Dataset>(&contents) {
        Ok(dataset) => {
            info!(
                path = %path.display(),
                shards = dataset.shard_count(),
                schema_version = dataset.schema_version,
                "loaded existing dataset"
            );
            dataset
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "dataset file is corrupt, starting fresh");
            Dataset::new()
        }
    }
}

/// Atomically write the dataset to `path`.
pub fn save(path: &Path, dataset: &Dataset) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(dataset)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    // Temp file in the target directory so the final rename stays on one
    // filesystem and is atomic
    let parent_dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir.unwrap_or_else(|| Path::new(".")))
        .map_err(|e| StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

    temp_file
        .write_all(json.as_bytes())
        .and_then(|_| temp_file.flush())
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

    temp_file.persist(path).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    // Fsync the directory so the rename survives a crash. The data itself
    // is already durable and renamed, so a failure here is only logged.
    if let Some(parent) = parent_dir {
        match std::fs::File::open(parent).and_then(|dir| dir.sync_all()) {
            Ok(()) => {}
            Err(e) => {
                debug!(path = %parent.display(), error = %e, "directory fsync failed");
            }
        }
    }

    debug!(path = %path.display(), shards = dataset.shard_count(), "dataset saved");
    Ok(())
}
