//! Harvest orchestration
//!
//! Walks shards in enumeration order, skips satisfied ones, delegates the
//! actual network work to a [`ShardHarvester`], and checkpoints the dataset
//! every `checkpoint_interval` shards plus unconditionally at run end. With
//! the default interval of 10 an interruption loses at most 9 shards of
//! unpersisted work.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::catalog::Shard;
use crate::harvest::{Fetcher, HarvestConfig, HarvestError, Pacer};
use crate::shutdown::SharedShutdown;
use crate::store::{self, Dataset, ShardResult};

/// Domain-specific fetch logic for one shard.
///
/// Implementations must never panic on upstream surprises: a failed sub-call
/// is recorded on the returned result, not propagated.
#[async_trait]
pub trait ShardHarvester: Send + Sync {
    /// Perform all sub-calls for `shard` and return the outcome, errors
    /// included.
    async fn harvest(&self, fetcher: &Fetcher, shard: &Shard) -> ShardResult;
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Shards fetched over the network this run
    pub fetched: usize,
    /// Shards skipped because the dataset already satisfied them
    pub skipped: usize,
    /// Shards whose result carries a shard-level error
    pub failed: usize,
    /// Failed sub-calls across all fetched shards
    pub sub_errors: usize,
    /// Periodic checkpoints written (the final save is not counted)
    pub checkpoints: usize,
    /// Whether the run stopped early on a shutdown request
    pub interrupted: bool,
}

/// Drives one harvest run over a shard list.
pub struct Orchestrator {
    config: HarvestConfig,
    output_path: PathBuf,
    shutdown: SharedShutdown,
}

impl Orchestrator {
    pub fn new(config: HarvestConfig, output_path: PathBuf, shutdown: SharedShutdown) -> Self {
        Self {
            config,
            output_path,
            shutdown,
        }
    }

    /// Process every shard and leave `dataset` fully persisted.
    ///
    /// The run never aborts on a shard failure; the only fallible step is
    /// writing the dataset to disk.
    pub async fn run(
        &self,
        shards: &[Shard],
        harvester: &dyn ShardHarvester,
        fetcher: &Fetcher,
        dataset: &mut Dataset,
    ) -> Result<RunStats, HarvestError> {
        let shard_pacer = Pacer::new(self.config.shard_delay, self.config.shard_jitter);
        let total = shards.len();
        let mut stats = RunStats::default();
        let mut since_checkpoint = 0usize;

        info!(total, output = %self.output_path.display(), "starting harvest run");

        for (index, shard) in shards.iter().enumerate() {
            if self.shutdown.is_shutdown_requested() {
                warn!(
                    completed = index,
                    total, "shutdown requested, stopping before next shard"
                );
                stats.interrupted = true;
                break;
            }

            if !self.config.force && dataset.is_satisfied(&shard.scope, &shard.key) {
                info!(
                    scope = %shard.scope,
                    key = %shard.key,
                    label = %shard.label,
                    "cached, skipping"
                );
                stats.skipped += 1;
                continue;
            }

            info!(
                progress = %format!("{}/{total}", index + 1),
                scope = %shard.scope,
                key = %shard.key,
                label = %shard.label,
                "harvesting shard"
            );

            // A long shard delay must not hold up a requested stop
            tokio::select! {
                _ = shard_pacer.wait() => {}
                _ = self.shutdown.wait_for_shutdown() => {
                    warn!(
                        completed = index,
                        total, "shutdown requested while pacing, stopping"
                    );
                    stats.interrupted = true;
                    break;
                }
            }
            let result = harvester.harvest(fetcher, shard).await;

            if let Some(error) = &result.error {
                warn!(scope = %shard.scope, key = %shard.key, error = %error, "shard failed");
                stats.failed += 1;
            }
            stats.sub_errors += result
                .results
                .iter()
                .filter(|sub| sub.error.is_some())
                .count();
            stats.fetched += 1;

            dataset.insert(&shard.scope, &shard.key, result);
            since_checkpoint += 1;

            if since_checkpoint >= self.config.checkpoint_interval {
                store::save(&self.output_path, dataset)?;
                stats.checkpoints += 1;
                since_checkpoint = 0;
                info!(
                    progress = %format!("{}/{total}", index + 1),
                    "checkpoint written"
                );
            }
        }

        // Unconditional final save, also on interruption
        store::save(&self.output_path, dataset)?;

        info!(
            fetched = stats.fetched,
            skipped = stats.skipped,
            failed = stats.failed,
            sub_errors = stats.sub_errors,
            checkpoints = stats.checkpoints,
            interrupted = stats.interrupted,
            "harvest run finished"
        );

        Ok(stats)
    }
}
