//! Harvest configuration with documented defaults
//!
//! Unknown knobs do not exist here: the CLI maps flags onto these fields
//! directly, so anything not listed is rejected at parse time.

use std::collections::BTreeSet;
use std::time::Duration;

/// Minimum delay before every individual request, in seconds.
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 0.25;

/// Random jitter added on top of the request delay, in seconds.
pub const DEFAULT_REQUEST_JITTER_SECS: f64 = 0.0;

/// Minimum delay before every shard, in seconds. Off by default; the
/// request delay already paces every call the shard makes.
pub const DEFAULT_SHARD_DELAY_SECS: f64 = 0.0;

/// Random jitter added on top of the shard delay, in seconds.
pub const DEFAULT_SHARD_JITTER_SECS: f64 = 0.0;

/// Maximum number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Base backoff delay, doubled on every consecutive retry, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: f64 = 3.0;

/// Checkpoint the dataset after this many processed shards.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;

/// HTTP statuses that classify a failure as transient.
pub const DEFAULT_RETRY_STATUSES: [u16; 6] = [403, 429, 430, 500, 502, 503];

/// Configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Minimum delay before every request
    pub request_delay: Duration,
    /// Random jitter added to the request delay
    pub request_jitter: Duration,
    /// Minimum delay before every shard
    pub shard_delay: Duration,
    /// Random jitter added to the shard delay
    pub shard_jitter: Duration,
    /// Retries allowed after the initial attempt
    pub max_retries: u32,
    /// Base backoff delay, doubled per consecutive retry
    pub retry_delay: Duration,
    /// Statuses treated as transient
    pub retry_statuses: BTreeSet<u16>,
    /// Harvest every sub-shard (e.g. every season) instead of only the first
    pub all_subshards: bool,
    /// Optional cap on sub-shards per shard, applied after `all_subshards`
    pub subshard_limit: Option<usize>,
    /// Re-fetch shards the dataset already satisfies
    pub force: bool,
    /// Checkpoint the dataset after this many shards
    pub checkpoint_interval: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_secs_f64(DEFAULT_REQUEST_DELAY_SECS),
            request_jitter: Duration::from_secs_f64(DEFAULT_REQUEST_JITTER_SECS),
            shard_delay: Duration::from_secs_f64(DEFAULT_SHARD_DELAY_SECS),
            shard_jitter: Duration::from_secs_f64(DEFAULT_SHARD_JITTER_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs_f64(DEFAULT_RETRY_DELAY_SECS),
            retry_statuses: DEFAULT_RETRY_STATUSES.into_iter().collect(),
            all_subshards: false,
            subshard_limit: None,
            force: false,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}
