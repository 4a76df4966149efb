//! Retry classification, exponential backoff, and the paced fetcher
//!
//! One fetch walks a small state machine: pace, attempt, and on failure
//! either schedule a backoff wait (transient status, retries left) or fail
//! terminally. The backoff for consecutive retry N is `retry_delay * 2^(N-1)`,
//! so the default 3s base yields 3s, 6s, 12s, 24s.

use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::{ApiError, ApiResult, ApiTransport};
use crate::harvest::{HarvestConfig, Pacer};

/// Classifies failures and schedules backoff waits.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt
    pub max_retries: u32,
    /// Base backoff delay, doubled per consecutive retry
    pub retry_delay: Duration,
    /// Statuses treated as transient
    pub retry_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let config = HarvestConfig::default();
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            retry_statuses: config.retry_statuses,
        }
    }
}

impl RetryPolicy {
    /// Whether this failure is worth another attempt.
    ///
    /// Only failures that expose a status code in the transient set qualify.
    /// Failures with no extractable status are always terminal.
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        match error.status() {
            Some(status) => self.retry_statuses.contains(&status),
            None => false,
        }
    }

    /// Backoff before consecutive retry `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_delay.saturating_mul(factor)
    }
}

/// Paced, retrying fetch front-end over an [`ApiTransport`].
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn ApiTransport>,
    pacer: Pacer,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn ApiTransport>, pacer: Pacer, policy: RetryPolicy) -> Self {
        Self {
            transport,
            pacer,
            policy,
        }
    }

    /// Fetcher configured from a harvest config's request pacing and retry
    /// fields.
    pub fn from_config(transport: Arc<dyn ApiTransport>, config: &HarvestConfig) -> Self {
        Self::new(
            transport,
            Pacer::new(config.request_delay, config.request_jitter),
            RetryPolicy {
                max_retries: config.max_retries,
                retry_delay: config.retry_delay,
                retry_statuses: config.retry_statuses.clone(),
            },
        )
    }

    /// Fetch `endpoint`, retrying transient failures with exponential
    /// backoff. With `max_retries = 4` the transport sees at most five
    /// calls; every call is preceded by the same pacing wait.
    pub async fn fetch(&self, endpoint: &str) -> ApiResult<Value> {
        let mut attempt: u32 = 0;
        loop {
            self.pacer.wait().await;
            match self.transport.fetch(endpoint).await {
                Ok(payload) => return Ok(payload),
                Err(error) => {
                    attempt += 1;
                    if !self.policy.is_retryable(&error) || attempt > self.policy.max_retries {
                        debug!(%endpoint, attempt, %error, "fetch failed terminally");
                        return Err(error);
                    }
                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        %endpoint,
                        attempt,
                        max_retries = self.policy.max_retries,
                        backoff_secs = backoff.as_secs_f64(),
                        %error,
                        "transient failure, backing off"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }
}
