//! Request pacing
//!
//! Every outbound request and every shard is preceded by a minimum delay
//! plus uniform random jitter. Waiting happens up front so that retries and
//! sub-shard requests are paced exactly like first attempts.

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Minimum-delay-plus-jitter pacer.
#[derive(Debug, Clone)]
pub struct Pacer {
    base: Duration,
    jitter: Duration,
}

impl Pacer {
    /// Pacer waiting `base` plus a uniform random slice of `jitter`.
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Pacer that never waits.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Wait out the configured delay. Returns immediately when both the
    /// base delay and jitter are zero so tests never touch the timer.
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        let fraction: f64 = rand::thread_rng().gen_range(0.0..1.0);
        self.base + self.jitter.mul_f64(fraction)
    }
}
