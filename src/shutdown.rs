//! Graceful stop signalling between the Ctrl+C handler and the harvest loop.
//!
//! The orchestrator consults the coordinator between shards and while
//! pacing before one, so an interrupted run still writes its final
//! checkpoint and resumes at shard granularity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a shutdown coordinator.
pub type SharedShutdown = Arc<ShutdownCoordinator>;

/// One-way stop flag with an async wakeup for tasks parked on it.
///
/// Requesting is idempotent; once set the flag never clears for the life of
/// the process.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    is_shutdown: AtomicBool,
    notify: Notify,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            is_shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Coordinator behind an [`Arc`], ready to hand to spawned tasks.
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Set the stop flag and wake every task currently parked in
    /// [`wait_for_shutdown`](Self::wait_for_shutdown). Repeat calls are
    /// no-ops.
    pub fn request_shutdown(&self) {
        if !self.is_shutdown.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// True once [`request_shutdown`](Self::request_shutdown) has run.
    pub fn is_shutdown_requested(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Park until a shutdown is requested; a request that already happened
    /// resolves the wait immediately.
    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.notify.notified().await;
    }
}
