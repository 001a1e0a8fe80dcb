//! Suspension primitive shared by the resolver, enumerator and batch runner
//!
//! Every wait in the pipeline goes through a [`Clock`] so tests can swap the
//! real timer for a [`VirtualClock`] that advances instantly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A source of suspension points
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Suspends the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real timer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock whose sleeps return immediately and only advance a counter
///
/// Clones share the same elapsed time, so a fake driver holding a clone can
/// decide what to report based on how long the caller has "waited".
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    elapsed_ms: Arc<AtomicU64>,
    sleeps: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time slept so far
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }

    /// Number of sleep calls observed
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }

    /// Moves virtual time forward without a sleep call
    pub fn advance(&self, duration: Duration) {
        self.elapsed_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
