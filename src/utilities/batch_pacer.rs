//! Fixed-interval pacing between batches.
//!
//! The whole backpressure policy toward the generation capability is "one
//! batch, then one interval of silence". There is no token bucket and no
//! retry queue. A pacer is created per run so its pause counter describes
//! that run only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Sleeps for a fixed interval between consecutive batches.
#[derive(Debug)]
pub struct BatchPacer {
    interval: Duration,
    pauses: AtomicUsize,
}

impl BatchPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pauses: AtomicUsize::new(0),
        }
    }

    /// Wait out one interval. A zero interval still yields to the runtime.
    pub async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        if self.interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Number of pauses taken so far.
    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pause_waits_interval() {
        let pacer = BatchPacer::new(Duration::from_millis(30));
        let started = Instant::now();
        pacer.pause().await;
        pacer.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(pacer.pauses(), 2);
    }

    #[tokio::test]
    async fn test_zero_interval_counts() {
        let pacer = BatchPacer::new(Duration::ZERO);
        pacer.pause().await;
        assert_eq!(pacer.pauses(), 1);
    }
}
