//! Physical time effects
//!
//! Wall-clock reads and sleeps go through [`PhysicalTimeEffects`] so that
//! pacing, cache access stamps and overdue derivation can run against a
//! simulated clock in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wall-clock time provider.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time.
    fn physical_time(&self) -> DateTime<Utc>;

    /// Suspend for `ms` milliseconds.
    async fn sleep_ms(&self, ms: u64);
}

/// Real time handler for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    fn physical_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_ms(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
