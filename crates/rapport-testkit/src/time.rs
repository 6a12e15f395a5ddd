//! Simulated time
//!
//! A clock that only moves when told to. Sleeping advances the clock by the
//! requested amount and records it, so pacing logic can be asserted without
//! waiting in real time.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use rapport_core::PhysicalTimeEffects;
use std::sync::Arc;

/// Start instant of a default simulated clock: 2026-01-01T00:00:00Z.
pub const DEFAULT_START: i64 = 1_767_225_600;

/// Deterministic [`PhysicalTimeEffects`] implementation.
#[derive(Debug, Clone)]
pub struct SimulatedTimeHandler {
    now: Arc<Mutex<DateTime<Utc>>>,
    sleeps: Arc<Mutex<Vec<u64>>>,
}

impl Default for SimulatedTimeHandler {
    fn default() -> Self {
        Self::starting_at(Utc.timestamp_opt(DEFAULT_START, 0).unwrap())
    }
}

impl SimulatedTimeHandler {
    /// Clock starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }

    /// Every sleep requested so far, in milliseconds.
    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl PhysicalTimeEffects for SimulatedTimeHandler {
    fn physical_time(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    async fn sleep_ms(&self, ms: u64) {
        self.sleeps.lock().push(ms);
        self.advance(Duration::milliseconds(ms as i64));
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleep_advances_and_records() {
        let time = SimulatedTimeHandler::default();
        let start = time.physical_time();
        time.sleep_ms(1500).await;
        assert_eq!(time.physical_time() - start, Duration::milliseconds(1500));
        assert_eq!(time.sleeps(), vec![1500]);
    }

    #[test]
    fn clones_share_one_clock() {
        let time = SimulatedTimeHandler::default();
        let other = time.clone();
        time.advance_secs(60);
        assert_eq!(time.physical_time(), other.physical_time());
    }
}
