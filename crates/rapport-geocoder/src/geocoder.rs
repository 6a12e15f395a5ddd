//! # Geocoder
//!
//! ```text
//! geocode(address)
//!   ├─ cache hit ───────────────────────────────► cached value (maybe None)
//!   ├─ same address already pending ────────────► await the shared request
//!   └─ miss ─► queue +1 ─► request gate ─► pace ─► service ─► classify ─► queue −1
//! ```
//!
//! The request gate is an async mutex held across the pacing sleep and the
//! service call, so outbound requests never overlap. Pacing only controls when
//! the next request may start.
//!
//! Each miss is resolved on a spawned task. A caller that stops waiting does
//! not abort the request; its result still lands in the cache.

use crate::error::GeocodeError;
use crate::service::{GeocodingService, Placemark};
use async_lock::Mutex as AsyncMutex;
use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use rapport_core::{Coordinate, PhysicalTimeEffects, PostalAddress};
use rapport_store::{CacheLookup, PersistentCache};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum spacing between outbound request starts.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

/// Callback receiving the queue depth every time it changes.
pub type QueueObserver = Arc<dyn Fn(usize) + Send + Sync>;

type PendingLookup = Shared<BoxFuture<'static, Option<Coordinate>>>;

/// How long to wait before the next request may start.
///
/// `max(0, min_interval - (now - last_start))`; zero when nothing ran yet.
pub fn pacing_delay(
    last_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    min_interval: Duration,
) -> Duration {
    match last_start {
        None => Duration::zero(),
        Some(last) => {
            let remaining = min_interval - (now - last);
            if remaining > Duration::zero() {
                remaining
            } else {
                Duration::zero()
            }
        }
    }
}

/// Lookup depth counter with synchronous change notification.
#[derive(Default)]
struct QueueDepth {
    depth: Mutex<usize>,
    current: AtomicUsize,
    observers: Mutex<Vec<QueueObserver>>,
}

impl QueueDepth {
    fn adjust(&self, up: bool) {
        let mut depth = self.depth.lock();
        *depth = if up {
            *depth + 1
        } else {
            depth.saturating_sub(1)
        };
        self.current.store(*depth, Ordering::SeqCst);

        // Notified under the depth lock so observers see changes in order.
        let observers = self.observers.lock().clone();
        for observer in &observers {
            observer(*depth);
        }
    }

    fn enter(&self) -> QueueSlot<'_> {
        self.adjust(true);
        QueueSlot { depth: self }
    }
}

/// Decrements the queue depth on every exit path, including cancellation.
struct QueueSlot<'a> {
    depth: &'a QueueDepth,
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.depth.adjust(false);
    }
}

/// Cached, paced, serialized geocoder.
pub struct Geocoder {
    cache: Mutex<PersistentCache<Coordinate>>,
    service: Arc<dyn GeocodingService>,
    time: Arc<dyn PhysicalTimeEffects>,
    min_interval: Duration,
    last_request_start: AsyncMutex<Option<DateTime<Utc>>>,
    pending: Mutex<HashMap<String, PendingLookup>>,
    queue: QueueDepth,
}

impl Geocoder {
    /// Create a geocoder over `cache` and `service`.
    pub fn new(
        cache: PersistentCache<Coordinate>,
        service: Arc<dyn GeocodingService>,
        time: Arc<dyn PhysicalTimeEffects>,
    ) -> Self {
        Self {
            cache: Mutex::new(cache),
            service,
            time,
            min_interval: Duration::milliseconds(DEFAULT_MIN_INTERVAL_MS as i64),
            last_request_start: AsyncMutex::new(None),
            pending: Mutex::new(HashMap::new()),
            queue: QueueDepth::default(),
        }
    }

    /// Override the minimum spacing between request starts.
    pub fn with_min_interval_ms(mut self, ms: u64) -> Self {
        self.min_interval = Duration::milliseconds(ms as i64);
        self
    }

    /// Register a queue depth observer. Observers run synchronously on the
    /// thread that changed the depth and must not call back into the geocoder.
    pub fn observe_queue(&self, observer: QueueObserver) {
        self.queue.observers.lock().push(observer);
    }

    /// Lookups currently queued or running.
    pub fn queue_depth(&self) -> usize {
        self.queue.current.load(Ordering::SeqCst)
    }

    /// Cache-only lookup. Never touches the network.
    pub fn get_cached(&self, address: &PostalAddress) -> Option<Coordinate> {
        self.lookup_cached(address).into_value()
    }

    /// Cache-only lookup that distinguishes a miss from a remembered
    /// "no result".
    pub fn lookup_cached(&self, address: &PostalAddress) -> CacheLookup<Coordinate> {
        self.cache.lock().get(&address.id())
    }

    /// Seed the cache with an already known coordinate.
    pub fn cache(&self, address: &PostalAddress, coordinate: Coordinate) {
        self.cache.lock().update(address.id(), Some(coordinate));
    }

    /// Resolve `address`, consulting the cache first.
    ///
    /// Returns `None` for remembered or fresh "no result" answers and for
    /// failures that will be retried on the next call.
    pub async fn geocode(self: &Arc<Self>, address: &PostalAddress) -> Option<Coordinate> {
        let key = address.id();
        if let CacheLookup::Hit(value) = self.cache.lock().get(&key) {
            return value;
        }

        let lookup = {
            let mut pending = self.pending.lock();
            match pending.get(&key) {
                Some(existing) => {
                    debug!(address_id = %key, "Joining pending geocode");
                    existing.clone()
                }
                None => {
                    let lookup = self.spawn_lookup(key.clone(), address.clone());
                    pending.insert(key, lookup.clone());
                    lookup
                }
            }
        };
        lookup.await
    }

    fn spawn_lookup(self: &Arc<Self>, key: String, address: PostalAddress) -> PendingLookup {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = this.resolve_paced(&key, &address).await;
            this.pending.lock().remove(&key);
            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "Geocode task failed");
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn resolve_paced(&self, key: &str, address: &PostalAddress) -> Option<Coordinate> {
        let _slot = self.queue.enter();
        let mut last_start = self.last_request_start.lock().await;

        // Another lookup may have resolved this address while we queued.
        if let CacheLookup::Hit(value) = self.cache.lock().get(key) {
            return value;
        }

        let delay = pacing_delay(*last_start, self.time.physical_time(), self.min_interval);
        let delay_ms = u64::try_from(delay.num_milliseconds()).unwrap_or(0);
        if delay_ms > 0 {
            debug!(address_id = %key, delay_ms, "Pacing geocode request");
            self.time.sleep_ms(delay_ms).await;
        }
        *last_start = Some(self.time.physical_time());

        let outcome = self.service.resolve(address).await;
        self.record(key, outcome)
    }

    fn record(
        &self,
        key: &str,
        outcome: Result<Vec<Placemark>, GeocodeError>,
    ) -> Option<Coordinate> {
        let outcome = outcome.and_then(|placemarks| {
            if placemarks.is_empty() {
                Err(GeocodeError::NoResult)
            } else {
                Ok(placemarks)
            }
        });

        match outcome {
            Ok(placemarks) => {
                let coordinate = placemarks.iter().find_map(|p| p.coordinate);
                match coordinate {
                    Some(coordinate) => {
                        debug!(address_id = %key, "Geocoded address");
                        self.cache.lock().update(key, Some(coordinate));
                        Some(coordinate)
                    }
                    None => {
                        debug!(address_id = %key, "Placemarks carried no coordinate");
                        None
                    }
                }
            }
            Err(e) => {
                debug!(address_id = %key, kind = e.kind(), error = %e, "Geocode failed");
                if e.is_cacheable() {
                    self.cache.lock().update(key, None);
                }
                None
            }
        }
    }
}
