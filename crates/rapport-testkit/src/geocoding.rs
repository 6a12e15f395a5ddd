//! Scripted geocoding service
//!
//! Replies are looked up by address id. Every call records the simulated
//! time it started at, which is what pacing tests assert against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rapport_core::{Coordinate, PhysicalTimeEffects, PostalAddress};
use rapport_geocoder::{GeocodeError, GeocodingService, Placemark};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What the service answers for one address.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A single placemark at the coordinate
    Found(Coordinate),
    /// Placemarks without any coordinate
    Unresolved,
    /// A successful call with no placemarks
    Empty,
    /// A classified failure
    Fail(GeocodeError),
}

/// [`GeocodingService`] double driven by a reply table.
pub struct ScriptedGeocodingService {
    time: Arc<dyn PhysicalTimeEffects>,
    replies: Mutex<HashMap<String, ScriptedReply>>,
    requests: Mutex<Vec<(String, DateTime<Utc>)>>,
    latency_ms: u64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGeocodingService {
    /// Service with no scripted replies; unknown addresses fail with `NoResult`.
    pub fn new(time: Arc<dyn PhysicalTimeEffects>) -> Self {
        Self {
            time,
            replies: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            latency_ms: 0,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Simulated time each request spends in the service.
    pub fn with_latency_ms(mut self, ms: u64) -> Self {
        self.latency_ms = ms;
        self
    }

    /// Script the reply for `address`.
    pub fn reply(&self, address: &PostalAddress, reply: ScriptedReply) {
        self.replies.lock().insert(address.id(), reply);
    }

    /// Script a successful resolution for `address`.
    pub fn resolve_to(&self, address: &PostalAddress, coordinate: Coordinate) {
        self.reply(address, ScriptedReply::Found(coordinate));
    }

    /// Address ids requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Start time of every request, in order.
    pub fn request_starts(&self) -> Vec<DateTime<Utc>> {
        self.requests.lock().iter().map(|(_, at)| *at).collect()
    }

    /// Highest number of requests ever running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingService for ScriptedGeocodingService {
    async fn resolve(&self, address: &PostalAddress) -> Result<Vec<Placemark>, GeocodeError> {
        let key = address.id();
        self.requests
            .lock()
            .push((key.clone(), self.time.physical_time()));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if self.latency_ms > 0 {
            self.time.sleep_ms(self.latency_ms).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = self.replies.lock().get(&key).cloned();
        match reply {
            Some(ScriptedReply::Found(coordinate)) => Ok(vec![Placemark::at(coordinate)]),
            Some(ScriptedReply::Unresolved) => Ok(vec![Placemark::default()]),
            Some(ScriptedReply::Empty) => Ok(Vec::new()),
            Some(ScriptedReply::Fail(e)) => Err(e),
            None => Err(GeocodeError::NoResult),
        }
    }
}
