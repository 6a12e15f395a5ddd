#![allow(clippy::expect_used, clippy::unwrap_used)]
//! # Geocoder Behaviour Tests
//!
//! Drives [`Geocoder`] against a scripted service on a simulated clock:
//! caching of each outcome class, request pacing and serialization,
//! coalescing, queue depth observation and caller cancellation.

use chrono::Duration;
use futures::FutureExt;
use parking_lot::Mutex;
use rapport_core::{Coordinate, PostalAddress};
use rapport_geocoder::{GeocodeError, Geocoder};
use rapport_store::{CacheLookup, PersistentCache};
use rapport_testkit::{address, ScriptedGeocodingService, ScriptedReply, SimulatedTimeHandler};
use std::sync::Arc;

struct Harness {
    time: Arc<SimulatedTimeHandler>,
    service: Arc<ScriptedGeocodingService>,
    geocoder: Arc<Geocoder>,
}

fn harness_with(latency_ms: u64) -> Harness {
    let time = Arc::new(SimulatedTimeHandler::default());
    let service =
        Arc::new(ScriptedGeocodingService::new(time.clone()).with_latency_ms(latency_ms));
    let cache = PersistentCache::in_memory(100, time.clone());
    let geocoder = Arc::new(Geocoder::new(cache, service.clone(), time.clone()));
    Harness {
        time,
        service,
        geocoder,
    }
}

fn harness() -> Harness {
    harness_with(0)
}

fn berlin() -> Coordinate {
    Coordinate::new(52.52, 13.405)
}

// ============================================================================
// Outcome classification
// ============================================================================

#[tokio::test]
async fn success_is_cached_and_not_requested_again() {
    let h = harness();
    let home = address("Unter den Linden 1", "Berlin");
    h.service.resolve_to(&home, berlin());

    assert_eq!(h.geocoder.geocode(&home).await, Some(berlin()));
    assert_eq!(h.geocoder.geocode(&home).await, Some(berlin()));
    assert_eq!(h.service.requested().len(), 1);
    assert_eq!(h.geocoder.get_cached(&home), Some(berlin()));
}

#[tokio::test]
async fn no_result_is_remembered() {
    let h = harness();
    let nowhere = address("Nowhere 0", "Atlantis");
    h.service
        .reply(&nowhere, ScriptedReply::Fail(GeocodeError::NoResult));

    assert_eq!(h.geocoder.geocode(&nowhere).await, None);
    assert_eq!(h.geocoder.lookup_cached(&nowhere), CacheLookup::Hit(None));
    assert_eq!(h.geocoder.geocode(&nowhere).await, None);
    assert_eq!(h.service.requested().len(), 1);
}

#[tokio::test]
async fn empty_placemark_list_counts_as_no_result() {
    let h = harness();
    let nowhere = address("Nowhere 0", "Atlantis");
    h.service.reply(&nowhere, ScriptedReply::Empty);

    assert_eq!(h.geocoder.geocode(&nowhere).await, None);
    assert_eq!(h.geocoder.lookup_cached(&nowhere), CacheLookup::Hit(None));
}

#[tokio::test]
async fn rate_limit_and_unknown_failures_are_retried() {
    let h = harness();
    let throttled = address("Busy St 1", "Berlin");
    let broken = address("Broken St 1", "Berlin");
    h.service.reply(
        &throttled,
        ScriptedReply::Fail(GeocodeError::RateLimited {
            reason: "slow down".into(),
        }),
    );
    h.service.reply(
        &broken,
        ScriptedReply::Fail(GeocodeError::Unknown {
            reason: "boom".into(),
        }),
    );

    for a in [&throttled, &broken] {
        assert_eq!(h.geocoder.geocode(a).await, None);
        assert_eq!(h.geocoder.lookup_cached(a), CacheLookup::Miss);
    }

    h.service.resolve_to(&throttled, berlin());
    assert_eq!(h.geocoder.geocode(&throttled).await, Some(berlin()));
    assert_eq!(h.service.requested().len(), 3);
}

#[tokio::test]
async fn placemarks_without_coordinate_are_not_cached() {
    let h = harness();
    let vague = address("Somewhere", "Berlin");
    h.service.reply(&vague, ScriptedReply::Unresolved);

    assert_eq!(h.geocoder.geocode(&vague).await, None);
    assert_eq!(h.geocoder.lookup_cached(&vague), CacheLookup::Miss);
    assert_eq!(h.geocoder.queue_depth(), 0);
}

#[tokio::test]
async fn seeded_coordinate_skips_the_service() {
    let h = harness();
    let home = address("Unter den Linden 1", "Berlin");
    h.geocoder.cache(&home, berlin());

    assert_eq!(h.geocoder.geocode(&home).await, Some(berlin()));
    assert!(h.service.requested().is_empty());
}

#[tokio::test]
async fn label_does_not_split_the_cache_key() {
    let h = harness();
    let home = address("Unter den Linden 1", "Berlin");
    h.service.resolve_to(&home, berlin());
    h.geocoder.geocode(&home).await;

    let labelled = PostalAddress {
        label: Some("home".into()),
        ..home.clone()
    };
    assert_eq!(h.geocoder.get_cached(&labelled), Some(berlin()));
}

// ============================================================================
// Pacing and serialization
// ============================================================================

#[tokio::test]
async fn back_to_back_requests_start_a_second_apart() {
    let h = harness();
    let a = address("A St 1", "Berlin");
    let b = address("B St 1", "Berlin");
    h.service.resolve_to(&a, berlin());
    h.service.resolve_to(&b, berlin());

    h.geocoder.geocode(&a).await;
    h.geocoder.geocode(&b).await;

    let starts = h.service.request_starts();
    assert_eq!(starts.len(), 2);
    assert!(starts[1] - starts[0] >= Duration::seconds(1));
    assert_eq!(h.time.sleeps(), vec![1000]);
}

#[tokio::test]
async fn elapsed_time_counts_toward_the_interval() {
    let h = harness();
    let a = address("A St 1", "Berlin");
    let b = address("B St 1", "Berlin");

    h.geocoder.geocode(&a).await;
    h.time.advance(Duration::milliseconds(400));
    h.geocoder.geocode(&b).await;

    assert_eq!(h.time.sleeps(), vec![600]);
}

#[tokio::test]
async fn concurrent_lookups_never_overlap() {
    let h = harness_with(250);
    let addresses: Vec<PostalAddress> = (0..4)
        .map(|i| address(&format!("{i} Main St"), "Berlin"))
        .collect();

    let lookups = addresses.iter().map(|a| h.geocoder.geocode(a));
    futures::future::join_all(lookups).await;

    assert_eq!(h.service.requested().len(), 4);
    assert_eq!(h.service.max_concurrent(), 1);
    let starts = h.service.request_starts();
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::seconds(1));
    }
}

#[tokio::test]
async fn concurrent_lookups_of_one_address_share_a_request() {
    let h = harness();
    let home = address("Unter den Linden 1", "Berlin");
    h.service.resolve_to(&home, berlin());

    let (first, second) =
        futures::join!(h.geocoder.geocode(&home), h.geocoder.geocode(&home));

    assert_eq!(first, Some(berlin()));
    assert_eq!(second, Some(berlin()));
    assert_eq!(h.service.requested().len(), 1);
}

// ============================================================================
// Queue observation and cancellation
// ============================================================================

#[tokio::test]
async fn queue_depth_is_reported_on_every_change() {
    let h = harness();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.geocoder
        .observe_queue(Arc::new(move |depth| sink.lock().push(depth)));

    let a = address("A St 1", "Berlin");
    let b = address("B St 1", "Berlin");
    h.geocoder.geocode(&a).await;
    h.geocoder.geocode(&b).await;
    h.geocoder.geocode(&a).await;

    assert_eq!(*seen.lock(), vec![1, 0, 1, 0]);
}

#[tokio::test]
async fn queue_depth_counts_waiting_lookups() {
    let h = harness_with(100);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.geocoder
        .observe_queue(Arc::new(move |depth| sink.lock().push(depth)));

    let a = address("A St 1", "Berlin");
    let b = address("B St 1", "Berlin");
    futures::join!(h.geocoder.geocode(&a), h.geocoder.geocode(&b));

    let seen = seen.lock().clone();
    assert_eq!(seen.iter().max(), Some(&2));
    assert_eq!(seen.last(), Some(&0));
    assert_eq!(h.geocoder.queue_depth(), 0);
}

#[tokio::test]
async fn abandoned_lookup_still_lands_in_the_cache() {
    let h = harness();
    let home = address("Unter den Linden 1", "Berlin");
    h.service.resolve_to(&home, berlin());

    // Poll once, then drop the caller's future.
    assert!(h.geocoder.geocode(&home).now_or_never().is_none());

    for _ in 0..16 {
        if h.geocoder.get_cached(&home).is_some() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(h.geocoder.get_cached(&home), Some(berlin()));
    assert_eq!(h.geocoder.queue_depth(), 0);
}

#[tokio::test]
async fn results_survive_reopening_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geocode-cache-v2.json");
    let time = Arc::new(SimulatedTimeHandler::default());
    let service = Arc::new(ScriptedGeocodingService::new(time.clone()));
    let home = address("Unter den Linden 1", "Berlin");
    service.resolve_to(&home, berlin());

    let cache = PersistentCache::open(&path, 100, time.clone());
    let geocoder = Arc::new(Geocoder::new(cache, service, time.clone()));
    geocoder.geocode(&home).await;

    let mut reopened: PersistentCache<Coordinate> = PersistentCache::open(&path, 100, time);
    assert_eq!(reopened.get(&home.id()), CacheLookup::Hit(Some(berlin())));
}
