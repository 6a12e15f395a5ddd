#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! # Workflow Integration Tests
//!
//! Exercise the effect layer end to end: in-memory sources, simulated time and
//! a scripted geocoding service behind a real context and reducer.

use assert_matches::assert_matches;
use chrono::Duration;
use futures::StreamExt;
use futures_signals::signal::SignalExt;
use rapport_app::sources::{InMemoryCalendarSource, InMemoryContactSource, InMemoryLocationSource};
use rapport_app::workflows::{
    add_postal_address, apply_resolved_coordinate, assign_address_from_search, delete_contact,
    geocode_pending_addresses, request_contacts_access, set_person_affinity, sync_all,
    sync_calendar, sync_contacts, update_postal_address, watch_sources,
};
use rapport_app::{
    AppContext, AppError, AuthorizationStatus, ErrorCategory, RapportConfig, StorageMode,
};
use rapport_core::{
    Affinity, CalendarEvent, Contact, ContactId, Coordinate, PhysicalTimeEffects,
};
use rapport_store::AffinityStore;
use rapport_testkit::{
    address, ContactBuilder, EventBuilder, ScriptedGeocodingService,
    SimulatedTimeHandler,
};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Fixture
// ============================================================================

struct Fixture {
    time: Arc<SimulatedTimeHandler>,
    geocoding: Arc<ScriptedGeocodingService>,
    contacts: Arc<InMemoryContactSource>,
    calendar: Arc<InMemoryCalendarSource>,
    location: Arc<InMemoryLocationSource>,
    ctx: Arc<AppContext>,
}

impl Fixture {
    fn new(contacts: InMemoryContactSource, calendar: InMemoryCalendarSource) -> Self {
        Self::build(contacts, calendar, RapportConfig::default(), StorageMode::Memory)
    }

    fn on_disk(dir: &Path, contacts: Vec<Contact>) -> Self {
        Self::build(
            InMemoryContactSource::authorized(contacts),
            InMemoryCalendarSource::authorized(Vec::new()),
            RapportConfig::with_data_dir(dir),
            StorageMode::Disk,
        )
    }

    fn build(
        contacts: InMemoryContactSource,
        calendar: InMemoryCalendarSource,
        config: RapportConfig,
        storage: StorageMode,
    ) -> Self {
        let time = Arc::new(SimulatedTimeHandler::default());
        let geocoding = Arc::new(ScriptedGeocodingService::new(time.clone()));
        let contacts = Arc::new(contacts);
        let calendar = Arc::new(calendar);
        let location = Arc::new(InMemoryLocationSource::new(AuthorizationStatus::NotDetermined));
        let ctx = AppContext::builder(config)
            .storage(storage)
            .time(time.clone())
            .geocoding(geocoding.clone())
            .contacts(contacts.clone())
            .calendar(calendar.clone())
            .location(location.clone())
            .build();
        Self {
            time,
            geocoding,
            contacts,
            calendar,
            location,
            ctx,
        }
    }

    fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self::new(
            InMemoryContactSource::authorized(contacts),
            InMemoryCalendarSource::authorized(Vec::new()),
        )
    }
}

fn ann() -> Contact {
    ContactBuilder::new("ann")
        .given("Ann")
        .family("Lee")
        .email("ann@example.com")
        .address(address("Kastanienallee 1", "Berlin"))
        .build()
}

fn bo() -> Contact {
    ContactBuilder::new("bo")
        .given("Bo")
        .family("Berg")
        .address(address("Storgatan 4", "Malmo"))
        .build()
}

fn ann_id() -> ContactId {
    ContactId::new("ann")
}

// ============================================================================
// Sync
// ============================================================================

#[tokio::test]
async fn contact_sync_publishes_persons_once() {
    let fx = Fixture::with_contacts(vec![ann(), bo()]);

    assert!(sync_contacts(&fx.ctx).await.unwrap());
    let state = fx.ctx.core().snapshot();
    assert_eq!(state.persons.len(), 2);
    assert!(state.authorizations.contacts.is_authorized());

    assert!(!sync_contacts(&fx.ctx).await.unwrap());
}

#[tokio::test]
async fn contact_sync_without_permission_is_skipped() {
    let fx = Fixture::new(
        InMemoryContactSource::new(AuthorizationStatus::Denied, vec![ann()]),
        InMemoryCalendarSource::authorized(Vec::new()),
    );

    assert!(!sync_contacts(&fx.ctx).await.unwrap());
    let state = fx.ctx.core().snapshot();
    assert!(state.persons.is_empty());
    assert_eq!(state.authorizations.contacts, AuthorizationStatus::Denied);
}

#[tokio::test]
async fn calendar_sync_keeps_events_inside_the_window() {
    let fx = Fixture::with_contacts(vec![ann()]);
    let now = fx.time.physical_time();
    fx.calendar.replace_all(vec![
        EventBuilder::days_ago("ancient", now, 400)
            .attendee("ann@example.com")
            .build(),
        EventBuilder::days_ago("recent", now, 3)
            .attendee("ann@example.com")
            .build(),
    ]);

    sync_contacts(&fx.ctx).await.unwrap();
    assert!(sync_calendar(&fx.ctx).await.unwrap());

    let state = fx.ctx.core().snapshot();
    let ids: Vec<&str> = state.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["recent"]);
    assert_eq!(
        state.person(&ann_id()).unwrap().days_since_contact,
        Some(3)
    );

    assert!(!sync_calendar(&fx.ctx).await.unwrap());
}

#[tokio::test]
async fn sync_all_mirrors_every_permission() {
    let fx = Fixture::with_contacts(vec![ann()]);
    sync_all(&fx.ctx).await.unwrap();

    let state = fx.ctx.core().snapshot();
    assert_eq!(state.authorizations.contacts, AuthorizationStatus::Authorized);
    assert_eq!(state.authorizations.calendar, AuthorizationStatus::Authorized);
    assert_eq!(state.authorizations.location, AuthorizationStatus::NotDetermined);
    assert_eq!(state.persons.len(), 1);
}

#[tokio::test]
async fn granted_contact_access_syncs_immediately() {
    let fx = Fixture::new(
        InMemoryContactSource::new(AuthorizationStatus::NotDetermined, vec![ann()]),
        InMemoryCalendarSource::authorized(Vec::new()),
    );

    let status = request_contacts_access(&fx.ctx).await.unwrap();
    assert_eq!(status, AuthorizationStatus::Authorized);
    assert_eq!(fx.ctx.core().snapshot().persons.len(), 1);
}

#[tokio::test]
async fn refused_contact_access_leaves_list_empty() {
    let fx = Fixture::new(
        InMemoryContactSource::new(AuthorizationStatus::NotDetermined, vec![ann()])
            .granting(AuthorizationStatus::Denied),
        InMemoryCalendarSource::authorized(Vec::new()),
    );

    let status = request_contacts_access(&fx.ctx).await.unwrap();
    assert_eq!(status, AuthorizationStatus::Denied);
    let state = fx.ctx.core().snapshot();
    assert!(state.persons.is_empty());
    assert_eq!(state.authorizations.contacts, AuthorizationStatus::Denied);
}

// ============================================================================
// Edits
// ============================================================================

#[tokio::test]
async fn failed_edit_leaves_state_untouched() {
    let fx = Fixture::with_contacts(vec![ann()]);
    sync_contacts(&fx.ctx).await.unwrap();
    let before = fx.ctx.core().snapshot();

    fx.contacts.set_authorization(AuthorizationStatus::Denied);
    let err = add_postal_address(&fx.ctx, &ann_id(), address("Neue Str 9", "Berlin"))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        AppError::Source {
            operation: "add postal address",
            ..
        }
    );
    assert_eq!(err.category(), ErrorCategory::Permission);
    assert_eq!(fx.ctx.core().snapshot(), before);
}

#[tokio::test]
async fn blank_address_is_rejected_before_the_store() {
    let fx = Fixture::with_contacts(vec![ann()]);
    let err = add_postal_address(&fx.ctx, &ann_id(), Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[tokio::test]
async fn unknown_contact_edit_is_not_found() {
    let fx = Fixture::with_contacts(vec![ann()]);
    let err = add_postal_address(&fx.ctx, &ContactId::new("ghost"), address("A", "B"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn search_assignment_is_located_without_a_lookup() {
    let fx = Fixture::with_contacts(vec![ann()]);
    sync_contacts(&fx.ctx).await.unwrap();

    let picked = address("Torstrasse 60", "Berlin");
    let coordinate = Coordinate::new(52.529, 13.401);
    let stored = assign_address_from_search(&fx.ctx, &ann_id(), picked.clone(), coordinate)
        .await
        .unwrap();

    let added = stored.address(&picked.id()).unwrap();
    assert_eq!(added.coordinate, Some(coordinate));
    assert!(fx.geocoding.requested().is_empty());

    let state = fx.ctx.core().snapshot();
    let located = state.person(&ann_id()).unwrap().located_locations();
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].coordinate(), Some(coordinate));
}

#[tokio::test]
async fn deleting_a_contact_forgets_its_rating() {
    let fx = Fixture::with_contacts(vec![ann(), bo()]);
    sync_contacts(&fx.ctx).await.unwrap();
    set_person_affinity(&fx.ctx, &ann_id(), Affinity::Close)
        .await
        .unwrap();

    delete_contact(&fx.ctx, &ann_id()).await.unwrap();

    let state = fx.ctx.core().snapshot();
    assert!(state.person(&ann_id()).is_none());
    assert!(!state.affinities.contains_key(&ann_id()));
    assert_eq!(fx.ctx.affinities().lock().get(&ann_id()), Affinity::Undefined);
}

// ============================================================================
// Affinity
// ============================================================================

#[tokio::test]
async fn rating_persists_and_rederives_the_person() {
    let dir = tempfile::tempdir().unwrap();
    let fx = Fixture::on_disk(dir.path(), vec![ann()]);
    sync_contacts(&fx.ctx).await.unwrap();
    assert_eq!(
        fx.ctx.core().snapshot().person(&ann_id()).unwrap().affinity,
        Affinity::Undefined
    );

    set_person_affinity(&fx.ctx, &ann_id(), Affinity::Best)
        .await
        .unwrap();

    let state = fx.ctx.core().snapshot();
    let person = state.person(&ann_id()).unwrap();
    assert_eq!(person.affinity, Affinity::Best);
    assert_eq!(person.contact.affinity, Affinity::Best);

    let reopened = AffinityStore::open(fx.ctx.config().affinity_path());
    assert_eq!(reopened.get(&ann_id()), Affinity::Best);

    let restarted = Fixture::on_disk(dir.path(), vec![ann()]);
    sync_contacts(&restarted.ctx).await.unwrap();
    assert_eq!(
        restarted.ctx.core().snapshot().person(&ann_id()).unwrap().affinity,
        Affinity::Best
    );
}

#[tokio::test]
async fn failed_rating_write_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let fx = Fixture::on_disk(&blocker.join("data"), vec![ann(), bo()]);
    sync_contacts(&fx.ctx).await.unwrap();
    let before = fx.ctx.core().snapshot();

    let err = set_person_affinity(&fx.ctx, &ann_id(), Affinity::Best)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Storage);
    assert_eq!(fx.ctx.core().snapshot(), before);
    assert_eq!(fx.ctx.affinities().lock().get(&ann_id()), Affinity::Undefined);
    assert!(fx.ctx.affinities().lock().snapshot().is_empty());
}

#[tokio::test]
async fn resync_after_rating_is_unchanged() {
    let fx = Fixture::with_contacts(vec![ann(), bo()]);
    sync_contacts(&fx.ctx).await.unwrap();
    set_person_affinity(&fx.ctx, &ann_id(), Affinity::Close)
        .await
        .unwrap();

    assert!(!sync_contacts(&fx.ctx).await.unwrap());
    let state = fx.ctx.core().snapshot();
    let stored = state.contacts.iter().find(|c| c.id == ann_id()).unwrap();
    assert_eq!(stored.affinity, Affinity::Close);
}

// ============================================================================
// Geocoding
// ============================================================================

#[tokio::test]
async fn pending_addresses_are_geocoded_and_paced() {
    let fx = Fixture::with_contacts(vec![ann(), bo()]);
    let berlin = Coordinate::new(52.54, 13.41);
    let malmo = Coordinate::new(55.60, 13.00);
    fx.geocoding
        .resolve_to(&address("Kastanienallee 1", "Berlin"), berlin);
    fx.geocoding.resolve_to(&address("Storgatan 4", "Malmo"), malmo);
    sync_contacts(&fx.ctx).await.unwrap();

    let applied = geocode_pending_addresses(&fx.ctx).await;
    assert_eq!(applied, 2);

    let state = fx.ctx.core().snapshot();
    assert_eq!(state.visible_locations().len(), 2);
    assert_eq!(state.geocoder_queue, 0);

    let starts = fx.geocoding.request_starts();
    assert_eq!(starts.len(), 2);
    assert!(starts[1] - starts[0] >= Duration::milliseconds(1000));

    assert_eq!(geocode_pending_addresses(&fx.ctx).await, 0);
    assert_eq!(fx.geocoding.requested().len(), 2);
}

#[tokio::test]
async fn unresolvable_address_stays_off_the_map() {
    let fx = Fixture::with_contacts(vec![ann()]);
    sync_contacts(&fx.ctx).await.unwrap();

    assert_eq!(geocode_pending_addresses(&fx.ctx).await, 0);
    let state = fx.ctx.core().snapshot();
    assert!(state.visible_locations().is_empty());
    assert_eq!(state.geocoder_queue, 0);
}

#[tokio::test]
async fn resynced_contacts_pick_up_cached_coordinates() {
    let fx = Fixture::with_contacts(vec![ann()]);
    let home = address("Kastanienallee 1", "Berlin");
    fx.geocoding.resolve_to(&home, Coordinate::new(52.54, 13.41));
    sync_contacts(&fx.ctx).await.unwrap();
    geocode_pending_addresses(&fx.ctx).await;

    fx.contacts.replace_all(vec![ann(), bo()]);
    sync_contacts(&fx.ctx).await.unwrap();

    let state = fx.ctx.core().snapshot();
    assert!(state.person(&ann_id()).unwrap().contact.postal_addresses[0].is_located());
    assert_eq!(fx.geocoding.requested().len(), 1);
}

#[tokio::test]
async fn result_for_an_edited_address_is_discarded() {
    let fx = Fixture::with_contacts(vec![ann()]);
    sync_contacts(&fx.ctx).await.unwrap();
    let old_id = address("Kastanienallee 1", "Berlin").id();
    let moved = address("Oderberger Str 2", "Berlin");

    update_postal_address(&fx.ctx, &ann_id(), &old_id, moved.clone())
        .await
        .unwrap();

    let coordinate = Coordinate::new(52.54, 13.41);
    assert!(!apply_resolved_coordinate(&fx.ctx, &ann_id(), &old_id, coordinate));
    assert!(fx.ctx.core().snapshot().visible_locations().is_empty());

    assert!(apply_resolved_coordinate(&fx.ctx, &ann_id(), &moved.id(), coordinate));
    assert!(!apply_resolved_coordinate(
        &fx.ctx,
        &ann_id(),
        &moved.id(),
        Coordinate::new(0.0, 0.0)
    ));
    let state = fx.ctx.core().snapshot();
    assert_eq!(state.visible_locations()[0].coordinate(), Some(coordinate));
}

// ============================================================================
// Change feeds
// ============================================================================

async fn wait_for<T, F>(ctx: &AppContext, selector: F, expected: T)
where
    T: PartialEq + Clone + std::fmt::Debug,
    F: FnMut(&rapport_app::AppState) -> T,
{
    let mut values = ctx.core().subscribe(selector).to_stream();
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while let Some(value) = values.next().await {
            if value == expected {
                return;
            }
        }
    })
    .await
    .expect("state never reached the expected value");
}

#[tokio::test]
async fn watcher_resyncs_on_external_changes() {
    let fx = Fixture::with_contacts(vec![ann()]);
    sync_all(&fx.ctx).await.unwrap();

    let watcher = tokio::spawn(watch_sources(fx.ctx.clone()));
    tokio::task::yield_now().await;

    fx.contacts.replace_all(vec![ann(), bo()]);
    wait_for(&fx.ctx, |s| s.persons.len(), 2).await;

    fx.calendar.replace_all(vec![EventBuilder::days_ago(
        "walk",
        fx.time.physical_time(),
        1,
    )
    .attendee("ann@example.com")
    .build()]);
    wait_for(&fx.ctx, |s| s.events.len(), 1).await;

    fx.location.set_authorization(AuthorizationStatus::Denied);
    wait_for(
        &fx.ctx,
        |s| s.authorizations.location,
        AuthorizationStatus::Denied,
    )
    .await;

    watcher.abort();
}

#[tokio::test]
async fn watcher_geocodes_new_addresses() {
    let fx = Fixture::with_contacts(Vec::new());
    fx.geocoding.resolve_to(
        &address("Kastanienallee 1", "Berlin"),
        Coordinate::new(52.54, 13.41),
    );
    sync_all(&fx.ctx).await.unwrap();

    let watcher = tokio::spawn(watch_sources(fx.ctx.clone()));
    tokio::task::yield_now().await;

    fx.contacts.replace_all(vec![ann()]);
    wait_for(&fx.ctx, |s| s.visible_locations().len(), 1).await;

    watcher.abort();
}

#[test]
fn fixture_events_are_relative_to_simulated_now() {
    let time = SimulatedTimeHandler::default();
    let event: CalendarEvent = EventBuilder::days_ago("e", time.physical_time(), 2).build();
    assert_eq!((time.physical_time() - event.end).num_days(), 2);
}

