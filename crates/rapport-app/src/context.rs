//! # Application Context
//!
//! Owns every long-lived component and hands them to workflows by reference.
//! The process entry point builds exactly one context and drops it on exit.

use crate::action::Action;
use crate::config::RapportConfig;
use crate::core::AppCore;
use crate::sources::{
    CalendarSource, ContactSource, InMemoryCalendarSource, InMemoryContactSource,
    InMemoryLocationSource, LocationSource,
};
use crate::state::AppState;
use parking_lot::Mutex;
use rapport_core::{Coordinate, PhysicalTimeEffects, RealTimeHandler};
use rapport_geocoder::{Geocoder, GeocodingService, UnavailableGeocodingService};
use rapport_store::{AffinityStore, PersistentCache};
use std::sync::Arc;
use tracing::info;

/// Where the geocode cache and affinity ratings live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Files under the configured data directory
    #[default]
    Disk,
    /// Nothing is written
    Memory,
}

/// Dependency-injected application context.
pub struct AppContext {
    core: AppCore,
    config: RapportConfig,
    time: Arc<dyn PhysicalTimeEffects>,
    geocoder: Arc<Geocoder>,
    affinities: Mutex<AffinityStore>,
    contacts: Arc<dyn ContactSource>,
    calendar: Arc<dyn CalendarSource>,
    location: Arc<dyn LocationSource>,
}

impl AppContext {
    /// Start building a context for `config`.
    pub fn builder(config: RapportConfig) -> AppContextBuilder {
        AppContextBuilder::new(config)
    }

    /// State handle.
    pub fn core(&self) -> &AppCore {
        &self.core
    }

    /// Shorthand for `core().dispatch(action)`.
    pub fn dispatch(&self, action: Action) -> bool {
        self.core.dispatch(action)
    }

    /// Active configuration.
    pub fn config(&self) -> &RapportConfig {
        &self.config
    }

    /// Wall clock.
    pub fn time(&self) -> &Arc<dyn PhysicalTimeEffects> {
        &self.time
    }

    /// Geocoder.
    pub fn geocoder(&self) -> &Arc<Geocoder> {
        &self.geocoder
    }

    /// Affinity ratings.
    pub fn affinities(&self) -> &Mutex<AffinityStore> {
        &self.affinities
    }

    /// Contact store.
    pub fn contacts(&self) -> &Arc<dyn ContactSource> {
        &self.contacts
    }

    /// Calendar.
    pub fn calendar(&self) -> &Arc<dyn CalendarSource> {
        &self.calendar
    }

    /// Location permission.
    pub fn location(&self) -> &Arc<dyn LocationSource> {
        &self.location
    }
}

/// Builder for [`AppContext`]. Unset collaborators default to empty,
/// undetermined in-memory sources and an unavailable geocoding service.
pub struct AppContextBuilder {
    config: RapportConfig,
    storage: StorageMode,
    time: Option<Arc<dyn PhysicalTimeEffects>>,
    geocoding: Option<Arc<dyn GeocodingService>>,
    contacts: Option<Arc<dyn ContactSource>>,
    calendar: Option<Arc<dyn CalendarSource>>,
    location: Option<Arc<dyn LocationSource>>,
}

impl AppContextBuilder {
    fn new(config: RapportConfig) -> Self {
        Self {
            config,
            storage: StorageMode::default(),
            time: None,
            geocoding: None,
            contacts: None,
            calendar: None,
            location: None,
        }
    }

    /// Choose disk or memory storage.
    pub fn storage(mut self, storage: StorageMode) -> Self {
        self.storage = storage;
        self
    }

    /// Wall clock.
    pub fn time(mut self, time: Arc<dyn PhysicalTimeEffects>) -> Self {
        self.time = Some(time);
        self
    }

    /// External geocoding service.
    pub fn geocoding(mut self, service: Arc<dyn GeocodingService>) -> Self {
        self.geocoding = Some(service);
        self
    }

    /// Contact store.
    pub fn contacts(mut self, source: Arc<dyn ContactSource>) -> Self {
        self.contacts = Some(source);
        self
    }

    /// Calendar.
    pub fn calendar(mut self, source: Arc<dyn CalendarSource>) -> Self {
        self.calendar = Some(source);
        self
    }

    /// Location permission.
    pub fn location(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.location = Some(source);
        self
    }

    /// Open the stores and wire the geocoder's queue depth into the state.
    pub fn build(self) -> Arc<AppContext> {
        let config = self.config;
        let time = self.time.unwrap_or_else(|| Arc::new(RealTimeHandler::new()));

        let (cache, affinities) = match self.storage {
            StorageMode::Disk => (
                PersistentCache::<Coordinate>::open(
                    config.geocode_cache_path(),
                    config.geocode_cache_max_size,
                    time.clone(),
                ),
                AffinityStore::open(config.affinity_path()),
            ),
            StorageMode::Memory => (
                PersistentCache::in_memory(config.geocode_cache_max_size, time.clone()),
                AffinityStore::in_memory(),
            ),
        };

        let service = self
            .geocoding
            .unwrap_or_else(|| Arc::new(UnavailableGeocodingService));
        let geocoder = Arc::new(
            Geocoder::new(cache, service, time.clone())
                .with_min_interval_ms(config.geocode_min_interval_ms),
        );

        let initial =
            AppState::new(config.focused_span_delta).with_affinities(affinities.snapshot());
        let core = AppCore::new(initial);

        let observer_core = core.clone();
        geocoder.observe_queue(Arc::new(move |depth| {
            observer_core.dispatch(Action::GeocoderQueueChanged(depth));
        }));

        info!(
            data_dir = %config.data_dir.display(),
            storage = ?self.storage,
            ratings = affinities.snapshot().len(),
            "App context ready"
        );

        Arc::new(AppContext {
            core,
            config,
            time,
            geocoder,
            affinities: Mutex::new(affinities),
            contacts: self
                .contacts
                .unwrap_or_else(|| Arc::new(InMemoryContactSource::default())),
            calendar: self
                .calendar
                .unwrap_or_else(|| Arc::new(InMemoryCalendarSource::default())),
            location: self
                .location
                .unwrap_or_else(|| Arc::new(InMemoryLocationSource::default())),
        })
    }
}
