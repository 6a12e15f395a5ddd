//! # Rapport App
//!
//! Portable headless application core. Frontends talk to it through exactly
//! two calls: [`AppCore::dispatch`] and [`AppCore::subscribe`].
//!
//! ```text
//! sources ─► workflows ─► dispatch(Action) ─► reduce ─► AppState ─► subscribe(selector)
//!               │
//!               └─► geocoder / affinity store
//! ```
//!
//! - [`state`]: the single [`AppState`] value and its derived selectors
//! - [`action`] / [`reducer`]: the closed action set and the pure reducer
//! - [`core`](crate::core): dispatch/subscribe over a `futures-signals` mutable
//! - [`context`]: the dependency-injected [`AppContext`]
//! - [`sources`]: contact, calendar and location collaborator traits
//! - [`workflows`]: the effect layer that performs I/O, then dispatches

pub mod action;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod logging;
pub mod reducer;
pub mod sources;
pub mod state;
pub mod workflows;

pub use action::Action;
pub use config::{ConfigError, RapportConfig};
pub use context::{AppContext, AppContextBuilder, StorageMode};
pub use crate::core::AppCore;
pub use errors::{AppError, ErrorCategory, SourceError};
pub use logging::init_logging;
pub use reducer::reduce;
pub use sources::{CalendarSource, ContactSource, LocationSource};
pub use state::{
    AppState, AuthorizationStatus, Authorizations, Detent, ListState, MapSelection, MapState,
    SheetState,
};
