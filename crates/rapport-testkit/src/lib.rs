//! Rapport Testing Infrastructure
//!
//! Deterministic doubles for the impure seams of rapport, plus builders for
//! the domain fixtures most tests need.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! rapport-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use rapport_testkit::*;
//! use std::sync::Arc;
//!
//! let time = Arc::new(SimulatedTimeHandler::default());
//! let ann = ContactBuilder::new("ann").given("Ann").email("ann@example.com").build();
//! ```

pub mod builders;
pub mod geocoding;
pub mod time;

pub use builders::{address, located_address, ContactBuilder, EventBuilder};
pub use geocoding::{ScriptedGeocodingService, ScriptedReply};
pub use time::{SimulatedTimeHandler, DEFAULT_START};
