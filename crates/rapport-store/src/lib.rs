//! # Rapport Store
//!
//! Flat JSON document stores. Each store owns exactly one file which is
//! rewritten in full on every mutation; there is no incremental write path
//! and no migration logic. Schema changes ship under a new file name.
//!
//! - [`PersistentCache`]: bounded key/value cache evicting by last access
//! - [`AffinityStore`]: per-contact affinity ratings
//!
//! Unreadable or corrupt files load as empty stores and are logged, never
//! fatal.

mod document;

pub mod affinity;
pub mod cache;
pub mod error;

pub use affinity::AffinityStore;
pub use cache::{CacheLookup, PersistentCache};
pub use error::StoreError;
