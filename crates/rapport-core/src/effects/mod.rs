//! # Effects
//!
//! Trait seams for the few impure capabilities the domain layer needs.

pub mod time;

pub use time::{PhysicalTimeEffects, RealTimeHandler};
