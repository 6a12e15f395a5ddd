//! Fixture builders for contacts, addresses and calendar events.

mod contact;
mod event;

pub use contact::{address, located_address, ContactBuilder};
pub use event::EventBuilder;
