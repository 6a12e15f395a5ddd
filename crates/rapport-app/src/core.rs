//! # App Core
//!
//! Dispatch/subscribe surface around the single [`AppState`].
//!
//! `dispatch` runs the reducer under the state's write lock, so reductions
//! never interleave. Subscribers are only woken when the resulting state
//! differs from the previous one, and each subscription further de-duplicates
//! its selected slice by equality.

use crate::action::Action;
use crate::reducer::reduce;
use crate::state::AppState;
use futures_signals::signal::{Mutable, Signal, SignalExt};
use tracing::trace;

/// Shared handle to the application state. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct AppCore {
    state: Mutable<AppState>,
}

impl Default for AppCore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl AppCore {
    /// Core starting from `initial`.
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Mutable::new(initial),
        }
    }

    /// Apply `action`. Returns whether the state changed.
    pub fn dispatch(&self, action: Action) -> bool {
        let name = action.name();
        let mut state = self.state.lock_mut();
        let next = reduce(&state, action);
        if next == *state {
            trace!(action = name, "Dispatch left state unchanged");
            return false;
        }
        *state = next;
        trace!(action = name, "Dispatched");
        true
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.get_cloned()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.lock_ref())
    }

    /// Current and future values of `selector`, skipping repeats.
    pub fn subscribe<T, F>(&self, selector: F) -> impl Signal<Item = T>
    where
        T: PartialEq + Clone,
        F: FnMut(&AppState) -> T,
    {
        self.state.signal_ref(selector).dedupe_cloned()
    }
}
