//! Per-target in-flight tracking
//!
//! The only concurrency control in the client: a request is started for a
//! key only when that key is idle, and the key returns to idle when the
//! request completes, whatever the outcome. Advisory only; it gates the
//! triggering action, it never queues or merges requests.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Request state of one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
}

/// In-flight markers keyed by target id
#[derive(Debug, Clone)]
pub struct InFlight<K> {
    states: HashMap<K, RequestState>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> InFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` in flight; `false` if it already was
    pub fn try_begin(&mut self, key: K) -> bool {
        let state = self.states.entry(key).or_default();
        if *state == RequestState::InFlight {
            return false;
        }
        *state = RequestState::InFlight;
        true
    }

    /// Return `key` to idle
    pub fn finish<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.states.remove(key);
    }

    pub fn state<Q>(&self, key: &Q) -> RequestState
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.states.get(key).copied().unwrap_or_default()
    }

    pub fn is_in_flight<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.state(key) == RequestState::InFlight
    }

    /// Whether any target has a request outstanding
    pub fn any(&self) -> bool {
        self.states.values().any(|s| *s == RequestState::InFlight)
    }
}
