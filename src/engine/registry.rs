//! Global type-key -> worker-id registry and round-robin selection.
//!
//! Grounded on the reference implementation's `broker/registry.rs`
//! `PoolStrategy::RoundRobin` + per-key counters, with the concurrent
//! `DashMap` swapped for a `parking_lot::RwLock<HashMap<..>>`: this
//! registry is written once per type-key during `Engine::spawn` (always
//! single-threaded, called only by the thread driving setup) and read many
//! times concurrently afterward, so a reader-writer lock is the right tool
//! rather than a lock-free map built for concurrent writers.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use parking_lot::{Mutex, RwLock};

// Layer 3: Internal module imports
use crate::util::WorkerId;

/// Maps a message type's compile-time key to the ordered list of worker ids
/// hosting an actor for that type, plus a per-type round-robin cursor.
#[derive(Default)]
pub(crate) struct TypeRegistry {
    workers_by_type: RwLock<HashMap<&'static str, Vec<WorkerId>>>,
    round_robin: Mutex<HashMap<&'static str, u64>>,
}

impl TypeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `worker` to the routing list for `type_key`. Called only
    /// during `Engine::spawn`, in spawn order, so list order equals spawn
    /// order as required by §3.
    pub(crate) fn register(&self, type_key: &'static str, worker: WorkerId) {
        self.workers_by_type
            .write()
            .entry(type_key)
            .or_default()
            .push(worker);
    }

    /// The full routing list for `type_key`, if any worker hosts it.
    pub(crate) fn workers_for(&self, type_key: &'static str) -> Option<Vec<WorkerId>> {
        let map = self.workers_by_type.read();
        map.get(type_key).filter(|list| !list.is_empty()).cloned()
    }

    /// Select the next worker for `type_key` under round-robin, given its
    /// current routing list. Returns `None` if the list is empty (caller
    /// should have already treated an absent/empty entry as `ActorNotFound`).
    pub(crate) fn next_round_robin(&self, type_key: &'static str, list: &[WorkerId]) -> Option<WorkerId> {
        if list.is_empty() {
            return None;
        }
        let mut counters = self.round_robin.lock();
        let counter = counters.entry(type_key).or_insert(0);
        let index = (*counter as usize) % list.len();
        *counter = counter.wrapping_add(1);
        Some(list[index])
    }
}
