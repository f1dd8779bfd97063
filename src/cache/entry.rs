//! Cache Entry Module
//!
//! Defines a single occupied slot of the cache table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// == Cache Entry ==
/// A cached response keyed by the raw request target.
///
/// The used flag is the clock algorithm's second-chance bit. Lookups set it
/// while holding the gate in shared mode, so it is atomic; every other field
/// only changes under exclusive access.
#[derive(Debug)]
pub struct CacheEntry {
    /// Cache key, matched exactly
    pub url: String,
    /// Response bytes exactly as relayed to the client
    pub payload: Arc<[u8]>,
    /// Second-chance bit
    used: AtomicBool,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a freshly inserted entry. New entries start with the used bit set.
    pub fn new(url: String, payload: Arc<[u8]>) -> Self {
        Self {
            url,
            payload,
            used: AtomicBool::new(true),
        }
    }

    /// Returns true if the entry was touched since the clock hand last passed it.
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Relaxed)
    }

    /// Sets the used bit.
    pub fn mark_used(&self) {
        self.used.store(true, Ordering::Relaxed);
    }

    /// Clears the used bit, spending the entry's second chance.
    pub fn clear_used(&self) {
        self.used.store(false, Ordering::Relaxed);
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
