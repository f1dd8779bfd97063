//! Cache Table Module
//!
//! Fixed ring of slots plus the clock hand that chooses eviction victims.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::{CacheEntry, ClockHand};

// == Insertion ==
/// Result of an insert: where the entry landed and what it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Slot that now holds the new entry
    pub slot: usize,
    /// Key of the entry that was overwritten, if the slot was occupied
    pub evicted: Option<String>,
}

// == Slot Info ==
/// Read-only description of an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub slot: usize,
    pub url: String,
    pub size: usize,
    pub used: bool,
}

// == Cache Table ==
/// The slot array and its clock hand.
///
/// Inserts never look for an existing entry with the same key: they always
/// overwrite the clock victim. Two slots can therefore hold the same key, and
/// lookups return the lowest-indexed one until it is evicted.
#[derive(Debug)]
pub struct CacheTable {
    slots: Vec<Option<CacheEntry>>,
    clock: ClockHand,
}

impl CacheTable {
    // == Constructor ==
    /// Creates an empty table of `capacity` slots.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            clock: ClockHand::new(capacity),
        }
    }

    // == Lookup ==
    /// Scans every slot in order for an exact key match.
    ///
    /// The first match gets its used bit set and its payload returned. Needs
    /// only shared access.
    pub fn lookup(&self, key: &str) -> Option<Arc<[u8]>> {
        self.slots.iter().flatten().find(|entry| entry.url == key).map(|entry| {
            entry.mark_used();
            entry.payload.clone()
        })
    }

    // == Insert ==
    /// Writes `(key, payload)` into the slot picked by the clock hand.
    pub fn insert(&mut self, key: String, payload: Arc<[u8]>) -> Insertion {
        let slot = self.clock.select_victim(&self.slots);
        let evicted = self.slots[slot]
            .replace(CacheEntry::new(key, payload))
            .map(|old| old.url);

        Insertion { slot, evicted }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot the next eviction sweep starts from.
    pub fn cursor(&self) -> usize {
        self.clock.position()
    }

    /// Describes every occupied slot in index order.
    pub fn entries(&self) -> Vec<SlotInfo> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| {
                entry.as_ref().map(|entry| SlotInfo {
                    slot,
                    url: entry.url.clone(),
                    size: entry.size(),
                    used: entry.is_used(),
                })
            })
            .collect()
    }
}
