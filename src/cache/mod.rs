//! Cache Module
//!
//! Fixed-capacity response cache with clock (second-chance) eviction behind a
//! reader-preferring gate.

mod clock;
mod entry;
mod gate;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::ClockHand;
pub use entry::CacheEntry;
pub use gate::{ReadGuard, ReaderPreferringLock, WriteGuard};
pub use shared::SharedCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheTable, Insertion, SlotInfo};

// == Public Constants ==
/// Largest response, exclusive, that will be cached
pub const MAX_OBJECT_SIZE: usize = 102_400;

/// Number of cache slots
pub const MAX_CACHE_ENTRIES: usize = 10;

/// Nominal total cache budget. Not enforced: only the per-object cap and
/// the slot count are.
pub const MAX_CACHE_SIZE: usize = 1_049_000;
