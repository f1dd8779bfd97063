//! Clock Hand Module
//!
//! Second-chance eviction over a fixed ring of slots.

use crate::cache::CacheEntry;

// == Clock Hand ==
/// Cursor of the clock eviction algorithm.
///
/// The hand points at the next slot to examine. Selecting a victim sweeps
/// forward from the hand, clearing used bits as it goes, and stops on the
/// first slot that is empty or unused. The hand is left on the victim, so
/// the following sweep starts there.
#[derive(Debug)]
pub struct ClockHand {
    /// Next slot to examine, always in `0..capacity`
    position: usize,
    /// Number of slots in the ring
    capacity: usize,
}

impl ClockHand {
    // == Constructor ==
    /// Creates a hand at slot 0 of a ring of `capacity` slots.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "clock ring needs at least one slot");
        Self {
            position: 0,
            capacity,
        }
    }

    /// Current hand position.
    pub fn position(&self) -> usize {
        self.position
    }

    fn advance(&mut self) {
        self.position = (self.position + 1) % self.capacity;
    }

    // == Select Victim ==
    /// Sweeps from the hand and returns the index of the slot to overwrite.
    ///
    /// Used entries lose their used bit and are skipped. Every sweep ends
    /// within one full turn of the ring plus one slot, since a used slot is
    /// never skipped twice.
    pub fn select_victim(&mut self, slots: &[Option<CacheEntry>]) -> usize {
        debug_assert_eq!(slots.len(), self.capacity);

        loop {
            match &slots[self.position] {
                Some(entry) if entry.is_used() => {
                    entry.clear_used();
                    self.advance();
                }
                _ => return self.position,
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn occupied(url: &str, used: bool) -> Option<CacheEntry> {
        let entry = CacheEntry::new(url.to_string(), Arc::from(&b"x"[..]));
        if !used {
            entry.clear_used();
        }
        Some(entry)
    }

    #[test]
    fn test_empty_slot_is_taken_immediately() {
        let slots: Vec<Option<CacheEntry>> = vec![None, None, None];
        let mut hand = ClockHand::new(3);

        assert_eq!(hand.select_victim(&slots), 0);
        assert_eq!(hand.position(), 0);
    }

    #[test]
    fn test_used_slots_get_second_chance() {
        let slots = vec![occupied("a", true), occupied("b", true), occupied("c", false)];
        let mut hand = ClockHand::new(3);

        assert_eq!(hand.select_victim(&slots), 2);
        assert!(!slots[0].as_ref().unwrap().is_used());
        assert!(!slots[1].as_ref().unwrap().is_used());
    }

    #[test]
    fn test_all_used_wraps_to_start() {
        let slots = vec![occupied("a", true), occupied("b", true), occupied("c", true)];
        let mut hand = ClockHand::new(3);

        // A full turn clears every bit and lands back on slot 0
        assert_eq!(hand.select_victim(&slots), 0);
        assert!(slots.iter().flatten().all(|entry| !entry.is_used()));
    }

    #[test]
    fn test_sweep_starts_at_hand_and_wraps() {
        let slots = vec![occupied("a", false), occupied("b", true), occupied("c", true)];
        let mut hand = ClockHand::new(3);
        hand.position = 1;

        assert_eq!(hand.select_victim(&slots), 0);
        assert_eq!(hand.position(), 0);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        ClockHand::new(0);
    }
}
