//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the table against a straightforward model of the
//! clock algorithm, and the shared cache under concurrent access.

use proptest::prelude::*;
use std::sync::Arc;

use crate::cache::{CacheTable, SharedCache, MAX_CACHE_ENTRIES};

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "http://[a-e]/[a-c]{0,2}".prop_map(|s| s)
}

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Insert { key: String, payload: Vec<u8> },
    Lookup { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), payload_strategy())
            .prop_map(|(key, payload)| CacheOp::Insert { key, payload }),
        key_strategy().prop_map(|key| CacheOp::Lookup { key }),
    ]
}

// == Reference Model ==
/// Plain clock algorithm over parallel vectors.
struct ClockModel {
    slots: Vec<Option<(String, Vec<u8>)>>,
    used: Vec<bool>,
    hand: usize,
}

impl ClockModel {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            used: vec![false; capacity],
            hand: 0,
        }
    }

    fn lookup(&mut self, key: &str) -> Option<Vec<u8>> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Some((url, _)) if url == key))?;
        self.used[index] = true;
        self.slots[index].as_ref().map(|(_, payload)| payload.clone())
    }

    fn insert(&mut self, key: String, payload: Vec<u8>) -> usize {
        while self.used[self.hand] {
            self.used[self.hand] = false;
            self.hand = (self.hand + 1) % self.slots.len();
        }
        self.slots[self.hand] = Some((key, payload));
        self.used[self.hand] = true;
        self.hand
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Any interleaving of lookups and inserts evicts exactly the slots the
    // model predicts and leaves the hand where the model leaves it.
    #[test]
    fn prop_table_matches_clock_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut table = CacheTable::new(capacity);
        let mut model = ClockModel::new(capacity);

        for op in ops {
            match op {
                CacheOp::Insert { key, payload } => {
                    let expected = model.insert(key.clone(), payload.clone());
                    let insertion = table.insert(key, Arc::from(payload));
                    prop_assert_eq!(insertion.slot, expected);
                }
                CacheOp::Lookup { key } => {
                    let expected = model.lookup(&key);
                    let found = table.lookup(&key).map(|payload| payload.to_vec());
                    prop_assert_eq!(found, expected);
                }
            }
            prop_assert_eq!(table.cursor(), model.hand);
        }
    }

    // The table never holds more than its slot count.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), payload_strategy()), 1..100)
    ) {
        let mut table = CacheTable::new(MAX_CACHE_ENTRIES);

        for (key, payload) in entries {
            table.insert(key, Arc::from(payload));
            prop_assert!(table.len() <= MAX_CACHE_ENTRIES);
            prop_assert!(table.cursor() < MAX_CACHE_ENTRIES);
        }
    }

    // A key that was never inserted is never found.
    #[test]
    fn prop_unknown_key_misses(
        entries in prop::collection::vec((key_strategy(), payload_strategy()), 0..30)
    ) {
        let mut table = CacheTable::new(MAX_CACHE_ENTRIES);
        for (key, payload) in entries {
            table.insert(key, Arc::from(payload));
        }

        prop_assert!(table.lookup("http://z/never").is_none());
    }

    // The most recent insert is always retrievable with identical bytes.
    #[test]
    fn prop_latest_insert_is_found(
        entries in prop::collection::vec((key_strategy(), payload_strategy()), 1..30),
        key in "http://fresh/[a-z]{1,8}",
        payload in payload_strategy()
    ) {
        let mut table = CacheTable::new(MAX_CACHE_ENTRIES);
        for (k, p) in entries {
            table.insert(k, Arc::from(p));
        }
        table.insert(key.clone(), Arc::from(payload.clone()));

        let found = table.lookup(&key).map(|bytes| bytes.to_vec());
        prop_assert_eq!(found, Some(payload));
    }
}

// == Concurrency ==
// Each key maps to one payload derived from it, so a reader that ever sees a
// payload that does not match its key has observed a torn write.
fn payload_for(key: &str) -> Vec<u8> {
    key.bytes().rev().cycle().take(256).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_never_see_torn_entries() {
    let cache = Arc::new(SharedCache::new(MAX_CACHE_ENTRIES, 4096));
    let mut tasks = Vec::new();

    for writer in 0..4 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            for round in 0..200 {
                let key = format!("http://w{}/{}", writer, round % 15);
                cache.insert(&key, payload_for(&key)).await.unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }

    for reader in 0..8 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            for round in 0..400 {
                let key = format!("http://w{}/{}", (reader + round) % 4, round % 15);
                if let Some(payload) = cache.lookup(&key).await.unwrap() {
                    assert_eq!(&*payload, payload_for(&key).as_slice());
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    let stats = cache.stats().await.unwrap();
    assert_eq!(stats.inserts, 800);
    assert!(stats.total_entries <= MAX_CACHE_ENTRIES);
}
