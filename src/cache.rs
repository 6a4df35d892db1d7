//! Computed-table cache for BDD operations.
//!
//! A fixed-size, direct-mapped cache: each key hashes to exactly one slot,
//! and a colliding insert evicts the previous entry. The table is advisory
//! only — a lost entry costs a recomputation, never correctness.

use std::cell::Cell;

use crate::utils::MyHash;

pub struct OpCache<K, V> {
    slots: Vec<Option<(K, V)>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> OpCache<K, V> {
    /// Create a cache with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Cache bits should be in the range 0..=31");

        let size = 1usize << bits;
        Self {
            slots: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask: (size - 1) as u64,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    pub fn clear(&mut self) {
        self.slots.fill_with(|| None);
    }
}

impl<K, V> OpCache<K, V>
where
    K: MyHash + Eq,
    V: Copy,
{
    fn slot(&self, key: &K) -> usize {
        (key.hash() & self.bitmask) as usize
    }

    pub fn get(&self, key: &K) -> Option<V> {
        match &self.slots[self.slot(key)] {
            Some((stored, value)) if stored == key => {
                self.hits.set(self.hits.get() + 1);
                Some(*value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        let slot = self.slot(&key);
        self.slots[slot] = Some((key, value));
    }
}
