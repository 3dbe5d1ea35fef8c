//! Insertion-ordered running sums keyed by an `f64` x-value.
//!
//! Keys compare by value: `-0.0` folds into `0.0`, and every NaN folds into a
//! single NaN key. Iteration yields keys in the order they were first added.

use std::collections::{HashMap, hash_map::Entry};

/// Running sum for one key and the number of values folded into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedEntry {
    pub key: f64,
    pub sum: f64,
    pub count: usize,
}

/// Key → running sum mapping that remembers first-seen key order.
#[derive(Debug, Clone, Default)]
pub struct KeyedSum {
    slots: HashMap<u64, usize>,
    entries: Vec<KeyedEntry>,
}

impl KeyedSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the sum for `key`; an unseen key starts at `value`.
    pub fn add(&mut self, key: f64, value: f64) {
        match self.slots.entry(key_bits(key)) {
            Entry::Occupied(slot) => {
                let entry = &mut self.entries[*slot.get()];
                entry.sum += value;
                entry.count += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push(KeyedEntry {
                    key,
                    sum: value,
                    count: 1,
                });
            }
        }
    }

    pub fn get(&self, key: f64) -> Option<&KeyedEntry> {
        self.slots
            .get(&key_bits(key))
            .map(|&slot| &self.entries[slot])
    }

    /// Entries in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key_bits(key: f64) -> u64 {
    if key == 0.0 {
        0.0f64.to_bits()
    } else if key.is_nan() {
        f64::NAN.to_bits()
    } else {
        key.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_seen_order() {
        let mut sums = KeyedSum::new();
        for (k, v) in [(3.0, 1.0), (1.0, 2.0), (3.0, 4.0), (2.0, 8.0), (1.0, 16.0)] {
            sums.add(k, v);
        }

        let keys: Vec<f64> = sums.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![3.0, 1.0, 2.0]);
        assert_eq!(sums.get(3.0).map(|e| e.sum), Some(5.0));
        assert_eq!(sums.get(1.0).map(|e| e.count), Some(2));
        assert_eq!(sums.len(), 3);
    }

    #[test]
    fn signed_zero_is_one_key() {
        let mut sums = KeyedSum::new();
        sums.add(0.0, 1.0);
        sums.add(-0.0, 2.0);

        assert_eq!(sums.len(), 1);
        assert_eq!(sums.get(-0.0).map(|e| e.sum), Some(3.0));
    }

    #[test]
    fn unknown_key_is_absent() {
        let mut sums = KeyedSum::new();
        assert!(sums.is_empty());
        sums.add(0.5, 1.0);
        assert!(sums.get(0.25).is_none());
    }
}
