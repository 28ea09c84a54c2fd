//! Capacity-capped map that evicts its least recently used entry.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

struct Slot<V> {
    value: V,
    stamp: u64,
}

/// A `HashMap` with a hard size limit.
///
/// Recency is kept in a queue of `(key, stamp)` pairs. Touching or removing a
/// key leaves its old queue entry behind; such entries are recognised by a
/// stamp mismatch and skipped on eviction, and the queue is compacted once
/// they outnumber the live entries.
pub struct BoundedMap<K, V> {
    capacity: usize,
    next_stamp: u64,
    entries: HashMap<K, Slot<V>>,
    order: VecDeque<(K, u64)>,
    evictions: u64,
}

impl<K: Eq + Hash + Clone, V> BoundedMap<K, V> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_stamp: 0,
            entries: HashMap::new(),
            order: VecDeque::new(),
            evictions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the size limit in place. Shrinking evicts the least recently
    /// used entries; the survivors keep their values and recency.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict_down_to(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped to stay within capacity.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Lookup without affecting recency.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Mutable lookup; marks the entry as most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.maybe_compact();
        let stamp = self.stamp();
        self.order.push_back((key.clone(), stamp));
        let slot = self.entries.get_mut(key)?;
        slot.stamp = stamp;
        Some(&mut slot.value)
    }

    /// Returns the entry for `key`, inserting `make()` first when absent.
    /// Either way the entry becomes the most recently used one.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        if !self.entries.contains_key(&key) {
            self.evict_down_to(self.capacity - 1);
        }
        self.maybe_compact();
        let stamp = self.stamp();
        self.order.push_back((key.clone(), stamp));
        let slot = self.entries.entry(key).or_insert_with(|| Slot {
            value: make(),
            stamp,
        });
        slot.stamp = stamp;
        &mut slot.value
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.remove(&key);
        self.get_or_insert_with(key, || value);
        previous
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key).map(|slot| slot.value);
        self.maybe_compact();
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|slot| &slot.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, slot)| (key, &slot.value))
    }

    fn stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn evict_down_to(&mut self, limit: usize) {
        while self.entries.len() > limit {
            let Some((key, stamp)) = self.order.pop_front() else {
                break;
            };
            let live = self
                .entries
                .get(&key)
                .is_some_and(|slot| slot.stamp == stamp);
            if live {
                self.entries.remove(&key);
                self.evictions += 1;
            }
        }
    }

    fn maybe_compact(&mut self) {
        if self.order.len() <= self.entries.len() * 2 + 32 {
            return;
        }
        let entries = &self.entries;
        self.order.retain(|(key, stamp)| {
            entries
                .get(key)
                .is_some_and(|slot| slot.stamp == *stamp)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut map = BoundedMap::new(3);
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3);
        // touch "a" so "b" becomes the eldest
        *map.get_mut(&"a").unwrap() += 10;
        map.insert("d", 4);

        assert_eq!(map.len(), 3);
        assert!(map.contains_key(&"a"));
        assert!(!map.contains_key(&"b"));
        assert!(map.contains_key(&"c"));
        assert!(map.contains_key(&"d"));
        assert_eq!(map.get(&"a"), Some(&11));
        assert_eq!(map.evictions(), 1);
    }

    #[test]
    fn get_or_insert_keeps_existing_value() {
        let mut map = BoundedMap::new(4);
        *map.get_or_insert_with(7, || 1) += 1;
        let value = *map.get_or_insert_with(7, || 100);
        assert_eq!(value, 2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn removed_keys_are_not_counted_as_evictions() {
        let mut map = BoundedMap::new(2);
        map.insert(1, "one");
        map.insert(2, "two");
        assert_eq!(map.remove(&1), Some("one"));
        map.insert(3, "three");
        assert_eq!(map.len(), 2);
        assert_eq!(map.evictions(), 0);
        map.insert(4, "four");
        assert!(!map.contains_key(&2));
        assert_eq!(map.evictions(), 1);
    }

    #[test]
    fn repeated_touches_stay_bounded() {
        let mut map = BoundedMap::new(8);
        for round in 0..1_000u32 {
            map.get_or_insert_with(round % 4, || round);
        }
        assert_eq!(map.len(), 4);
        assert!(map.order.len() <= map.entries.len() * 2 + 33);
    }

    #[test]
    fn shrinking_keeps_most_recent_entries() {
        let mut map = BoundedMap::new(4);
        for key in 1..=4 {
            map.insert(key, key * 10);
        }
        *map.get_mut(&1).unwrap() += 1;
        map.set_capacity(2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&11));
        assert_eq!(map.get(&4), Some(&40));
        assert_eq!(map.evictions(), 2);

        map.set_capacity(8);
        map.insert(5, 50);
        map.insert(6, 60);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(&1), Some(&11));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut map = BoundedMap::new(0);
        map.insert("x", 1);
        map.insert("y", 2);
        assert_eq!(map.capacity(), 1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"y"), Some(&2));
    }
}
