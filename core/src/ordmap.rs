#![deny(missing_docs)]

//! # Ordered Map
//!
//! A keyed collection that remembers declaration order through a per-entry index
//! instead of a side-car key list. Decoding assigns indices 1, 2, 3… in encounter
//! order, programmatic inserts take the next unused index, and entries without an index (0)
//! come after every indexed entry.

use serde::de::{MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
struct Slot<V> {
    index: usize,
    value: V,
}

/// Insertion-ordered map keyed by `K`.
#[derive(Debug, Clone)]
pub struct OrdMap<K, V> {
    entries: HashMap<K, Slot<V>>,
    next_index: usize,
}

impl<K, V> Default for OrdMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_index: 1,
        }
    }
}

impl<K, V> OrdMap<K, V>
where
    K: Eq + Hash + Ord,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Returns the value stored under `key` mutably.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key).map(|slot| &mut slot.value)
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// The order index of `key`, `0` when the entry was never indexed.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|slot| slot.index)
    }

    /// Inserts or overwrites. A new key is placed after every existing entry;
    /// an existing key keeps its position. Returns the previous value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(&mut slot.value, value));
        }
        let index = self.next_index;
        self.next_index += 1;
        self.entries.insert(key, Slot { index, value });
        None
    }

    /// Alias of [`OrdMap::set`].
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    /// Inserts without assigning an order index. Such entries are iterated after
    /// all indexed entries.
    pub fn insert_unindexed(&mut self, key: K, value: V) -> Option<V> {
        self.entries
            .insert(key, Slot { index: 0, value })
            .map(|slot| slot.value)
    }

    /// Removes `key`. Indices of the other entries are left untouched.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|slot| slot.value)
    }

    /// Entries ordered by ascending index, unindexed entries last (by key).
    pub fn by_index(&self) -> std::vec::IntoIter<(&K, &V)> {
        let mut items: Vec<(&K, &Slot<V>)> = self.entries.iter().collect();
        items.sort_by(|a, b| entry_order(a.0, a.1.index, b.0, b.1.index));
        items
            .into_iter()
            .map(|(k, slot)| (k, &slot.value))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Mutable counterpart of [`OrdMap::by_index`].
    pub fn by_index_mut(&mut self) -> std::vec::IntoIter<(&K, &mut V)> {
        let mut items: Vec<(&K, &mut Slot<V>)> = self.entries.iter_mut().collect();
        items.sort_by(|a, b| entry_order(a.0, a.1.index, b.0, b.1.index));
        items
            .into_iter()
            .map(|(k, slot)| (k, &mut slot.value))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Keys in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.by_index().map(|(k, _)| k)
    }

    /// Values in iteration order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.by_index().map(|(_, v)| v)
    }

    /// Reassigns every index by ascending key order.
    pub fn sort(&mut self) {
        let mut slots: Vec<(&K, &mut Slot<V>)> = self.entries.iter_mut().collect();
        slots.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (i, (_, slot)) in slots.into_iter().enumerate() {
            slot.index = i + 1;
        }
        self.next_index = self.entries.len() + 1;
    }
}

fn entry_order<K: Ord>(ka: &K, ia: usize, kb: &K, ib: usize) -> std::cmp::Ordering {
    (ia == 0, ia).cmp(&(ib == 0, ib)).then_with(|| ka.cmp(kb))
}

impl<K, V> PartialEq for OrdMap<K, V>
where
    K: Eq + Hash + Ord,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.by_index().eq(other.by_index())
    }
}

impl<K, V> FromIterator<(K, V)> for OrdMap<K, V>
where
    K: Eq + Hash + Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrdMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<K, V> From<HashMap<K, V>> for OrdMap<K, V>
where
    K: Eq + Hash + Ord,
{
    fn from(map: HashMap<K, V>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, value)| (k, Slot { index: 0, value }))
                .collect(),
            next_index: 1,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrdMap<K, V>
where
    K: Eq + Hash + Ord,
{
    type Item = (&'a K, &'a V);
    type IntoIter = std::vec::IntoIter<(&'a K, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_index()
    }
}

impl<K, V> Serialize for OrdMap<K, V>
where
    K: Eq + Hash + Ord + Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.by_index())
    }
}

struct OrdMapVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for OrdMapVisitor<K, V>
where
    K: Eq + Hash + Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = OrdMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrdMap {
            entries: HashMap::with_capacity(access.size_hint().unwrap_or(0)),
            next_index: 1,
        };
        while let Some((key, value)) = access.next_entry::<K, V>()? {
            map.set(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for OrdMap<K, V>
where
    K: Eq + Hash + Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrdMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &OrdMap<String, i32>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_decode_preserves_order() {
        let map: OrdMap<String, i32> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        assert_eq!(keys(&map), ["zeta", "alpha", "mid"]);
        assert_eq!(map.index_of("zeta"), Some(1));
        assert_eq!(map.index_of("mid"), Some(3));
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );
    }

    #[test]
    fn test_decode_empty_and_non_object() {
        let map: OrdMap<String, i32> = serde_json::from_str("{}").unwrap();
        assert!(map.is_empty());
        assert!(serde_json::from_str::<OrdMap<String, i32>>("[1, 2]").is_err());
    }

    #[test]
    fn test_set_appends_and_overwrite_keeps_position() {
        let mut map: OrdMap<String, i32> = [("b".to_string(), 1), ("a".to_string(), 2)]
            .into_iter()
            .collect();
        map.set("c".into(), 3);
        assert_eq!(map.index_of("c"), Some(3));
        assert_eq!(map.set("b".into(), 10), Some(1));
        assert_eq!(keys(&map), ["b", "a", "c"]);
        assert_eq!(map.get("b"), Some(&10));
    }

    #[test]
    fn test_indices_not_reused_after_remove() {
        let mut map: OrdMap<String, i32> = OrdMap::new();
        map.set("a".into(), 1);
        map.set("b".into(), 2);
        map.remove("a");
        map.set("c".into(), 3);
        assert_eq!(map.index_of("c"), Some(3));
        assert_eq!(keys(&map), ["b", "c"]);
    }

    #[test]
    fn test_index_counter_survives_removing_last() {
        let mut map: OrdMap<String, i32> = OrdMap::new();
        map.set("a".into(), 1);
        map.set("b".into(), 2);
        map.remove("b");
        map.set("c".into(), 3);
        assert_eq!(map.index_of("c"), Some(3));

        let big: OrdMap<String, usize> = (0..5000).map(|i| (format!("k{i}"), i)).collect();
        assert_eq!(big.index_of("k4999"), Some(5000));
        assert_eq!(big.values().copied().take(3).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn test_unindexed_entries_sort_last() {
        let mut map: OrdMap<String, i32> =
            HashMap::from([("y".to_string(), 1), ("x".to_string(), 2)]).into();
        map.set("z".into(), 3);
        assert_eq!(keys(&map), ["z", "x", "y"]);

        map.insert_unindexed("a".into(), 4);
        assert_eq!(keys(&map), ["z", "a", "x", "y"]);
    }

    #[test]
    fn test_sort_reassigns_indices() {
        let mut map: OrdMap<String, i32> =
            serde_json::from_str(r#"{"c":1,"a":2,"b":3}"#).unwrap();
        map.sort();
        assert_eq!(keys(&map), ["a", "b", "c"]);
        assert_eq!(map.index_of("a"), Some(1));
        map.set("0".into(), 4);
        assert_eq!(keys(&map), ["a", "b", "c", "0"]);
    }

    #[test]
    fn test_by_index_is_restartable_and_mutable() {
        let mut map: OrdMap<String, i32> = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        for (_, v) in map.by_index_mut() {
            *v *= 10;
        }
        let first: Vec<_> = map.by_index().collect();
        let second: Vec<_> = map.by_index().collect();
        assert_eq!(first, second);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [10, 20]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a: OrdMap<String, i32> = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: OrdMap<String, i32> = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        let c: OrdMap<String, i32> = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
