//! Canonical ordering of every ordered map in a document.

use crate::oas::reference::RefOr;
use crate::ordmap::OrdMap;
use serde_json::Value;
use std::hash::Hash;

/// Recursively sorts ordered maps by key.
pub trait SortMaps {
    /// Sorts this value's maps and those of its inline children.
    fn sort_maps(&mut self);
}

impl<T: SortMaps> SortMaps for RefOr<T> {
    // References are sorted where their target lives.
    fn sort_maps(&mut self) {
        if let Some(mut value) = self.inline().and_then(|rc| rc.try_borrow_mut().ok()) {
            value.sort_maps();
        }
    }
}

impl<T: SortMaps> SortMaps for Option<T> {
    fn sort_maps(&mut self) {
        if let Some(inner) = self {
            inner.sort_maps();
        }
    }
}

impl<T: SortMaps> SortMaps for Vec<T> {
    fn sort_maps(&mut self) {
        self.iter_mut().for_each(SortMaps::sort_maps);
    }
}

impl<K, V> SortMaps for OrdMap<K, V>
where
    K: Eq + Hash + Ord,
    V: SortMaps,
{
    fn sort_maps(&mut self) {
        self.sort();
        for (_, value) in self.by_index_mut() {
            value.sort_maps();
        }
    }
}

impl SortMaps for String {
    fn sort_maps(&mut self) {}
}

impl SortMaps for Value {
    fn sort_maps(&mut self) {}
}
