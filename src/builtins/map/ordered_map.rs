//! Insertion ordered storage for `Map` and `Set`, keyed by
//! `SameValueZero` equality.

use crate::{
    gc::{custom_trace, Finalize, Trace},
    value::JsValue,
};
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::{fmt::Debug, hash::BuildHasherDefault};

/// A `JsValue`-keyed map preserving insertion order.
#[derive(Finalize)]
pub struct OrderedMap<V: Trace>(IndexMap<JsValue, V, BuildHasherDefault<FxHasher>>);

unsafe impl<V: Trace> Trace for OrderedMap<V> {
    custom_trace!(this, {
        for (k, v) in this.0.iter() {
            mark(k);
            mark(v);
        }
    });
}

impl<V: Trace> Debug for OrderedMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderedMap(len: {})", self.0.len())
    }
}

impl<V: Trace> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(IndexMap::with_hasher(BuildHasherDefault::default()))
    }
}

impl<V: Trace> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts a key-value pair. An existing key keeps its position.
    pub fn insert(&mut self, key: JsValue, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &JsValue) -> Option<V> {
        self.0.shift_remove(key)
    }

    pub fn get(&self, key: &JsValue) -> Option<&V> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &JsValue) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_index(&self, index: usize) -> Option<(&JsValue, &V)> {
        self.0.get_index(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JsValue, &V)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &JsValue> {
        self.0.keys()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
