//! The ordered property table backing every object.
//!
//! Keys iterate in the order required by `[[OwnPropertyKeys]]`: integer
//! indices in ascending numeric order, then string keys in insertion order,
//! then symbol keys in insertion order.

use crate::{
    gc::{custom_trace, Finalize, Trace},
    property::{PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use std::{hash::BuildHasherDefault, iter::FusedIterator};

/// Wrapper around `indexmap::IndexMap` for usage in `PropertyMap`.
#[derive(Debug, Finalize)]
struct OrderedHashMap<K: Trace>(IndexMap<K, PropertyDescriptor, BuildHasherDefault<FxHasher>>);

impl<K: Trace> Default for OrderedHashMap<K> {
    fn default() -> Self {
        Self(IndexMap::with_hasher(BuildHasherDefault::default()))
    }
}

unsafe impl<K: Trace> Trace for OrderedHashMap<K> {
    custom_trace!(this, {
        for (k, v) in this.0.iter() {
            mark(k);
            mark(v);
        }
    });
}

#[derive(Default, Debug, Trace, Finalize)]
pub struct PropertyMap {
    indexed_properties: FxHashMap<u32, PropertyDescriptor>,
    /// Properties
    string_properties: OrderedHashMap<JsString>,
    /// Symbol Properties
    symbol_properties: OrderedHashMap<JsSymbol>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.get(index),
            PropertyKey::String(string) => self.string_properties.0.get(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.0.get(symbol),
        }
    }

    pub fn insert(
        &mut self,
        key: &PropertyKey,
        property: PropertyDescriptor,
    ) -> Option<PropertyDescriptor> {
        match &key {
            PropertyKey::Index(index) => self.indexed_properties.insert(*index, property),
            PropertyKey::String(string) => {
                self.string_properties.0.insert(string.clone(), property)
            }
            PropertyKey::Symbol(symbol) => {
                self.symbol_properties.0.insert(symbol.clone(), property)
            }
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.remove(index),
            PropertyKey::String(string) => self.string_properties.0.shift_remove(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.0.shift_remove(symbol),
        }
    }

    #[inline]
    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        match key {
            PropertyKey::Index(index) => self.indexed_properties.contains_key(index),
            PropertyKey::String(string) => self.string_properties.0.contains_key(string),
            PropertyKey::Symbol(symbol) => self.symbol_properties.0.contains_key(symbol),
        }
    }

    /// All index keys, ascending.
    pub fn index_property_keys(&self) -> Vec<u32> {
        let mut keys: Vec<u32> = self.indexed_properties.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// An iterator visiting every key-descriptor pair in
    /// `[[OwnPropertyKeys]]` order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            map: self,
            indexes: self.index_property_keys().into_iter(),
            strings: self.string_properties.0.iter(),
            symbols: self.symbol_properties.0.iter(),
        }
    }

    /// An iterator visiting every key in `[[OwnPropertyKeys]]` order.
    #[inline]
    pub fn keys(&self) -> Keys<'_> {
        Keys(self.iter())
    }

    /// String keys in insertion order.
    pub fn string_property_keys(&self) -> impl Iterator<Item = &JsString> {
        self.string_properties.0.keys()
    }

    /// Symbol keys in insertion order.
    pub fn symbol_property_keys(&self) -> impl Iterator<Item = &JsSymbol> {
        self.symbol_properties.0.keys()
    }

    pub fn len(&self) -> usize {
        self.indexed_properties.len()
            + self.string_properties.0.len()
            + self.symbol_properties.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An iterator over the property entries of an object.
#[derive(Debug)]
pub struct Iter<'a> {
    map: &'a PropertyMap,
    indexes: std::vec::IntoIter<u32>,
    strings: indexmap::map::Iter<'a, JsString, PropertyDescriptor>,
    symbols: indexmap::map::Iter<'a, JsSymbol, PropertyDescriptor>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (PropertyKey, &'a PropertyDescriptor);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(index) = self.indexes.next() {
            let descriptor = self
                .map
                .indexed_properties
                .get(&index)
                .expect("index key came from this map");
            Some((PropertyKey::Index(index), descriptor))
        } else if let Some((key, value)) = self.strings.next() {
            Some((PropertyKey::String(key.clone()), value))
        } else {
            let (key, value) = self.symbols.next()?;
            Some((PropertyKey::Symbol(key.clone()), value))
        }
    }
}

impl FusedIterator for Iter<'_> {}

/// An iterator over the keys of an object, in `[[OwnPropertyKeys]]` order.
#[derive(Debug)]
pub struct Keys<'a>(Iter<'a>);

impl Iterator for Keys<'_> {
    type Item = PropertyKey;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = self.0.next()?;
        Some(key)
    }
}

impl FusedIterator for Keys<'_> {}

#[cfg(test)]
mod tests {
    use super::PropertyMap;
    use crate::property::{Attribute, DataDescriptor, PropertyKey};

    #[test]
    fn keys_iterate_indices_first_in_numeric_order() {
        let mut map = PropertyMap::new();
        let descriptor = || DataDescriptor::new(1, Attribute::default()).into();
        map.insert(&PropertyKey::from("b"), descriptor());
        map.insert(&PropertyKey::Index(10), descriptor());
        map.insert(&PropertyKey::from("a"), descriptor());
        map.insert(&PropertyKey::Index(2), descriptor());

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(
            keys,
            vec![
                PropertyKey::Index(2),
                PropertyKey::Index(10),
                PropertyKey::from("b"),
                PropertyKey::from("a"),
            ]
        );
    }
}
