//! Ordered map type for MEML objects.
//!
//! [`MemlMap`] wraps [`IndexMap`] so object members keep the order they were
//! read or inserted in. Writing a value that was just read therefore
//! reproduces the member order of the source document.
//!
//! Keys are unique. Inserting an existing key replaces its value in place
//! and keeps the key's original position, which gives the format its
//! "last write wins" rule for duplicate keys.
//!
//! ## Examples
//!
//! ```rust
//! use meml::{MemlMap, MemlValue};
//!
//! let mut map = MemlMap::new();
//! map.insert("a".to_string(), MemlValue::from(1));
//! map.insert("b".to_string(), MemlValue::from(2));
//! map.insert("a".to_string(), MemlValue::from(3));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["a", "b"]);
//! assert_eq!(map.get("a"), Some(&MemlValue::from(3)));
//! ```

use crate::MemlValue;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An insertion-ordered map of string keys to MEML values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemlMap(IndexMap<String, MemlValue>);

impl MemlMap {
    /// Creates an empty `MemlMap`.
    #[must_use]
    pub fn new() -> Self {
        MemlMap(IndexMap::new())
    }

    /// Creates an empty `MemlMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        MemlMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the value is replaced without
    /// moving the key and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meml::{MemlMap, MemlValue};
    ///
    /// let mut map = MemlMap::new();
    /// assert!(map.insert("key".to_string(), MemlValue::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), MemlValue::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: MemlValue) -> Option<MemlValue> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MemlValue> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut MemlValue> {
        self.0.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key and returns its value, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<MemlValue> {
        self.0.shift_remove(key)
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, MemlValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, MemlValue> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, MemlValue> {
        self.0.iter()
    }
}

impl From<HashMap<String, MemlValue>> for MemlMap {
    fn from(map: HashMap<String, MemlValue>) -> Self {
        MemlMap(map.into_iter().collect())
    }
}

impl From<MemlMap> for HashMap<String, MemlValue> {
    fn from(map: MemlMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for MemlMap {
    type Item = (String, MemlValue);
    type IntoIter = indexmap::map::IntoIter<String, MemlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MemlMap {
    type Item = (&'a String, &'a MemlValue);
    type IntoIter = indexmap::map::Iter<'a, String, MemlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, MemlValue)> for MemlMap {
    fn from_iter<T: IntoIterator<Item = (String, MemlValue)>>(iter: T) -> Self {
        MemlMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_keeps_position() {
        let mut map = MemlMap::new();
        map.insert("x".to_string(), MemlValue::from(1));
        map.insert("y".to_string(), MemlValue::from(2));
        map.insert("x".to_string(), MemlValue::from(3));

        let entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![
                ("x".to_string(), MemlValue::from(3)),
                ("y".to_string(), MemlValue::from(2)),
            ]
        );
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: MemlMap = vec![
            ("a".to_string(), MemlValue::Null),
            ("b".to_string(), MemlValue::Null),
            ("c".to_string(), MemlValue::Null),
        ]
        .into_iter()
        .collect();

        assert!(map.remove("b").is_some());
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_edit_in_place() {
        let mut map = MemlMap::with_capacity(2);
        map.insert("hp".to_string(), MemlValue::from(10));
        assert!(map.contains_key("hp"));
        assert!(!map.contains_key("mp"));

        if let Some(hp) = map.get_mut("hp") {
            *hp = MemlValue::from(7);
        }
        assert!(map.get_mut("mp").is_none());
        assert_eq!(map.get("hp"), Some(&MemlValue::from(7)));
        assert_eq!(map.len(), 1);
    }
}
