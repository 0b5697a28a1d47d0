use alloc::vec;
use core::fmt;

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::value::Primitive;

/// A string-keyed mapping that preserves insertion order.
///
/// Serialized records use the declaration order of their fields, so the
/// entries are kept in a list, with a hash index over the keys for lookups.
/// Keys are unique: inserting an existing key replaces its value in place.
///
/// Equality ignores order, two mappings are equal when they hold the same
/// keys with equal values.
///
/// # Example
///
/// ```
/// use vc_serial::value::{Mapping, Primitive};
///
/// let mut mapping = Mapping::new();
/// mapping.insert("b", Primitive::from(1));
/// mapping.insert("a", Primitive::from(2));
/// mapping.insert("b", Primitive::from(3));
///
/// assert_eq!(mapping.keys().collect::<Vec<_>>(), ["b", "a"]);
/// assert_eq!(mapping.get("b"), Some(&Primitive::from(3)));
/// ```
#[derive(Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, Primitive)>,
    indices: HashMap<String, usize, FixedState>,
}

impl Mapping {
    /// Creates an empty mapping.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            indices: HashMap::with_hasher(FixedState::with_seed(0)),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            indices: HashMap::with_capacity_and_hasher(capacity, FixedState::with_seed(0)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a value, returning the previous value of the key if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Primitive) -> Option<Primitive> {
        let key = key.into();
        if let Some(&index) = self.indices.get(&key) {
            return Some(core::mem::replace(&mut self.entries[index].1, value));
        }
        self.indices.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Primitive> {
        let index = *self.indices.get(key)?;
        Some(&self.entries[index].1)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Primitive> {
        let index = self.indices.remove(key)?;
        let (_, value) = self.entries.remove(index);
        for (key, _) in &self.entries[index..] {
            if let Some(slot) = self.indices.get_mut(key.as_str()) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Primitive)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, Primitive)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Primitive)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Primitive);
    type IntoIter = vec::IntoIter<(String, Primitive)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Mapping;
    use crate::value::Primitive;

    #[test]
    fn insert_replaces_in_place() {
        let mut mapping = Mapping::new();
        assert!(mapping.insert("x", Primitive::from(1)).is_none());
        mapping.insert("y", Primitive::from(2));
        assert_eq!(mapping.insert("x", Primitive::from(3)), Some(Primitive::from(1)));
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn remove_keeps_lookups_consistent() {
        let mut mapping: Mapping = (0..1000)
            .map(|i| (format!("k{i}"), Primitive::from(i)))
            .collect();
        assert_eq!(mapping.remove("k10"), Some(Primitive::from(10)));
        assert_eq!(mapping.remove("k10"), None);

        assert_eq!(mapping.len(), 999);
        assert_eq!(mapping.get("k11"), Some(&Primitive::from(11)));
        assert_eq!(mapping.get("k999"), Some(&Primitive::from(999)));
        assert_eq!(mapping.keys().nth(10), Some("k11"));

        mapping.insert("k10", Primitive::Null);
        assert_eq!(mapping.keys().last(), Some("k10"));
        assert_eq!(mapping.insert("k500", Primitive::Null), Some(Primitive::from(500)));
        assert_eq!(mapping.len(), 1000);
    }

    #[test]
    fn equality_ignores_order() {
        let a: Mapping = [("x", Primitive::from(1)), ("y", Primitive::Null)]
            .into_iter()
            .collect();
        let b: Mapping = [("y", Primitive::Null), ("x", Primitive::from(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);

        let mut c = b.clone();
        c.remove("y");
        assert_ne!(a, c);
    }
}
