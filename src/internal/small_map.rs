// SPDX-License-Identifier: MPL-2.0

//! A map specialized for the common case of very few entries, such as the
//! per-package terms of an [Incompatibility](crate::internal::incompatibility::Incompatibility)
//! (in practice almost always one or two packages).

use std::fmt;

/// An inline map from `K` to `V`, growing from an array to a `Vec` only past two entries.
#[derive(Clone)]
pub enum SmallMap<K, V> {
    Empty,
    One([(K, V); 1]),
    Two([(K, V); 2]),
    Flexible(Vec<(K, V)>),
}

impl<K: PartialEq, V> SmallMap<K, V> {
    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn as_slice(&self) -> &[(K, V)] {
        match self {
            Self::Empty => &[],
            Self::One(v) => v,
            Self::Two(v) => v,
            Self::Flexible(v) => v,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.as_slice().iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slice = match self {
            Self::Empty => &mut [][..],
            Self::One(v) => v.as_mut_slice(),
            Self::Two(v) => v.as_mut_slice(),
            Self::Flexible(v) => v.as_mut_slice(),
        };
        slice.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.as_slice().iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.as_slice().iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.as_slice().iter().map(|(_, v)| v)
    }

    /// Insert `value` at `key`. If an entry for `key` already exists, `combine` is called
    /// with `(existing, new)` to produce the value stored instead of just overwriting it.
    pub fn insert(&mut self, key: K, value: V, combine: impl FnOnce(V, V) -> V) {
        *self = match std::mem::replace(self, Self::Empty) {
            Self::Empty => Self::One([(key, value)]),
            Self::One([(k, v)]) => {
                if k == key {
                    Self::One([(k, combine(v, value))])
                } else {
                    Self::Two([(k, v), (key, value)])
                }
            }
            Self::Two([(k1, v1), (k2, v2)]) => {
                if k1 == key {
                    Self::Two([(k1, combine(v1, value)), (k2, v2)])
                } else if k2 == key {
                    Self::Two([(k1, v1), (k2, combine(v2, value))])
                } else {
                    Self::Flexible(vec![(k1, v1), (k2, v2), (key, value)])
                }
            }
            Self::Flexible(mut v) => {
                if let Some(idx) = v.iter().position(|(k, _)| *k == key) {
                    let (k, old) = v.remove(idx);
                    v.insert(idx, (k, combine(old, value)));
                } else {
                    v.push((key, value));
                }
                Self::Flexible(v)
            }
        };
    }
}

impl<K, V> Default for SmallMap<K, V> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<K: PartialEq, V: PartialEq> Eq for SmallMap<K, V> {}

impl<K: PartialEq, V: PartialEq> PartialEq<SmallMap<K, V>> for SmallMap<K, V> {
    fn eq(&self, other: &SmallMap<K, V>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SmallMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}
