// SPDX-License-Identifier: MPL-2.0

//! Bridges the standalone [`version_ranges`] crate into this crate's [`VersionSet`] trait,
//! the same way [`crate::range::Range`] implements it directly.
//!
//! `version_ranges::Ranges` is the performance-oriented, segment-optimized sibling of
//! [`crate::range::Range`]; solver code that wants the faster representation picks this
//! impl instead of switching to a different trait.

use std::fmt::{Debug, Display};

use version_ranges::Ranges;

use crate::version_set::VersionSet;

impl<T: Debug + Display + Clone + Eq + Ord> VersionSet for Ranges<T> {
    type V = T;

    fn empty() -> Self {
        Ranges::empty()
    }

    fn singleton(v: Self::V) -> Self {
        Ranges::singleton(v)
    }

    fn complement(&self) -> Self {
        Ranges::complement(self)
    }

    fn intersection(&self, other: &Self) -> Self {
        Ranges::intersection(self, other)
    }

    fn contains(&self, v: &Self::V) -> bool {
        Ranges::contains(self, v)
    }

    fn full() -> Self {
        Ranges::empty().complement()
    }

    fn union(&self, other: &Self) -> Self {
        Ranges::union(self, other)
    }

    fn difference(&self, other: &Self) -> Self {
        Ranges::difference(self, other)
    }

    fn is_empty(&self) -> bool {
        Ranges::is_empty(self)
    }

    fn allows_all(&self, other: &Self) -> bool {
        other.subset_of(self)
    }

    fn allows_any(&self, other: &Self) -> bool {
        !Ranges::is_disjoint(self, other)
    }
}
