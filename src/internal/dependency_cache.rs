// SPDX-License-Identifier: MPL-2.0

//! Tracks which (package, version) dependency sets have already been fetched from the
//! dependency provider at which decision level, so the solve loop does not re-fetch and
//! re-derive the same incompatibilities on every unit propagation pass.

use crate::internal::DecisionLevel;
use crate::package::Package;

/// One frame per decision level: the (package, version) pairs whose dependencies were fetched
/// while that level (or an earlier one still on the stack) was current. Backtracking past a
/// level drops its frame, so a provider whose answers legitimately depend on the partial
/// solution (not just on the package/version pair) gets asked again after backjumping.
///
/// Versions are compared with `PartialEq` rather than hashed: `DependencyProvider::V` only
/// guarantees `Ord` (whose `Eq` supertrait gives us `PartialEq`), not `Hash`, and per-level
/// frames are small in practice.
#[derive(Clone, Debug)]
pub(crate) struct DependencyCache<P: Package, V: Clone + PartialEq> {
    frames: Vec<Vec<(P, V)>>,
}

impl<P: Package, V: Clone + PartialEq> DependencyCache<P, V> {
    pub(crate) fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Records that `package @ version` was fetched while at `level`. Returns `true` if this is
    /// the first time this pair has been recorded at any level (the caller should go fetch and
    /// apply its dependencies), `false` if it was already known.
    pub(crate) fn record(&mut self, package: P, version: V, level: DecisionLevel) -> bool {
        if self
            .frames
            .iter()
            .flatten()
            .any(|(p, v)| p == &package && v == &version)
        {
            return false;
        }
        let index = level.0 as usize;
        if self.frames.len() <= index {
            self.frames.resize_with(index + 1, Vec::new);
        }
        self.frames[index].push((package, version));
        true
    }

    /// Forgets every pair recorded at a decision level deeper than `level`, called when
    /// backtracking past that level.
    pub(crate) fn clear_level(&mut self, level: DecisionLevel) {
        self.frames.truncate(level.0 as usize + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_pair_once() {
        let mut cache: DependencyCache<&'static str, u32> = DependencyCache::new();
        assert!(cache.record("foo", 1, DecisionLevel(0)));
        assert!(!cache.record("foo", 1, DecisionLevel(0)));
        assert!(cache.record("foo", 2, DecisionLevel(0)));
        assert!(cache.record("bar", 1, DecisionLevel(1)));
    }

    #[test]
    fn clear_level_forgets_deeper_frames() {
        let mut cache: DependencyCache<&'static str, u32> = DependencyCache::new();
        cache.record("foo", 1, DecisionLevel(0));
        cache.record("bar", 1, DecisionLevel(1));
        cache.record("baz", 1, DecisionLevel(2));
        cache.clear_level(DecisionLevel(0));
        // Levels 1 and 2 are gone: re-recording them succeeds again.
        assert!(cache.record("bar", 1, DecisionLevel(1)));
        assert!(cache.record("baz", 1, DecisionLevel(2)));
        // Level 0 is untouched.
        assert!(!cache.record("foo", 1, DecisionLevel(0)));
    }
}
