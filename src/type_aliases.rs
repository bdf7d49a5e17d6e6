// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

use crate::solver::DependencyProvider;

/// Map implementation used by the library.
pub type Map<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Set implementation used by the library.
pub type Set<V> = HashSet<V, BuildHasherDefault<FxHasher>>;

/// Concrete dependencies picked by the library during [resolve](crate::solver::resolve)
/// from [DependencyConstraints].
pub type SelectedDependencies<DP> = Map<<DP as DependencyProvider>::P, <DP as DependencyProvider>::V>;

/// Holds information about all possible versions a given package can accept.
/// There is a difference in semantics between an empty map
/// inside [DependencyConstraints] and [Dependencies::Unavailable](crate::solver::Dependencies::Unavailable):
/// the former means the package has no dependency and it is a known fact,
/// while the latter means they could not be fetched by the [DependencyProvider](crate::solver::DependencyProvider).
pub type DependencyConstraints<P, VS> = Map<P, VS>;
