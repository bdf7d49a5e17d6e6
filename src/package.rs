// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Trait for identifying packages.
//! Automatically implemented for traits implementing
//! [Clone] + [Eq] + [Hash] + [Debug] + [Display](std::fmt::Display).

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::type_aliases::Set;
use crate::version_set::VersionSet;

/// Trait for identifying packages.
/// Automatically implemented for types already implementing
/// [Clone] + [Eq] + [Hash] + [Debug] + [Display](std::fmt::Display).
pub trait Package: Clone + Eq + Hash + Debug + Display {}

/// Automatically implement the Package trait for any type
/// that already implement [Clone] + [Eq] + [Hash] + [Debug] + [Display](std::fmt::Display).
impl<T: Clone + Eq + Hash + Debug + Display> Package for T {}

/// Identifies where a package comes from, for packages that are not simply looked up by name in
/// a single default registry: a local path, a URL, a VCS checkout, possibly restricted to a
/// subdirectory of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceCoordinate {
    /// A short tag naming the kind of source ("path", "url", "git", ...).
    pub source_type: String,
    /// The location of the source: a file path, a URL, or a repository address.
    pub url: String,
    /// A VCS reference (branch, tag, or commit), if relevant.
    pub reference: Option<String>,
    /// A subdirectory within the source, for monorepo-style packages.
    pub subdirectory: Option<String>,
}

/// A dependency edge: a requirement on a range of versions of a package, plus the metadata the
/// solver itself does not interpret but carries through so that callers building a lock file or
/// evaluating markers do not need a second pass over the manifest.
///
/// Only `package`, `range` and `optional` affect what the solver does with this edge: a
/// dependency with `optional` set is not turned into an incompatibility at all (the common case
/// for a feature-gated dependency nobody asked to enable). `features`, `python` and `marker` are
/// metadata for external collaborators; this crate does not evaluate markers or activate
/// features itself.
#[derive(Debug, Clone)]
pub struct Dependency<P: Package, VS: VersionSet> {
    /// The package this dependency names.
    pub package: P,
    /// The source coordinate distinguishing which concrete package this is, if not the default
    /// (unset) single-registry case.
    pub source: Option<SourceCoordinate>,
    /// The range of versions this dependency accepts.
    pub range: VS,
    /// Whether this dependency only applies when an enabling feature is selected. Optional
    /// dependencies are not propagated into incompatibilities by this crate's solver loop, since
    /// it has no feature-activation model of its own.
    pub optional: bool,
    /// Feature names this dependency edge enables on the dependee.
    pub features: Set<String>,
    /// The Python-version range this dependency edge applies under, if conditioned on one.
    pub python: Option<VS>,
    /// An opaque environment marker (e.g. `sys_platform == "win32"`), if any.
    pub marker: Option<String>,
}

impl<P: Package, VS: VersionSet> Dependency<P, VS> {
    /// A plain, unconditional, non-optional dependency on `package` within `range`.
    pub fn new(package: P, range: VS) -> Self {
        Self {
            package,
            source: None,
            range,
            optional: false,
            features: Set::default(),
            python: None,
            marker: None,
        }
    }

    /// Whether `self` and `other` refer to what this crate considers the same package for
    /// propagation purposes: matching name and matching source coordinate. Two dependencies that
    /// agree on name but name different sources (e.g. the registry release versus a local path
    /// override) are treated as distinct packages and never merged or substituted for each
    /// other; root's own implicit source (always `None`) trivially matches itself, which is the
    /// root-exemption case.
    pub fn is_same_package(&self, other: &Self) -> bool {
        self.package == other.package && self.source == other.source
    }
}
