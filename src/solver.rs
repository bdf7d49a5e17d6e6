// SPDX-License-Identifier: MPL-2.0

//! PubGrub version solving algorithm.
//!
//! It consists in efficiently finding a set of packages and versions
//! that satisfy all the constraints of a given project dependencies.
//! In addition, when that is not possible,
//! PubGrub tries to provide a very human-readable and clear
//! explanation as to why that failed.
//! Below is an example of explanation present in
//! the introductory blog post about PubGrub
//!
//! ```txt
//! Because dropdown >=2.0.0 depends on icons >=2.0.0 and
//!   root depends on icons <2.0.0, dropdown >=2.0.0 is forbidden.
//!
//! And because menu >=1.1.0 depends on dropdown >=2.0.0,
//!   menu >=1.1.0 is forbidden.
//!
//! And because menu <1.1.0 depends on dropdown >=1.0.0 <2.0.0
//!   which depends on intl <4.0.0, every version of menu
//!   requires intl <4.0.0.
//!
//! So, because root depends on both menu >=1.0.0 and intl >=5.0.0,
//!   version solving failed.
//! ```
//!
//! The algorithm is generic and works for any type of dependency system
//! as long as packages (P) and versions (V) implement
//! the [Package] and Version traits.
//! [Package] is strictly equivalent and automatically generated
//! for any type that implement [Clone] + [Eq] + [Hash] + [Debug] + [Display].
//!
//! ## API
//!
//! ```
//! # use std::convert::Infallible;
//! # use pubgrub_core::{resolve, OfflineDependencyProvider, PubGrubError, Ranges};
//! #
//! # type NumVS = Ranges<u32>;
//! #
//! # fn try_main() -> Result<(), PubGrubError<OfflineDependencyProvider<&'static str, NumVS>>> {
//! #     let dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
//! #     let package = "root";
//! #     let version = 1u32;
//! let solution = resolve(&dependency_provider, package, version)?;
//! #     Ok(())
//! # }
//! # fn main() {
//! #     assert!(matches!(try_main(), Err(PubGrubError::NoSolution(_))));
//! # }
//! ```
//!
//! Where `dependency_provider` supplies the list of available packages and versions,
//! as well as the dependencies of every available package
//! by implementing the [DependencyProvider] trait.
//! The call to [resolve] for a given package at a given version
//! will compute the set of packages and versions needed
//! to satisfy the dependencies of that package and version pair.
//! If there is no solution, the reason will be provided as clear as possible.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Debug, Display};

use log::{debug, info};

use crate::internal::{Incompatibility, State};
use crate::package::Dependency;
use crate::{
    DependencyConstraints, Map, Package, PubGrubError, SelectedDependencies, Set, VersionSet,
};

/// The outcome of a successful [resolve] call: the selected packages, plus a count of how many
/// complete decision paths the solver walked down before finding one that satisfies everything.
///
/// `attempted_solutions` is 1 for a resolution that never had to backjump, and increases by one
/// for every decision taken after a backjump resumes the search along a new path. It is mostly
/// useful for diagnosing why a particular resolution was slow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverResult<DP: DependencyProvider> {
    /// The selected version for every package needed to satisfy the root dependencies.
    pub packages: SelectedDependencies<DP>,
    /// Number of complete decision paths attempted before finding this solution.
    pub attempted_solutions: u32,
}

/// Main function of the library.
/// Finds a set of packages satisfying dependency bounds for a given package + version pair.
pub fn resolve<DP: DependencyProvider>(
    dependency_provider: &DP,
    package: DP::P,
    version: impl Into<DP::V>,
) -> Result<SolverResult<DP>, PubGrubError<DP>> {
    let start = std::time::Instant::now();
    let result = resolve_inner(dependency_provider, package, version);
    info!("resolution finished in {:?}", start.elapsed());
    result
}

fn resolve_inner<DP: DependencyProvider>(
    dependency_provider: &DP,
    package: DP::P,
    version: impl Into<DP::V>,
) -> Result<SolverResult<DP>, PubGrubError<DP>> {
    let mut state: State<DP> = State::init(package.clone(), version.into());
    let mut next = package;
    loop {
        dependency_provider
            .should_cancel()
            .map_err(PubGrubError::ErrorInShouldCancel)?;

        info!("unit_propagation: {}", &next);
        state.unit_propagation(next)?;

        debug!(
            "Partial solution after unit propagation: {}",
            state.partial_solution
        );

        let Some(highest_priority_pkg) = state
            .partial_solution
            .pick_highest_priority_pkg(|p, r| dependency_provider.prioritize(p, r))
        else {
            return Ok(SolverResult {
                attempted_solutions: state.partial_solution.attempted_solutions(),
                packages: state.partial_solution.extract_solution(),
            });
        };
        next = highest_priority_pkg;

        let term_intersection = state
            .partial_solution
            .term_intersection_for_package(&next)
            .ok_or_else(|| {
                PubGrubError::Failure("a package was chosen but we don't have a term.".into())
            })?;
        let decision = dependency_provider
            .choose_version(&next, term_intersection.unwrap_positive())
            .map_err(PubGrubError::ErrorChoosingPackageVersion)?;
        info!("DP chose: {} @ {:?}", next, decision);

        // Pick the next compatible version.
        let v = match decision {
            None => {
                let inc = Incompatibility::no_versions(next.clone(), term_intersection.clone());
                state.add_incompatibility(inc);
                continue;
            }
            Some(x) => x,
        };

        if !term_intersection.contains(&v) {
            return Err(PubGrubError::Failure(
                "choose_package_version picked an incompatible version".into(),
            ));
        }

        let is_new_dependency = state.record_dependencies_fetched(
            next.clone(),
            v.clone(),
            state.partial_solution.current_decision_level(),
        );

        if is_new_dependency {
            let p = &next;

            // A package's Python/platform conditions are checked before its full dependency
            // list is fetched: both are cheaper than a fetch and, when violated, rule the
            // version out without ever asking the provider for its dependencies.
            if let Some(package_range) = dependency_provider.python_requirement(p, &v) {
                let root_range = dependency_provider
                    .root_python_range()
                    .unwrap_or_else(<DP::VS as VersionSet>::full);
                if !package_range.allows_all(&root_range) {
                    state.add_incompatibility(Incompatibility::python_version(
                        p.clone(),
                        v.clone(),
                        package_range,
                        root_range,
                    ));
                    continue;
                }
            }
            if let Some(reason) = dependency_provider.platform_conflict(p, &v) {
                state.add_incompatibility(Incompatibility::platform(p.clone(), v.clone(), reason));
                continue;
            }

            // Retrieve that package dependencies.
            let dependencies = dependency_provider
                .get_dependencies(p, &v)
                .or_else(|err| match dependency_provider.classify_not_found(&err) {
                    Some(reason) => Ok(Dependencies::Unavailable(reason)),
                    None => Err(PubGrubError::ErrorRetrievingDependencies {
                        package: p.clone(),
                        version: v.clone(),
                        source: err,
                    }),
                })?;

            let dependencies = match dependencies {
                Dependencies::Unavailable(reason) => {
                    state.add_incompatibility(Incompatibility::package_not_found(
                        p.clone(),
                        v.clone(),
                        reason,
                    ));
                    continue;
                }
                Dependencies::Available(x) => x,
            };
            let dependencies = dependency_provider.dependency_metadata(p, &v, &dependencies);

            // Add that package and version if the dependencies are not problematic.
            let dep_incompats =
                state.add_incompatibility_from_dependencies(p.clone(), v.clone(), dependencies)?;

            state.partial_solution.add_version(
                p.clone(),
                v.clone(),
                dep_incompats,
                &state.incompatibility_store,
            );
        } else {
            // `dep_incompats` are already in `incompatibilities` so we know there are not satisfied
            // terms and can add the decision directly.
            info!("add_decision (not first time): {} @ {}", &next, v);
            state.partial_solution.add_decision(next.clone(), v);
        }
    }
}

/// An enum used by [DependencyProvider] that holds information about package dependencies.
/// For each [Package] there is a set of versions allowed as a dependency.
#[derive(Clone)]
pub enum Dependencies<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> {
    /// Package dependencies are unavailable with the reason why they are missing.
    Unavailable(M),
    /// Container for all available package versions.
    Available(DependencyConstraints<P, VS>),
}

/// Trait that allows the algorithm to retrieve available packages and their dependencies.
/// An implementor needs to be supplied to the [resolve] function.
pub trait DependencyProvider {
    /// How this provider stores the name of the packages.
    type P: Package;

    /// How this provider stores the versions of the packages.
    ///
    /// A common choice is [`SemanticVersion`][crate::version::SemanticVersion].
    type V: Debug + Display + Clone + Ord;

    /// How this provider stores the version requirements for the packages.
    /// The requirements must be able to process the same kind of version as this dependency provider.
    ///
    /// A common choice is [`Ranges`][version_ranges::Ranges].
    type VS: VersionSet<V = Self::V>;

    /// Type for custom incompatibilities.
    ///
    /// There are reasons in user code outside pubgrub that can cause packages or versions
    /// to be unavailable. Examples:
    /// * The version would require building the package, but builds are disabled.
    /// * The package is not available in the cache, but internet access has been disabled.
    /// * The package uses a legacy format not supported anymore.
    ///
    /// The intended use is to track them in an enum and assign them to this type. You can also
    /// assign [`String`] as placeholder.
    type M: Eq + Clone + Debug + Display;

    /// [Decision making](https://github.com/dart-lang/pub/blob/master/doc/solver.md#decision-making)
    /// is the process of choosing the next package
    /// and version that will be appended to the partial solution.
    ///
    /// Every time such a decision must be made, the resolver looks at all the potential valid
    /// packages that have changed, and a asks the dependency provider how important each one is.
    /// For each one it calls `prioritize` with the name of the package and the current set of
    /// acceptable versions.
    /// The resolver will then pick the package with the highes priority from all the potential valid
    /// packages.
    ///
    /// The strategy employed to prioritize packages
    /// cannot change the existence of a solution or not,
    /// but can drastically change the performances of the solver,
    /// or the properties of the solution.
    /// The documentation of Pub (PubGrub implementation for the dart programming language)
    /// states the following:
    ///
    /// > Pub chooses the latest matching version of the package
    /// > with the fewest versions that match the outstanding constraint.
    /// > This tends to find conflicts earlier if any exist,
    /// > since these packages will run out of versions to try more quickly.
    /// > But there's likely room for improvement in these heuristics.
    ///
    /// Note: the resolver may call this even when the range has not changed,
    /// if it is more efficient for the resolvers internal data structures.
    fn prioritize(&self, package: &Self::P, range: &Self::VS) -> Self::Priority;
    /// The type returned from `prioritize`. The resolver does not care what type this is
    /// as long as it can pick a largest one and clone it.
    ///
    /// [Reverse] can be useful if you want to pick the package with
    /// the fewest versions that match the outstanding constraint.
    type Priority: Ord + Clone;

    /// The kind of error returned from these methods.
    ///
    /// Returning this signals that resolution should fail with this error.
    type Err: Error + 'static;

    /// Once the resolver has found the highest `Priority` package from all potential valid
    /// packages, it needs to know what version of that package to use. The most common pattern
    /// is to select the largest version that the range contains.
    fn choose_version(
        &self,
        package: &Self::P,
        range: &Self::VS,
    ) -> Result<Option<Self::V>, Self::Err>;

    /// Retrieves the package dependencies.
    /// Return [Dependencies::Unavailable] if its dependencies are unavailable.
    #[allow(clippy::type_complexity)]
    fn get_dependencies(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Dependencies<Self::P, Self::VS, Self::M>, Self::Err>;

    /// This is called fairly regularly during the resolution,
    /// if it returns an Err then resolution will be terminated.
    /// This is helpful if you want to add some form of early termination like a timeout,
    /// or you want to add some form of user feedback if things are taking a while.
    /// If not provided the resolver will run as long as needed.
    fn should_cancel(&self) -> Result<(), Self::Err> {
        Ok(())
    }

    /// Supplies the feature-gating, source-coordinate and environment-marker metadata for the
    /// dependencies `get_dependencies` just returned, one [`Dependency`] per entry of
    /// `constraints`.
    ///
    /// The default wraps each `(package, range)` pair as a plain, unconditional, non-optional
    /// dependency, which reproduces the prior behavior for providers that don't override it.
    #[allow(clippy::type_complexity)]
    fn dependency_metadata(
        &self,
        _package: &Self::P,
        _version: &Self::V,
        constraints: &DependencyConstraints<Self::P, Self::VS>,
    ) -> Vec<Dependency<Self::P, Self::VS>> {
        constraints
            .iter()
            .map(|(p, r)| Dependency::new(p.clone(), r.clone()))
            .collect()
    }

    /// The range of Python versions `package @ version` requires, if it is Python-conditioned
    /// at all. A `None` means this check never applies to this package version.
    fn python_requirement(&self, _package: &Self::P, _version: &Self::V) -> Option<Self::VS> {
        None
    }

    /// The range of Python versions the project being solved for declares support for. Only
    /// consulted when some package's `python_requirement` returns `Some`.
    fn root_python_range(&self) -> Option<Self::VS> {
        None
    }

    /// Whether `package @ version` is unusable on the platform resolution is running for;
    /// `Some` carries the reason to attach to the resulting incompatibility.
    fn platform_conflict(&self, _package: &Self::P, _version: &Self::V) -> Option<Self::M> {
        None
    }

    /// The version `package` is pinned to by a lock file, if any. `choose_version`'s default
    /// strategies should prefer this version when it is still within the requested range.
    fn get_locked(&self, _package: &Self::P) -> Option<Self::V> {
        None
    }

    /// Whether `package` should bypass its lock, if any, and resolve to its newest matching
    /// version instead.
    fn use_latest(&self, _package: &Self::P) -> bool {
        false
    }

    /// Classifies an error from `get_dependencies` as a "this package or version could not be
    /// found" failure, as opposed to one that should abort resolution outright. Returning
    /// `Some(reason)` converts the error into a [`PackageNotFound`](crate::report::External::PackageNotFound)
    /// incompatibility that resolution keeps searching around; returning `None` (the default)
    /// propagates the error and fails the whole resolution, preserving prior behavior for
    /// providers that don't override it.
    fn classify_not_found(&self, _err: &Self::Err) -> Option<Self::M> {
        None
    }
}

/// A basic implementation of [DependencyProvider].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "VS::V: serde::Serialize, VS: serde::Serialize, P: serde::Serialize",
        deserialize = "VS::V: serde::Deserialize<'de>, VS: serde::Deserialize<'de>, P: serde::Deserialize<'de>"
    ))
)]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OfflineDependencyProvider<P: Package, VS: VersionSet> {
    dependencies: Map<P, BTreeMap<VS::V, DependencyConstraints<P, VS>>>,
    /// Versions pinned by a lock file. Not part of the serialized form: a lock is a separate
    /// artifact from the in-memory package index and is expected to be loaded and applied after
    /// deserializing this provider.
    #[cfg_attr(feature = "serde", serde(skip))]
    locked: Map<P, VS::V>,
    #[cfg_attr(feature = "serde", serde(skip))]
    use_latest: Set<P>,
}

impl<P: Package, VS: VersionSet> OfflineDependencyProvider<P, VS> {
    /// Creates an empty OfflineDependencyProvider with no dependencies.
    pub fn new() -> Self {
        Self {
            dependencies: Map::default(),
            locked: Map::default(),
            use_latest: Set::default(),
        }
    }

    /// Pins `package` to `version`, the way a lock file would. `choose_version` prefers this
    /// version over any other candidate as long as it is still within the requested range and
    /// `package` is not also registered with [`set_use_latest`](Self::set_use_latest).
    pub fn set_locked(&mut self, package: P, version: impl Into<VS::V>) {
        self.locked.insert(package, version.into());
    }

    /// Marks `package` to always resolve to its newest matching version, bypassing any lock.
    pub fn set_use_latest(&mut self, package: P) {
        self.use_latest.insert(package);
    }

    /// Registers the dependencies of a package and version pair.
    /// Dependencies must be added with a single call to
    /// [add_dependencies](OfflineDependencyProvider::add_dependencies).
    /// All subsequent calls to
    /// [add_dependencies](OfflineDependencyProvider::add_dependencies) for a given
    /// package version pair will replace the dependencies by the new ones.
    ///
    /// The API does not allow to add dependencies one at a time to uphold an assumption that
    /// [OfflineDependencyProvider.get_dependencies(p, v)](OfflineDependencyProvider::get_dependencies)
    /// provides all dependencies of a given package (p) and version (v) pair.
    pub fn add_dependencies<I: IntoIterator<Item = (P, VS)>>(
        &mut self,
        package: P,
        version: impl Into<VS::V>,
        dependencies: I,
    ) {
        let package_deps = dependencies.into_iter().collect();
        let v = version.into();
        *self
            .dependencies
            .entry(package)
            .or_default()
            .entry(v)
            .or_default() = package_deps;
    }

    /// Lists packages that have been saved.
    pub fn packages(&self) -> impl Iterator<Item = &P> {
        self.dependencies.keys()
    }

    /// Lists versions of saved packages in sorted order.
    /// Returns [None] if no information is available regarding that package.
    pub fn versions(&self, package: &P) -> Option<impl Iterator<Item = &VS::V>> {
        self.dependencies.get(package).map(|k| k.keys())
    }

    /// Lists dependencies of a given package and version.
    /// Returns [None] if no information is available regarding that package and version pair.
    fn dependencies(&self, package: &P, version: &VS::V) -> Option<DependencyConstraints<P, VS>> {
        self.dependencies.get(package)?.get(version).cloned()
    }
}

/// Where a package selection falls on the urgency ordering `OfflineDependencyProvider::prioritize`
/// uses to rank candidates. Variants are declared in ascending urgency so that the derived `Ord`
/// gives the most urgent tier the greatest value: `pick_highest_priority_pkg` pops the largest
/// priority first, so the most urgent tier must compare greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PackagePreference {
    /// Nothing pins this package down; rank it by how constrained its candidates are.
    Default,
    /// This package should use its newest matching version rather than any lock.
    UseLatest,
    /// The range already admits at most one candidate: there is no real choice left to make.
    NoChoice,
    /// A lock file pins this package to a specific version.
    Locked,
    /// This package is tied to a specific source (a local path, a VCS checkout) rather than
    /// looked up by name in a shared registry. `OfflineDependencyProvider`'s in-memory model
    /// has no source-coordinate distinction, so it never produces this tier itself; the variant
    /// exists for providers that do track [`Dependency::source`](crate::Dependency).
    DirectOrigin,
}

/// The priority [`OfflineDependencyProvider::prioritize`] assigns a package: first by
/// [`PackagePreference`], then by whether any in-range candidate has dependencies of its own
/// (packages with dependencies are more likely to produce a conflict worth finding early), then
/// by how few candidates remain (fewer candidates run out of options, and so surface conflicts,
/// faster).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackagePriority {
    preference: PackagePreference,
    has_dependencies: bool,
    candidate_count: Reverse<usize>,
}

/// An implementation of [DependencyProvider] that
/// contains all dependency information available in memory.
/// Candidates are picked by preference tier first (a lock or an unambiguous range wins over
/// everything else), then by whether they have dependencies of their own, then by how few
/// versions remain in range. Versions are picked with the newest versions first, unless a lock
/// applies.
impl<P: Package, VS: VersionSet> DependencyProvider for OfflineDependencyProvider<P, VS> {
    type P = P;
    type V = VS::V;
    type VS = VS;
    type M = String;

    type Err = Infallible;

    fn choose_version(&self, package: &P, range: &VS) -> Result<Option<VS::V>, Infallible> {
        let Some(versions) = self.dependencies.get(package) else {
            return Ok(None);
        };
        if !self.use_latest.contains(package) {
            if let Some(locked) = self.locked.get(package) {
                if range.contains(locked) && versions.contains_key(locked) {
                    return Ok(Some(locked.clone()));
                }
            }
        }
        Ok(versions.keys().rev().find(|v| range.contains(v)).cloned())
    }

    type Priority = PackagePriority;
    fn prioritize(&self, package: &P, range: &VS) -> Self::Priority {
        let candidates: Vec<&DependencyConstraints<P, VS>> = self
            .dependencies
            .get(package)
            .map(|versions| {
                versions
                    .iter()
                    .filter(|(v, _)| range.contains(v))
                    .map(|(_, deps)| deps)
                    .collect()
            })
            .unwrap_or_default();
        let preference = if self.use_latest.contains(package) {
            PackagePreference::UseLatest
        } else if self.locked.contains_key(package) {
            PackagePreference::Locked
        } else if candidates.len() <= 1 {
            PackagePreference::NoChoice
        } else {
            PackagePreference::Default
        };
        PackagePriority {
            preference,
            has_dependencies: candidates.iter().any(|deps| !deps.is_empty()),
            candidate_count: Reverse(candidates.len()),
        }
    }

    fn get_dependencies(
        &self,
        package: &P,
        version: &VS::V,
    ) -> Result<Dependencies<P, VS, Self::M>, Infallible> {
        Ok(match self.dependencies(package, version) {
            None => {
                Dependencies::Unavailable("its dependencies could not be determined".to_string())
            }
            Some(dependencies) => Dependencies::Available(dependencies),
        })
    }

    fn get_locked(&self, package: &P) -> Option<VS::V> {
        self.locked.get(package).cloned()
    }

    fn use_latest(&self, package: &P) -> bool {
        self.use_latest.contains(package)
    }
}
