// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different packages
//! that should never be satisfied all together.

use std::fmt::{self, Debug, Display};

use crate::internal::arena::{Arena, Id};
use crate::internal::small_map::SmallMap;
use crate::package::Package;
use crate::report::{DerivationTree, Derived, External};
use crate::term::Term;
use crate::type_aliases::Map;
use crate::version_set::VersionSet;

/// The reason an [Incompatibility] holds, per §3's cause taxonomy.
///
/// `Root`, `NoVersions`, `Dependency`, `PackageNotFound`, `PythonVersion` and `Platform` are
/// "external": they originate outside the algorithm. `Conflict` is "derived": it was produced by
/// [conflict resolution](crate::internal::core::State) combining two earlier incompatibilities.
/// A single closed enum replaces the two overlapping cause hierarchies the ported implementation
/// historically carried (see this crate's design notes on the naming split).
#[derive(Debug, Clone)]
pub(crate) enum Cause<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> {
    /// The root incompatibility, forbidding "root is not itself". Carries the root version so
    /// the report writer can name it without reaching back into the (negated) term.
    Root(VS::V),
    /// No published version of a package satisfies the term it is paired with.
    NoVersions,
    /// One package version requires a range of another; carries no payload beyond the terms.
    Dependency,
    /// The oracle could not resolve a package at all (a registry/network/not-found failure).
    PackageNotFound(M),
    /// A package's required Python range conflicts with the range the root project supports.
    PythonVersion {
        /// The range of Python versions the package requires.
        package_range: VS,
        /// The range of Python versions the root project declares support for.
        root_range: VS,
    },
    /// A package declares it is unusable on the current (or a required) platform.
    Platform(M),
    /// Derived during conflict resolution; carries the two parent incompatibilities.
    Conflict(IncompId<P, VS, M>, IncompId<P, VS, M>),
}

/// An incompatibility is a set of terms for different packages
/// that should never be satisfied all together.
/// An incompatibility usually originates from a package dependency.
/// For example, if package A at version 1 depends on package B
/// at version 2, you can never have both terms `A = 1`
/// and `not B = 2` satisfied at the same time in a partial solution.
/// This would mean that we found a solution with package A at version 1
/// but not with package B at version 2.
/// Yet A at version 1 depends on B at version 2 so this is not possible.
/// Therefore, the set `{ A = 1, not B = 2 }` is an incompatibility,
/// defined from dependencies of A at version 1.
///
/// Incompatibilities can also be derived from two other incompatibilities
/// during conflict resolution.
#[derive(Debug, Clone)]
pub(crate) struct Incompatibility<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> {
    package_terms: SmallMap<P, Term<VS>>,
    cause: Cause<P, VS, M>,
}

/// A type alias for an arena index pointing to an [Incompatibility].
pub(crate) type IncompId<P, VS, M> = Id<Incompatibility<P, VS, M>>;

/// Same as [IncompId], but bound to a [DependencyProvider](crate::solver::DependencyProvider).
pub(crate) type IncompDpId<DP> = IncompId<
    <DP as crate::solver::DependencyProvider>::P,
    <DP as crate::solver::DependencyProvider>::VS,
    <DP as crate::solver::DependencyProvider>::M,
>;

/// A `Relation` describes how a set of terms can be compared to an incompatibility.
/// Typically, the set of terms comes from the partial solution.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum Relation<P: Package> {
    /// The set of terms satisfies the incompatibility: every term of the incompatibility is
    /// satisfied by the corresponding term of the set.
    Satisfied,
    /// One package in the incompatibility is not yet satisfied, but every other one is.
    /// Propagating this package is what would make the incompatibility satisfied.
    AlmostSatisfied(P),
    /// At least one term of the incompatibility is contradicted by the set of terms.
    Contradicted(P),
    /// Neither satisfied, almost satisfied, nor contradicted.
    Inconclusive,
}

impl<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> Incompatibility<P, VS, M> {
    /// Create the root incompatibility, used to initiate a solve: it forbids picking any version
    /// for root other than the one passed in, which makes root a forced first decision.
    pub(crate) fn not_root(package: P, version: VS::V) -> Self {
        Self {
            package_terms: SmallMap::One([(
                package,
                Term::Negative(VS::singleton(version.clone())),
            )]),
            cause: Cause::Root(version),
        }
    }

    /// Create an incompatibility to remember that a given set is not solvable.
    pub(crate) fn no_versions(package: P, term: Term<VS>) -> Self {
        let set = match &term {
            Term::Positive(set) => set.clone(),
            Term::Negative(_) => panic!("No version should have a positive term"),
        };
        Self {
            package_terms: SmallMap::One([(package, Term::Positive(set))]),
            cause: Cause::NoVersions,
        }
    }

    /// Create an incompatibility for a reason outside pubgrub (the oracle failed to resolve
    /// this package at all).
    pub(crate) fn package_not_found(package: P, version: VS::V, reason: M) -> Self {
        Self {
            package_terms: SmallMap::One([(package, Term::exact(version))]),
            cause: Cause::PackageNotFound(reason),
        }
    }

    /// Create an incompatibility recording that a package version's Python requirement conflicts
    /// with the range the root project supports. `version` is the concrete version being ruled
    /// out; `package_range`/`root_range` are carried only as payload for the report.
    pub(crate) fn python_version(package: P, version: VS::V, package_range: VS, root_range: VS) -> Self {
        Self {
            package_terms: SmallMap::One([(package, Term::exact(version))]),
            cause: Cause::PythonVersion {
                package_range,
                root_range,
            },
        }
    }

    /// Create an incompatibility recording that a package version is unusable on some platform.
    pub(crate) fn platform(package: P, version: VS::V, reason: M) -> Self {
        Self {
            package_terms: SmallMap::One([(package, Term::exact(version))]),
            cause: Cause::Platform(reason),
        }
    }

    /// Build an incompatibility from a given dependency.
    pub(crate) fn from_dependency(package: P, versions: VS, dep: (P, VS)) -> Self {
        let (dep_package, dep_range) = dep;
        Self {
            package_terms: SmallMap::Two([
                (package, Term::Positive(versions)),
                (dep_package, Term::Negative(dep_range)),
            ]),
            cause: Cause::Dependency,
        }
    }

    /// If the incompatibility is a dependency incompatibility, returns the two package
    /// identities it relates (the depender, the dependee).
    pub(crate) fn as_dependency(&self) -> Option<(&P, &P)> {
        match self.cause {
            Cause::Dependency => {
                let mut iter = self.package_terms.iter();
                let (p1, _) = iter.next()?;
                let (p2, _) = iter.next()?;
                Some((p1, p2))
            }
            _ => None,
        }
    }

    /// Merge another dependency incompatibility for the same (depender, dependee) pair into
    /// this one by unioning the ranges, provided the causes and package identities line up.
    /// This collapses e.g. "foo 1.0.0 depends on bar ^1" and "foo 1.1.0 depends on bar ^1" into
    /// "foo 1.0.0 || 1.1.0 depends on bar ^1" instead of keeping two incompatibilities.
    pub(crate) fn merge_dependents(&self, other: &Self) -> Option<Self> {
        // It is almost certainly a bug to call this for non-dependency incompatibilities.
        let (p1, p2) = self.as_dependency()?;
        if (p1, p2) != other.as_dependency()? {
            return None;
        }
        let depender_term = self.package_terms.get(p1).unwrap();
        let other_depender_term = other.package_terms.get(p1).unwrap();
        let dependee_term = self.package_terms.get(p2).unwrap();
        let other_dependee_term = other.package_terms.get(p2).unwrap();
        // Only merge when the dependee range (negative term) matches exactly; merge the
        // depender ranges (positive terms).
        if dependee_term != other_dependee_term {
            return None;
        }
        let merged_depender = match (depender_term, other_depender_term) {
            (Term::Positive(a), Term::Positive(b)) => Term::Positive(a.union(b)),
            _ => return None,
        };
        Some(Self {
            package_terms: SmallMap::Two([
                (p1.clone(), merged_depender),
                (p2.clone(), dependee_term.clone()),
            ]),
            cause: Cause::Dependency,
        })
    }

    /// Derive a new, stronger incompatibility summarizing the root cause of a conflict, per
    /// §4.5.2 step 3: the terms of `current` minus the satisfied term, plus the terms of
    /// `satisfier_cause` minus its own term for `package`.
    pub(crate) fn prior_cause(
        current_id: IncompId<P, VS, M>,
        satisfier_cause_id: IncompId<P, VS, M>,
        package: &P,
        store: &Arena<Self>,
    ) -> Self {
        let current = &store[current_id];
        let satisfier_cause = &store[satisfier_cause_id];
        let mut terms: Vec<(P, Term<VS>)> = current
            .package_terms
            .iter()
            .filter(|(p, _)| p != package)
            .cloned()
            .collect();
        terms.extend(
            satisfier_cause
                .package_terms
                .iter()
                .filter(|(p, _)| p != package)
                .cloned(),
        );
        Self::raw_conflict(terms, current_id, satisfier_cause_id)
    }

    fn raw_conflict(
        package_terms: Vec<(P, Term<VS>)>,
        id1: IncompId<P, VS, M>,
        id2: IncompId<P, VS, M>,
    ) -> Self {
        let mut merged: SmallMap<P, Term<VS>> = SmallMap::empty();
        for (package, term) in package_terms {
            merged.insert(package, term, |t1, t2| {
                t1.intersection(&t2)
                    .expect("package terms merged to the empty set: the solver state is corrupt")
            });
        }
        Self {
            package_terms: merged,
            cause: Cause::Conflict(id1, id2),
        }
    }

    /// Check if an incompatibility is terminal: a failure state reachable only if the whole
    /// problem has no solution (§3: zero terms, or a single term about root that holds at the
    /// root version).
    pub(crate) fn is_terminal(&self, root_package: &P, root_version: &VS::V) -> bool {
        match self.package_terms.len() {
            0 => true,
            1 => {
                let (package, term) = self.package_terms.iter().next().unwrap();
                package == root_package && term.contains(root_version)
            }
            _ => false,
        }
    }

    /// Get the ids of the two parent incompatibilities if this one is `Conflict`-derived.
    pub(crate) fn causes(&self) -> Option<(IncompId<P, VS, M>, IncompId<P, VS, M>)> {
        match self.cause {
            Cause::Conflict(id1, id2) => Some((id1, id2)),
            _ => None,
        }
    }

    /// Iterate over the terms of this incompatibility, indexed by package.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&P, &Term<VS>)> {
        self.package_terms.iter().map(|(p, t)| (p, t))
    }

    /// Get the term naming `package`, if any.
    pub(crate) fn get(&self, package: &P) -> Option<&Term<VS>> {
        self.package_terms.get(package)
    }

    /// Number of terms.
    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.package_terms.len()
    }

    /// Check how a set of terms (coming from `terms`, usually the partial solution) relates to
    /// this incompatibility: satisfied if every one of its terms is satisfied, contradicted if
    /// any one is contradicted, and almost-satisfied (naming the one remaining package) if every
    /// term but one is satisfied and that one is merely inconclusive.
    pub(crate) fn relation(&self, mut terms: impl FnMut(&P) -> Option<Term<VS>>) -> Relation<P> {
        let mut relation = Relation::Satisfied;
        for (package, incompat_term) in self.package_terms.iter() {
            match terms(package).map(|term| incompat_term.relation_with(&term)) {
                Some(crate::term::Relation::Satisfied) => {}
                Some(crate::term::Relation::Contradicted) => {
                    return Relation::Contradicted(package.clone());
                }
                None | Some(crate::term::Relation::Inconclusive) => {
                    // If a package has no term in `terms`, its intersection is the same as
                    // `Term::any`, which is the same as an inconclusive relation.
                    if relation == Relation::Satisfied {
                        relation = Relation::AlmostSatisfied(package.clone());
                    } else {
                        relation = Relation::Inconclusive;
                    }
                }
            }
        }
        relation
    }

    // REPORT ###################################################################

    /// Build a [DerivationTree] node for this incompatibility, given the ids already known to
    /// occur more than once in the DAG (`shared_ids`) and the already-built subtrees of earlier
    /// (lower-id, hence topologically-earlier) nodes.
    pub(crate) fn build_derivation_tree(
        id: IncompId<P, VS, M>,
        shared_ids: &std::collections::HashSet<IncompId<P, VS, M>>,
        store: &Arena<Self>,
        precomputed: &Map<IncompId<P, VS, M>, std::sync::Arc<DerivationTree<P, VS, M>>>,
    ) -> DerivationTree<P, VS, M> {
        match &store[id].cause {
            Cause::Conflict(id1, id2) => {
                let (id1, id2) = (*id1, *id2);
                let cause1 = precomputed
                    .get(&id1)
                    .expect("dependencies not built yet")
                    .clone();
                let cause2 = precomputed
                    .get(&id2)
                    .expect("dependencies not built yet")
                    .clone();
                DerivationTree::Derived(Derived {
                    terms: store[id].package_terms.iter().cloned().collect(),
                    shared_id: shared_ids.get(&id).map(|_| id.into_raw()),
                    cause1: Box::new((*cause1).clone()),
                    cause2: Box::new((*cause2).clone()),
                })
            }
            Cause::Root(version) => DerivationTree::External(External::NotRoot(
                store[id].package_terms.iter().next().unwrap().0.clone(),
                version.clone(),
            )),
            Cause::NoVersions => {
                let (package, term) = store[id].package_terms.iter().next().unwrap();
                DerivationTree::External(External::NoVersions(
                    package.clone(),
                    term.unwrap_positive().clone(),
                ))
            }
            Cause::Dependency => {
                let (p1, t1) = store[id].package_terms.iter().next().unwrap();
                let (p2, t2) = store[id].package_terms.iter().nth(1).unwrap();
                DerivationTree::External(External::FromDependencyOf(
                    p1.clone(),
                    t1.unwrap_positive().clone(),
                    p2.clone(),
                    t2.unwrap_negative().clone(),
                ))
            }
            Cause::PackageNotFound(ref reason) => {
                let (package, _) = store[id].package_terms.iter().next().unwrap();
                DerivationTree::External(External::PackageNotFound(package.clone(), reason.clone()))
            }
            Cause::PythonVersion {
                ref package_range,
                ref root_range,
            } => {
                let (package, _) = store[id].package_terms.iter().next().unwrap();
                DerivationTree::External(External::PythonVersion(
                    package.clone(),
                    package_range.clone(),
                    root_range.clone(),
                ))
            }
            Cause::Platform(ref reason) => {
                let (package, _) = store[id].package_terms.iter().next().unwrap();
                DerivationTree::External(External::Platform(package.clone(), reason.clone()))
            }
        }
    }
}

impl<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> Display for Incompatibility<P, VS, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms_vec: Vec<_> = self.package_terms.iter().collect();
        match &self.cause {
            Cause::Dependency => match terms_vec.as_slice() {
                [(p, Term::Positive(r)), (dep, Term::Negative(dep_r))] => {
                    if r.is_any() {
                        write!(f, "every version of {p} depends on {dep} {dep_r}")
                    } else {
                        write!(f, "{p} {r} depends on {dep} {dep_r}")
                    }
                }
                _ => write!(f, "{self:?} is a malformed dependency incompatibility"),
            },
            Cause::NoVersions => {
                let (p, t) = &terms_vec[0];
                write!(f, "no versions of {p} match {}", t.unwrap_positive())
            }
            Cause::Root(_) => {
                let (p, t) = &terms_vec[0];
                write!(f, "{p} is {}", t.negate())
            }
            Cause::PackageNotFound(ref reason) => {
                let (p, _) = &terms_vec[0];
                write!(f, "{p} could not be found: {reason}")
            }
            Cause::PythonVersion {
                ref package_range,
                ref root_range,
            } => {
                let (p, _) = &terms_vec[0];
                write!(
                    f,
                    "{p} requires Python {package_range}, which the project's supported range {root_range} does not fully allow"
                )
            }
            Cause::Platform(ref reason) => {
                let (p, _) = &terms_vec[0];
                write!(f, "{p} requires platform {reason}")
            }
            Cause::Conflict(_, _) => match terms_vec.as_slice() {
                [] => write!(f, "version solving failed"),
                [(p, term)] => {
                    if term.is_positive() {
                        write!(f, "{p} is forbidden")
                    } else {
                        write!(f, "{p} is required")
                    }
                }
                [(p1, t1), (p2, t2)] => write!(f, "{p1} {t1} is incompatible with {p2} {t2}"),
                _ => {
                    let (positives, negatives): (Vec<_>, Vec<_>) =
                        terms_vec.iter().partition(|(_, t)| t.is_positive());
                    let pos = positives
                        .iter()
                        .map(|(p, t)| format!("{p} {t}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let neg = negatives
                        .iter()
                        .map(|(p, t)| format!("{p} {}", t.negate()))
                        .collect::<Vec<_>>()
                        .join(", ");
                    if neg.is_empty() {
                        write!(f, "one of {pos} must be forbidden")
                    } else if pos.is_empty() {
                        write!(f, "{neg} must be selected")
                    } else {
                        write!(f, "if {pos} then not {neg}")
                    }
                }
            },
        }
    }
}
