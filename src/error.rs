// SPDX-License-Identifier: MPL-2.0

//! Handling pubgrub errors.

use thiserror::Error;

use crate::solver::DependencyProvider;
use crate::report::DerivationTree;

/// The derivation tree carried by [`PubGrubError::NoSolution`], parameterized directly by the
/// [`DependencyProvider`] that produced it rather than spelling out `P`, `VS`, `M` separately.
pub type NoSolutionError<DP> = DerivationTree<
    <DP as DependencyProvider>::P,
    <DP as DependencyProvider>::VS,
    <DP as DependencyProvider>::M,
>;

/// Errors that may occur while solving dependencies.
#[derive(Error)]
pub enum PubGrubError<DP: DependencyProvider> {
    /// There is no solution for this set of dependencies.
    #[error("No solution")]
    NoSolution(#[from] NoSolutionError<DP>),

    /// A package was found to depend on itself, which corrupts the incompatibility it would
    /// have produced (a term merged with its own negation is always empty).
    #[error("{package} {version} depends on itself")]
    SelfDependency {
        /// The package that depends on itself.
        package: DP::P,
        /// The version at which the self-dependency was declared.
        version: DP::V,
    },

    /// Error arising when the implementer of
    /// [DependencyProvider](crate::solver::DependencyProvider)
    /// returned an error in the method
    /// [choose_version](crate::solver::DependencyProvider::choose_version).
    #[error("Choosing a version for the current set of potential packages failed")]
    ErrorChoosingPackageVersion(#[source] DP::Err),

    /// Error arising when the implementer of
    /// [DependencyProvider](crate::solver::DependencyProvider)
    /// returned an error in the method
    /// [get_dependencies](crate::solver::DependencyProvider::get_dependencies).
    #[error("Retrieving dependencies of {package} {version} failed")]
    ErrorRetrievingDependencies {
        /// Package whose dependencies we want.
        package: DP::P,
        /// Version of the package for which we want the dependencies.
        version: DP::V,
        /// Error raised by the implementer of
        /// [DependencyProvider](crate::solver::DependencyProvider).
        #[source]
        source: DP::Err,
    },

    /// Error arising when the implementer of [DependencyProvider](crate::solver::DependencyProvider)
    /// returned an error in the method [should_cancel](crate::solver::DependencyProvider::should_cancel).
    #[error("We should cancel")]
    ErrorInShouldCancel(#[source] DP::Err),

    /// Something unexpected happened.
    #[error("{0}")]
    Failure(String),
}

// `#[derive(Debug)]` would add a spurious `DP: Debug` bound on the impl (the derive macro
// bounds every generic parameter, even though every field here is really `DP::P`/`DP::V`/`DP::Err`).
// Those associated types already carry the bounds they need through `DependencyProvider`, so the
// Debug impl is written out by hand instead.
impl<DP: DependencyProvider> std::fmt::Debug for PubGrubError<DP> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSolution(tree) => f.debug_tuple("NoSolution").field(tree).finish(),
            Self::SelfDependency { package, version } => f
                .debug_struct("SelfDependency")
                .field("package", package)
                .field("version", version)
                .finish(),
            Self::ErrorChoosingPackageVersion(err) => {
                f.debug_tuple("ErrorChoosingPackageVersion").field(err).finish()
            }
            Self::ErrorRetrievingDependencies {
                package,
                version,
                source,
            } => f
                .debug_struct("ErrorRetrievingDependencies")
                .field("package", package)
                .field("version", version)
                .field("source", source)
                .finish(),
            Self::ErrorInShouldCancel(err) => {
                f.debug_tuple("ErrorInShouldCancel").field(err).finish()
            }
            Self::Failure(msg) => f.debug_tuple("Failure").field(msg).finish(),
        }
    }
}
