// SPDX-License-Identifier: MPL-2.0

//! End-to-end scenarios lifted from the seed-test list: an empty root, a simple single
//! dependency, a shared transitive dependency, an explicit version conflict with its report
//! text, a conflict that forces a backtrack, and a Python-requirement conflict.

use std::convert::Infallible;

use pubgrub_core::{
    resolve, DefaultStringReporter, Dependencies, DependencyProvider, Map, NumberVersion,
    OfflineDependencyProvider, PubGrubError, Range, Reporter,
};

type NumVS = Range<NumberVersion>;

#[test]
fn empty_root_has_no_dependencies() {
    let dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    let solution = resolve(&dependency_provider, "root", NumberVersion(1)).unwrap();
    assert!(solution.packages.is_empty());
    assert_eq!(solution.attempted_solutions, 1);
}

#[test]
fn simple_dependency_picks_latest_in_range() {
    let mut dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    dependency_provider.add_dependencies(
        "root",
        1,
        [("a", Range::between(NumberVersion(1), NumberVersion(2)))],
    );
    dependency_provider.add_dependencies("a", 0, []);
    dependency_provider.add_dependencies("a", 1, []);

    let solution = resolve(&dependency_provider, "root", 1).unwrap();
    let mut expected = Map::default();
    expected.insert("root", NumberVersion(1));
    expected.insert("a", NumberVersion(1));
    assert_eq!(solution.packages, expected);
}

#[test]
fn shared_transitive_dependency_picks_a_version_both_accept() {
    let mut dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    dependency_provider.add_dependencies(
        "root",
        1,
        [("a", Range::full()), ("b", Range::full())],
    );
    dependency_provider.add_dependencies(
        "a",
        1,
        [("c", Range::between(NumberVersion(1), NumberVersion(2)))],
    );
    dependency_provider.add_dependencies(
        "b",
        1,
        [("c", Range::higher_than(NumberVersion(1)))],
    );
    dependency_provider.add_dependencies("c", 0, []);
    dependency_provider.add_dependencies("c", 1, []);

    let solution = resolve(&dependency_provider, "root", 1).unwrap();
    assert_eq!(solution.packages.get("c"), Some(&NumberVersion(1)));
}

#[test]
fn conflicting_ranges_fail_with_an_explanatory_report() {
    let mut dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    dependency_provider.add_dependencies(
        "root",
        1,
        [("a", Range::full()), ("b", Range::full())],
    );
    dependency_provider.add_dependencies(
        "a",
        1,
        [("c", Range::strictly_lower_than(NumberVersion(2)))],
    );
    dependency_provider.add_dependencies(
        "b",
        1,
        [("c", Range::higher_than(NumberVersion(2)))],
    );
    dependency_provider.add_dependencies("c", 1, []);
    dependency_provider.add_dependencies("c", 2, []);

    match resolve(&dependency_provider, "root", 1) {
        Err(PubGrubError::NoSolution(tree)) => {
            let report = DefaultStringReporter::report(&tree);
            assert!(report.contains('a'));
            assert!(report.contains('b'));
            assert!(report.contains("depends on"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn conflict_forces_a_backtrack_to_an_earlier_decision() {
    // a 1.5.0 requires x ^2.0, a 1.4.0 requires x ^1.0; b forces x ^1.0, so the solver must
    // backjump off a 1.5.0 and settle on a 1.4.0.
    let mut dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    dependency_provider.add_dependencies(
        "root",
        1,
        [
            ("a", Range::between(NumberVersion(14), NumberVersion(16))),
            ("b", Range::full()),
        ],
    );
    dependency_provider.add_dependencies(
        "a",
        15,
        [("x", Range::between(NumberVersion(2), NumberVersion(3)))],
    );
    dependency_provider.add_dependencies(
        "a",
        14,
        [("x", Range::between(NumberVersion(1), NumberVersion(2)))],
    );
    dependency_provider.add_dependencies(
        "b",
        1,
        [("x", Range::between(NumberVersion(1), NumberVersion(2)))],
    );
    dependency_provider.add_dependencies("x", 1, []);
    dependency_provider.add_dependencies("x", 2, []);

    let solution = resolve(&dependency_provider, "root", 1).unwrap();
    assert_eq!(solution.packages.get("a"), Some(&NumberVersion(14)));
    assert_eq!(solution.packages.get("x"), Some(&NumberVersion(1)));
}

/// A thin wrapper around [`OfflineDependencyProvider`] that additionally answers
/// `python_requirement`/`root_python_range`, exercising the ambient Python-conflict machinery
/// that `OfflineDependencyProvider` itself never produces on its own.
struct PythonAwareProvider {
    inner: OfflineDependencyProvider<&'static str, NumVS>,
    root_python: NumVS,
    python_requirements: Map<(&'static str, NumberVersion), NumVS>,
}

impl DependencyProvider for PythonAwareProvider {
    type P = &'static str;
    type V = NumberVersion;
    type VS = NumVS;
    type M = String;
    type Err = Infallible;
    type Priority = <OfflineDependencyProvider<&'static str, NumVS> as DependencyProvider>::Priority;

    fn choose_version(
        &self,
        package: &Self::P,
        range: &Self::VS,
    ) -> Result<Option<Self::V>, Self::Err> {
        self.inner.choose_version(package, range)
    }

    fn prioritize(&self, package: &Self::P, range: &Self::VS) -> Self::Priority {
        self.inner.prioritize(package, range)
    }

    fn get_dependencies(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Dependencies<Self::P, Self::VS, Self::M>, Self::Err> {
        self.inner.get_dependencies(package, version)
    }

    fn python_requirement(&self, package: &Self::P, version: &Self::V) -> Option<Self::VS> {
        self.python_requirements
            .get(&(*package, *version))
            .cloned()
    }

    fn root_python_range(&self) -> Option<Self::VS> {
        Some(self.root_python.clone())
    }
}

#[test]
fn python_requirement_conflict_fails_with_a_preamble() {
    let mut inner = OfflineDependencyProvider::<&str, NumVS>::new();
    inner.add_dependencies("root", 1, [("a", Range::full())]);
    inner.add_dependencies("a", 1, []);

    let mut python_requirements = Map::default();
    // "a" requires a Python range strictly above what the root project supports.
    python_requirements.insert(
        ("a", NumberVersion(1)),
        Range::higher_than(NumberVersion(10)),
    );

    let provider = PythonAwareProvider {
        inner,
        root_python: Range::strictly_lower_than(NumberVersion(10)),
        python_requirements,
    };

    match resolve(&provider, "root", NumberVersion(1)) {
        Err(PubGrubError::NoSolution(tree)) => {
            let conflicts = tree.python_conflicts();
            assert_eq!(conflicts.len(), 1);
            assert_eq!(*conflicts[0].0, "a");
            let report = DefaultStringReporter::report(&tree);
            assert!(report.contains("Python requirement conflicts"));
            assert!(report.contains("requires Python"));
        }
        other => panic!("expected a Python-requirement failure, got {other:?}"),
    }
}

#[test]
fn locked_version_is_preferred_over_latest() {
    let mut dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    dependency_provider.add_dependencies("root", 1, [("a", Range::full())]);
    dependency_provider.add_dependencies("a", 1, []);
    dependency_provider.add_dependencies("a", 2, []);
    dependency_provider.add_dependencies("a", 3, []);
    dependency_provider.set_locked("a", 2);

    let solution = resolve(&dependency_provider, "root", 1).unwrap();
    assert_eq!(solution.packages.get("a"), Some(&NumberVersion(2)));
}

#[test]
fn use_latest_bypasses_a_lock() {
    let mut dependency_provider = OfflineDependencyProvider::<&str, NumVS>::new();
    dependency_provider.add_dependencies("root", 1, [("a", Range::full())]);
    dependency_provider.add_dependencies("a", 1, []);
    dependency_provider.add_dependencies("a", 2, []);
    dependency_provider.add_dependencies("a", 3, []);
    dependency_provider.set_locked("a", 2);
    dependency_provider.set_use_latest("a");

    let solution = resolve(&dependency_provider, "root", 1).unwrap();
    assert_eq!(solution.packages.get("a"), Some(&NumberVersion(3)));
}
