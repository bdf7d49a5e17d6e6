// SPDX-License-Identifier: MPL-2.0

use pubgrub_core::{resolve, Map, NumberVersion, OfflineDependencyProvider, PubGrubError, Range};

type NumVS = Range<NumberVersion>;

#[test]
fn same_result_on_repeated_runs() {
    let mut dependency_provider = OfflineDependencyProvider::<_, NumVS>::new();

    dependency_provider.add_dependencies("c", 0, []);
    dependency_provider.add_dependencies("c", 2, []);
    dependency_provider.add_dependencies("b", 0, []);
    dependency_provider.add_dependencies("b", 1, [("c", Range::between(0, 1))]);

    dependency_provider.add_dependencies("a", 0, [("b", Range::full()), ("c", Range::full())]);

    let name = "a";
    let ver = NumberVersion(0);
    let one = resolve(&dependency_provider, name, ver);
    for _ in 0..10 {
        match (&one, &resolve(&dependency_provider, name, ver)) {
            (Ok(l), Ok(r)) => assert_eq!(l, r),
            _ => panic!("not the same result"),
        }
    }
}

#[test]
fn should_always_find_a_satisfier() {
    let mut dependency_provider = OfflineDependencyProvider::<_, NumVS>::new();
    dependency_provider.add_dependencies("a", 0, [("b", Range::empty())]);
    assert!(matches!(
        resolve(&dependency_provider, "a", NumberVersion(0)),
        Err(PubGrubError::NoSolution(_))
    ));

    dependency_provider.add_dependencies("c", 0, [("a", Range::full())]);
    assert!(matches!(
        resolve(&dependency_provider, "c", NumberVersion(0)),
        Err(PubGrubError::NoSolution(_))
    ));
}

#[test]
fn cannot_depend_on_self() {
    let mut dependency_provider = OfflineDependencyProvider::<_, NumVS>::new();
    dependency_provider.add_dependencies("a", 0, [("a", Range::full())]);
    assert!(matches!(
        resolve(&dependency_provider, "a", NumberVersion(0)),
        Err(PubGrubError::SelfDependency { .. })
    ));
}

#[test]
fn double_choices() {
    // a0 depends on b and c
    // b0 depends on d0, b1 depends on d1 (missing)
    // c0 has no dep, c1 depends on d2 (missing)
    // d0 has no dep
    //
    // Only a0, b0, c0, d0 forms a valid solution.
    let mut dependency_provider = OfflineDependencyProvider::<_, NumVS>::new();
    dependency_provider.add_dependencies("a", 0, [("b", Range::full()), ("c", Range::full())]);
    dependency_provider.add_dependencies("b", 0, [("d", Range::singleton(0))]);
    dependency_provider.add_dependencies("b", 1, [("d", Range::singleton(1))]);
    dependency_provider.add_dependencies("c", 0, []);
    dependency_provider.add_dependencies("c", 1, [("d", Range::singleton(2))]);
    dependency_provider.add_dependencies("d", 0, []);

    let mut expected_solution = Map::default();
    expected_solution.insert("a", NumberVersion(0));
    expected_solution.insert("b", NumberVersion(0));
    expected_solution.insert("c", NumberVersion(0));
    expected_solution.insert("d", NumberVersion(0));

    let computed_solution = resolve(&dependency_provider, "a", NumberVersion(0)).unwrap();
    assert_eq!(expected_solution, computed_solution.packages);
}

#[test]
fn attempted_solutions_counts_backjumps() {
    // A conflict forces at least one backjump: b must fall back from 1 to 0 once c's
    // constraint rules out the combination with b 1.
    let mut dependency_provider = OfflineDependencyProvider::<_, NumVS>::new();
    dependency_provider.add_dependencies("a", 0, [("b", Range::full()), ("c", Range::full())]);
    dependency_provider.add_dependencies("b", 0, []);
    dependency_provider.add_dependencies("b", 1, [("c", Range::singleton(1))]);
    dependency_provider.add_dependencies("c", 0, []);

    let computed_solution = resolve(&dependency_provider, "a", NumberVersion(0)).unwrap();
    assert!(computed_solution.attempted_solutions >= 1);
}
