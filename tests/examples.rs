// SPDX-License-Identifier: MPL-2.0

use std::io::Write;

use log::LevelFilter;

use versolve::constraint::VersionConstraint;
use versolve::error::SolverError;
use versolve::incompatibility::Incompatibility;
use versolve::package::Package;
use versolve::range::VersionRange;
use versolve::solver::{resolve, OfflineSource, Source};
use versolve::term::Term;
use versolve::type_aliases::Map;
use versolve::version::{SemanticVersion, Version};

fn init_log() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Trace)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .is_test(true)
        .try_init();
}

fn semver(tuple: (u32, u32, u32)) -> SemanticVersion {
    tuple.into()
}

/// `^major.minor.patch` in semver terms.
fn caret(tuple: (u32, u32, u32)) -> VersionRange<SemanticVersion> {
    VersionRange::between(semver(tuple), semver((tuple.0 + 1, 0, 0)))
}

fn failure_report<P: Package, V: Version>(error: SolverError<P, V>) -> String {
    match error {
        SolverError::NoSolution(failure) => failure.to_string(),
        other => panic!("expected no solution, got {other:?}"),
    }
}

#[test]
fn trivial_success() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies("root", 1, vec![("a", VersionRange::any())]);
    source.add_dependencies("a", 1, vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("a", 1);
    assert_eq!(solution, expected);
}

#[test]
fn transitive_success() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies("root", 1, vec![("a", VersionRange::higher_than(1u32))]);
    source.add_dependencies("a", 2, vec![("b", VersionRange::higher_than(2u32))]);
    source.add_dependencies("b", 1, vec![]);
    source.add_dependencies("b", 2, vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("a", 2);
    expected.insert("b", 2);
    assert_eq!(solution, expected);
}

#[test]
/// The preferred candidate `a 2` requires the missing `c 2`; the solver
/// must learn that, backjump, and settle on `a 1`.
fn backjump_after_missing_version() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies("root", 1, vec![("a", VersionRange::any())]);
    source.add_dependencies("a", 2, vec![("c", VersionRange::exact(2u32))]);
    source.add_dependencies("a", 1, vec![]);
    source.add_dependencies("c", 1, vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("a", 1);
    assert_eq!(solution, expected);
}

#[test]
/// Two constraints on the same package with an empty overlap.
fn unsatisfiable_overlap() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies(
        "root",
        1,
        vec![
            ("a", VersionRange::higher_than(2u32)),
            ("a", VersionRange::strictly_lower_than(2u32)),
        ],
    );
    source.add_dependencies("a", 1, vec![]);
    source.add_dependencies("a", 2, vec![]);
    source.add_dependencies("a", 3, vec![]);

    let report = failure_report(resolve(&source).unwrap_err());
    assert!(report.starts_with("version solving failed:"));
    assert!(report.contains("root = 1 depends on a >= 2"));
    assert!(report.contains("root = 1 depends on a < 2"));
}

#[test]
/// The root constraint is the complement of an interval, which is a union.
/// Both `a 1` and `a 6` are valid; the source-preferred (highest) wins.
fn union_from_complement() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies(
        "root",
        1,
        vec![("a", VersionRange::between(2u32, 5u32).complement())],
    );
    source.add_dependencies("a", 1, vec![]);
    source.add_dependencies("a", 3, vec![]);
    source.add_dependencies("a", 6, vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("a", 6);
    assert_eq!(solution, expected);
}

#[test]
/// Two dependency edges force different exact versions of `shared`.
fn conflict_across_packages() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies(
        "root",
        1,
        vec![("a", VersionRange::any()), ("b", VersionRange::any())],
    );
    source.add_dependencies("a", 1, vec![("shared", VersionRange::exact(1u32))]);
    source.add_dependencies("b", 1, vec![("shared", VersionRange::exact(2u32))]);
    source.add_dependencies("shared", 1, vec![]);
    source.add_dependencies("shared", 2, vec![]);

    let report = failure_report(resolve(&source).unwrap_err());
    assert!(report.starts_with("version solving failed:"));
    assert!(report.contains("a = 1 depends on shared = 1"));
    assert!(report.contains("b = 1 depends on shared = 2"));
}

#[test]
/// A source whose root package has no version at all.
fn no_root_version() {
    init_log();
    let source = OfflineSource::<&str, u32>::new("root");
    let report = failure_report(resolve(&source).unwrap_err());
    assert!(report.contains("no versions satisfy root any"));
}

#[test]
/// <https://github.com/dart-lang/pub/blob/master/doc/solver.md#no-conflicts>
fn no_conflict() {
    init_log();
    let mut source = OfflineSource::<&str, SemanticVersion>::new("root");
    source.add_dependencies("root", semver((1, 0, 0)), vec![("foo", caret((1, 0, 0)))]);
    source.add_dependencies("foo", semver((1, 0, 0)), vec![("bar", caret((1, 0, 0)))]);
    source.add_dependencies("bar", semver((1, 0, 0)), vec![]);
    source.add_dependencies("bar", semver((2, 0, 0)), vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("foo", semver((1, 0, 0)));
    expected.insert("bar", semver((1, 0, 0)));
    assert_eq!(solution, expected);
}

#[test]
/// <https://github.com/dart-lang/pub/blob/master/doc/solver.md#avoiding-conflict-during-decision-making>
fn avoiding_conflict_during_decision_making() {
    init_log();
    let mut source = OfflineSource::<&str, SemanticVersion>::new("root");
    source.add_dependencies(
        "root",
        semver((1, 0, 0)),
        vec![("foo", caret((1, 0, 0))), ("bar", caret((1, 0, 0)))],
    );
    source.add_dependencies("foo", semver((1, 1, 0)), vec![("bar", caret((2, 0, 0)))]);
    source.add_dependencies("foo", semver((1, 0, 0)), vec![]);
    source.add_dependencies("bar", semver((1, 0, 0)), vec![]);
    source.add_dependencies("bar", semver((1, 1, 0)), vec![]);
    source.add_dependencies("bar", semver((2, 0, 0)), vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("foo", semver((1, 0, 0)));
    expected.insert("bar", semver((1, 1, 0)));
    assert_eq!(solution, expected);
}

#[test]
/// <https://github.com/dart-lang/pub/blob/master/doc/solver.md#performing-conflict-resolution>
fn conflict_resolution() {
    init_log();
    let mut source = OfflineSource::<&str, SemanticVersion>::new("root");
    source.add_dependencies(
        "root",
        semver((1, 0, 0)),
        vec![("foo", VersionRange::higher_than(semver((1, 0, 0))))],
    );
    source.add_dependencies("foo", semver((2, 0, 0)), vec![("bar", caret((1, 0, 0)))]);
    source.add_dependencies("foo", semver((1, 0, 0)), vec![]);
    source.add_dependencies("bar", semver((1, 0, 0)), vec![("foo", caret((1, 0, 0)))]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("foo", semver((1, 0, 0)));
    assert_eq!(solution, expected);
}

#[test]
/// <https://github.com/dart-lang/pub/blob/master/doc/solver.md#conflict-resolution-with-a-partial-satisfier>
fn conflict_with_partial_satisfier() {
    init_log();
    let mut source = OfflineSource::<&str, SemanticVersion>::new("root");
    source.add_dependencies(
        "root",
        semver((1, 0, 0)),
        vec![("foo", caret((1, 0, 0))), ("target", caret((2, 0, 0)))],
    );
    source.add_dependencies(
        "foo",
        semver((1, 1, 0)),
        vec![("left", caret((1, 0, 0))), ("right", caret((1, 0, 0)))],
    );
    source.add_dependencies("foo", semver((1, 0, 0)), vec![]);
    source.add_dependencies(
        "left",
        semver((1, 0, 0)),
        vec![("shared", VersionRange::higher_than(semver((1, 0, 0))))],
    );
    source.add_dependencies(
        "right",
        semver((1, 0, 0)),
        vec![("shared", VersionRange::strictly_lower_than(semver((2, 0, 0))))],
    );
    source.add_dependencies("shared", semver((2, 0, 0)), vec![]);
    source.add_dependencies("shared", semver((1, 0, 0)), vec![("target", caret((1, 0, 0)))]);
    source.add_dependencies("target", semver((2, 0, 0)), vec![]);
    source.add_dependencies("target", semver((1, 0, 0)), vec![]);

    let solution = resolve(&source).unwrap();

    let mut expected = Map::default();
    expected.insert("foo", semver((1, 0, 0)));
    expected.insert("target", semver((2, 0, 0)));
    assert_eq!(solution, expected);
}

#[test]
fn same_result_on_repeated_runs() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("a");
    source.add_dependencies("c", 0, vec![]);
    source.add_dependencies("c", 2, vec![]);
    source.add_dependencies("b", 0, vec![]);
    source.add_dependencies("b", 1, vec![("c", VersionRange::between(0u32, 1u32))]);
    source.add_dependencies(
        "a",
        0,
        vec![("b", VersionRange::any()), ("c", VersionRange::any())],
    );

    let first = resolve(&source).unwrap();
    for _ in 0..10 {
        assert_eq!(first, resolve(&source).unwrap());
    }
}

/// An [OfflineSource] that additionally declares `a = 2` and `b = 2`
/// incompatible, a shape [Incompatibility::from_dependency] cannot express.
struct ConflictSource {
    inner: OfflineSource<&'static str, u32>,
}

impl Source<&'static str, u32> for ConflictSource {
    fn root(&self) -> &'static str {
        self.inner.root()
    }

    fn versions_for(
        &self,
        package: &&'static str,
        range: &VersionRange<u32>,
    ) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
        self.inner.versions_for(package, range)
    }

    fn incompatibilities_for(
        &self,
        package: &&'static str,
        version: &u32,
    ) -> Result<Vec<Incompatibility<&'static str, u32>>, Box<dyn std::error::Error>> {
        let mut incompatibilities = self.inner.incompatibilities_for(package, version)?;
        if *package == "a" && *version == 2 {
            incompatibilities.push(Incompatibility::custom_terms([
                Term::positive(VersionConstraint::exact("a", 2)),
                Term::positive(VersionConstraint::exact("b", 2)),
            ]));
        }
        Ok(incompatibilities)
    }
}

#[test]
/// A source-declared incompatibility between two packages forces the
/// solver away from the preferred candidate.
fn custom_incompatibility() {
    init_log();
    let mut inner = OfflineSource::<&str, u32>::new("root");
    inner.add_dependencies(
        "root",
        1,
        vec![("a", VersionRange::any()), ("b", VersionRange::any())],
    );
    inner.add_dependencies("a", 1, vec![]);
    inner.add_dependencies("a", 2, vec![]);
    inner.add_dependencies("b", 1, vec![]);
    inner.add_dependencies("b", 2, vec![]);
    let source = ConflictSource { inner };

    let solution = resolve(&source).unwrap();

    // b 2 is decided first, so the conflict pushes a down to version 1.
    let mut expected = Map::default();
    expected.insert("a", 1);
    expected.insert("b", 2);
    assert_eq!(solution, expected);
}

#[test]
/// An explicit conflict is a dependency on the complement of the
/// conflicting range.
fn explicit_conflict() {
    init_log();
    let mut source = OfflineSource::<&str, u32>::new("root");
    source.add_dependencies(
        "root",
        1,
        vec![("a", VersionRange::any()), ("b", VersionRange::any())],
    );
    // a 2 conflicts with every b >= 2.
    source.add_dependencies(
        "a",
        2,
        vec![("b", VersionRange::higher_than(2u32).complement())],
    );
    source.add_dependencies("a", 1, vec![]);
    source.add_dependencies("b", 1, vec![]);
    source.add_dependencies("b", 3, vec![]);

    let solution = resolve(&source).unwrap();

    // b 3 is preferred, which pushes a down to version 1.
    let mut expected = Map::default();
    expected.insert("a", 1);
    expected.insert("b", 3);
    assert_eq!(solution, expected);
}
