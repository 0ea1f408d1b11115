// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different packages
//! that should never be satisfied all together.

use std::fmt::{self, Display};

use smallvec::SmallVec;

use crate::constraint::VersionConstraint;
use crate::internal::arena::Id;
use crate::package::Package;
use crate::term::Term;
use crate::version::Version;

/// Identifier of an incompatibility in the solver's store.
pub(crate) type IncompId<P, V> = Id<Incompatibility<P, V>>;

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
/// during conflict resolution. More about all this in
/// [PubGrub documentation](https://github.com/dart-lang/pub/blob/master/doc/solver.md#incompatibility).
#[derive(Debug, Clone)]
pub struct Incompatibility<P: Package, V: Version> {
    terms: SmallVec<[Term<P, V>; 2]>,
    cause: Cause<P, V>,
}

/// How an incompatibility came to be.
#[derive(Debug, Clone)]
pub(crate) enum Cause<P: Package, V: Version> {
    /// The synthetic goal seeded at solver start: the root package
    /// must not stay unresolved.
    Root,
    /// Emitted by the source for a dependency that `depender` at `version`
    /// declares.
    Dependency {
        depender: P,
        version: V,
    },
    /// No candidate version satisfies the constraint of the single term.
    NoVersions,
    /// Declared as-is by the source, outside the dependency shape.
    Custom,
    /// Learned during conflict resolution from two prior incompatibilities.
    Conflict {
        conflict: IncompId<P, V>,
        other: IncompId<P, V>,
    },
}

/// Classification of an incompatibility against a partial solution,
/// term by term.
#[derive(Debug, Clone)]
pub(crate) enum Relation<P: Package, V: Version> {
    /// All terms are satisfied: the incompatibility is violated.
    Satisfied,
    /// All terms but one are satisfied, and that one is inconclusive.
    /// The partial solution must derive its negation.
    AlmostSatisfied(Term<P, V>),
    /// At least one term is already contradicted, the incompatibility
    /// can never trigger.
    Contradicted,
    /// Anything else: nothing can be deduced yet.
    Inconclusive,
}

impl<P: Package, V: Version> Incompatibility<P, V> {
    /// Create the seed incompatibility: the root package must not stay
    /// unresolved, i.e. `{ not (root any) }`.
    pub(crate) fn root(root_package: P) -> Self {
        Self::new(
            [Term::negative(VersionConstraint::any(root_package))],
            Cause::Root,
        )
    }

    /// Build an incompatibility from a given dependency:
    /// selecting `package` at `version` requires `dependency`,
    /// i.e. `{ package = version, not dependency }`.
    ///
    /// An explicit conflict can be expressed as a dependency on the
    /// complement of the conflicting range.
    pub fn from_dependency(package: P, version: V, dependency: VersionConstraint<P, V>) -> Self {
        let this_version = Term::exact(package.clone(), version.clone());
        Self::new(
            [this_version, Term::negative(dependency)],
            Cause::Dependency {
                depender: package,
                version,
            },
        )
    }

    /// Create an incompatibility to remember that no candidate version
    /// satisfies the given requirement.
    pub(crate) fn no_versions(requirement: Term<P, V>) -> Self {
        debug_assert!(requirement.is_positive());
        Self::new([requirement], Cause::NoVersions)
    }

    /// An incompatibility made of arbitrary terms, for sources that need to
    /// express more than the dependency shape, such as a conflict spanning
    /// several packages. Terms for the same package are merged as usual.
    pub fn custom_terms(terms: impl IntoIterator<Item = Term<P, V>>) -> Self {
        Self::new(terms, Cause::Custom)
    }

    /// An incompatibility learned during conflict resolution,
    /// caused by the two given prior incompatibilities.
    pub(crate) fn derived(
        terms: impl IntoIterator<Item = Term<P, V>>,
        conflict: IncompId<P, V>,
        other: IncompId<P, V>,
    ) -> Self {
        Self::new(terms, Cause::Conflict { conflict, other })
    }

    /// Collect terms, merging the ones talking about the same package.
    /// Terms that end up satisfied by any partial solution cannot
    /// constrain a conflict and are dropped.
    fn new(terms: impl IntoIterator<Item = Term<P, V>>, cause: Cause<P, V>) -> Self {
        let mut merged: SmallVec<[Term<P, V>; 2]> = SmallVec::new();
        for term in terms {
            match merged.iter_mut().find(|t| t.package() == term.package()) {
                Some(existing) => *existing = existing.intersection(&term),
                None => merged.push(term),
            }
        }
        merged.retain(|term| !(!term.is_positive() && term.constraint().range().is_empty()));
        Self {
            terms: merged,
            cause,
        }
    }

    /// The merged terms, in first-mention order.
    pub fn terms(&self) -> &[Term<P, V>] {
        &self.terms
    }

    /// How this incompatibility was produced.
    pub(crate) fn cause(&self) -> &Cause<P, V> {
        &self.cause
    }

    /// Check if an incompatibility should mark the end of the algorithm:
    /// either it has no term left, or its only term positively constrains
    /// the root package.
    pub(crate) fn is_failure(&self, root_package: &P) -> bool {
        match self.terms.as_slice() {
            [] => true,
            [term] => term.is_positive() && term.package() == root_package,
            _ => false,
        }
    }

    /// Classify each term against a partial solution.
    pub(crate) fn relation(
        &self,
        mut term_relation: impl FnMut(&Term<P, V>) -> crate::term::SetRelation,
    ) -> Relation<P, V> {
        let mut relation = Relation::Satisfied;
        for term in self.terms() {
            match term_relation(term) {
                crate::term::SetRelation::Subset => {}
                crate::term::SetRelation::Disjoint => return Relation::Contradicted,
                crate::term::SetRelation::Overlapping => match relation {
                    Relation::Satisfied => relation = Relation::AlmostSatisfied(term.clone()),
                    _ => return Relation::Inconclusive,
                },
            }
        }
        relation
    }
}

// REPORT ######################################################################

impl<P: Package, V: Version> Display for Incompatibility<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

// TESTS #######################################################################

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::arena::Arena;
    use crate::range::VersionRange;

    /// Two ids to stand in for the parents of a derived incompatibility.
    fn dummy_causes() -> (IncompId<&'static str, u32>, IncompId<&'static str, u32>) {
        let mut store: Arena<Incompatibility<&str, u32>> = Arena::new();
        let a = store.alloc(Incompatibility::root("root"));
        let b = store.alloc(Incompatibility::root("root"));
        (a, b)
    }

    #[test]
    fn dependency_incompatibility_has_two_terms() {
        let incompat = Incompatibility::from_dependency(
            "foo",
            1u32,
            VersionConstraint::new("bar", VersionRange::higher_than(2u32)),
        );
        assert_eq!(incompat.terms().len(), 2);
        assert_eq!(incompat.to_string(), "foo = 1, not bar >= 2");
        assert!(!incompat.is_failure(&"root"));
    }

    #[test]
    fn same_package_terms_are_merged() {
        let a = Term::positive(VersionConstraint::new(
            "foo",
            VersionRange::<u32>::higher_than(2u32),
        ));
        let b = Term::positive(VersionConstraint::new(
            "foo",
            VersionRange::strictly_lower_than(5u32),
        ));
        let (cause, other) = dummy_causes();
        let incompat = Incompatibility::derived([a, b], cause, other);
        assert_eq!(incompat.terms().len(), 1);
        assert_eq!(incompat.to_string(), "foo >= 2, < 5");
    }

    #[test]
    fn vacuous_terms_are_dropped() {
        // `not (foo none)` holds in every partial solution.
        let vacuous = Term::negative(VersionConstraint::new("foo", VersionRange::<u32>::empty()));
        let (cause, other) = dummy_causes();
        let incompat = Incompatibility::derived([vacuous], cause, other);
        assert!(incompat.terms().is_empty());
        assert!(incompat.is_failure(&"root"));
    }

    #[test]
    fn custom_terms_merge_like_any_other() {
        let incompat = Incompatibility::custom_terms([
            Term::positive(VersionConstraint::exact("a", 2u32)),
            Term::positive(VersionConstraint::exact("b", 2u32)),
            Term::positive(VersionConstraint::new("b", VersionRange::higher_than(1u32))),
        ]);
        assert_eq!(incompat.terms().len(), 2);
        assert_eq!(incompat.to_string(), "a = 2, b = 2");
    }

    #[test]
    fn single_positive_root_term_is_failure() {
        let incompat =
            Incompatibility::no_versions(Term::positive(VersionConstraint::<&str, u32>::any("root")));
        assert!(incompat.is_failure(&"root"));
        assert!(!incompat.is_failure(&"foo"));
    }
}
