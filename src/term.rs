// SPDX-License-Identifier: MPL-2.0

//! A term is the fundamental unit of operation of the PubGrub algorithm.
//! It is a positive or negative expression regarding a version constraint.

use std::fmt::{self, Display};

use crate::constraint::VersionConstraint;
use crate::package::Package;
use crate::version::Version;

/// A positive or negative expression regarding a version constraint.
///
/// A positive term is satisfied once a version of its package inside the
/// constraint range is required by the partial solution. A negative term
/// is also satisfiable by not selecting the package at all, which is why
/// a negative term can never guarantee a positive one (see [Term::relation]).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Term<P: Package, V: Version> {
    constraint: VersionConstraint<P, V>,
    positive: bool,
}

/// Set relation between two terms for the same package.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SetRelation {
    /// Every solution satisfying the first term satisfies the second.
    Subset,
    /// No solution satisfies both terms.
    Disjoint,
    /// Some solutions satisfy both terms, some satisfy only one.
    Overlapping,
}

/// Base methods.
impl<P: Package, V: Version> Term<P, V> {
    /// A term expressing that `constraint` holds (positive)
    /// or must not hold (negative).
    pub fn new(constraint: VersionConstraint<P, V>, positive: bool) -> Self {
        Self {
            constraint,
            positive,
        }
    }

    /// A positive term over the given constraint.
    pub fn positive(constraint: VersionConstraint<P, V>) -> Self {
        Self::new(constraint, true)
    }

    /// A negative term over the given constraint.
    pub fn negative(constraint: VersionConstraint<P, V>) -> Self {
        Self::new(constraint, false)
    }

    /// A positive term containing exactly that version.
    pub(crate) fn exact(package: P, version: V) -> Self {
        Self::positive(VersionConstraint::exact(package, version))
    }

    /// The package this term talks about.
    pub fn package(&self) -> &P {
        self.constraint.package()
    }

    /// The underlying constraint, unaffected by the sign of the term.
    pub fn constraint(&self) -> &VersionConstraint<P, V> {
        &self.constraint
    }

    /// Simply check if a term is positive.
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Negate a term.
    /// Evaluation of a negated term always returns
    /// the opposite of the evaluation of the original one.
    pub fn negate(&self) -> Self {
        Self::new(self.constraint.clone(), !self.positive)
    }

    /// Evaluate a term regarding a given choice of version.
    pub(crate) fn contains(&self, v: &V) -> bool {
        self.positive == self.constraint.range().contains(v)
    }

    /// A term that no selection of versions can ever satisfy.
    /// Positive empty requires the package while forbidding every version;
    /// negative `any` forbids selecting the package yet a negative term over
    /// the full range can only be satisfied by an empty requirement.
    pub(crate) fn is_empty(&self) -> bool {
        if self.positive {
            self.constraint.range().is_empty()
        } else {
            self.constraint.range().is_any()
        }
    }
}

/// Set operations with terms.
impl<P: Package, V: Version> Term<P, V> {
    /// Compute the intersection of two terms for the same package.
    /// If one term is a subset of the other, the narrower term is returned
    /// unchanged. The intersection is positive if at least one of the two
    /// terms is positive.
    pub fn intersection(&self, other: &Self) -> Self {
        assert_eq!(
            self.package(),
            other.package(),
            "cannot intersect terms for different packages",
        );
        if self.relation(other) == SetRelation::Subset {
            return self.clone();
        }
        if other.relation(self) == SetRelation::Subset {
            return other.clone();
        }
        let (range, positive) = match (self.positive, other.positive) {
            (true, true) => (
                self.constraint.range().intersection(other.constraint.range()),
                true,
            ),
            (false, false) => (
                self.constraint.range().union(other.constraint.range()),
                false,
            ),
            (true, false) => (
                self.constraint
                    .range()
                    .intersection(&other.constraint.range().complement()),
                true,
            ),
            (false, true) => (
                other
                    .constraint
                    .range()
                    .intersection(&self.constraint.range().complement()),
                true,
            ),
        };
        Self::new(
            VersionConstraint::new(self.package().clone(), range),
            positive,
        )
    }

    /// Compute the difference between two terms: the part of this term
    /// not covered by the other.
    pub fn difference(&self, other: &Self) -> Self {
        self.intersection(&other.negate())
    }

    /// Check if this term satisfies the other: every partial solution
    /// satisfying this term also satisfies the other.
    pub fn satisfies(&self, other: &Self) -> bool {
        self.package() == other.package() && self.relation(other) == SetRelation::Subset
    }

    /// Relation between this term and another term for the same package.
    ///
    /// The relation is not pure set algebra on ranges: a negative term can be
    /// satisfied without selecting the package at all, so it never subsumes a
    /// positive term.
    pub fn relation(&self, other: &Self) -> SetRelation {
        debug_assert_eq!(
            self.package(),
            other.package(),
            "cannot relate terms for different packages",
        );
        let r1 = self.constraint.range();
        let r2 = other.constraint.range();
        match (self.positive, other.positive) {
            (true, true) => {
                if r1.subset_of(r2) {
                    SetRelation::Subset
                } else if r1.is_disjoint(r2) {
                    SetRelation::Disjoint
                } else {
                    SetRelation::Overlapping
                }
            }
            (true, false) => {
                if r1.is_disjoint(r2) {
                    SetRelation::Subset
                } else if r1.subset_of(r2) {
                    SetRelation::Disjoint
                } else {
                    SetRelation::Overlapping
                }
            }
            (false, true) => {
                if r2.subset_of(r1) {
                    SetRelation::Disjoint
                } else {
                    SetRelation::Overlapping
                }
            }
            (false, false) => {
                if r2.subset_of(r1) {
                    SetRelation::Subset
                } else {
                    SetRelation::Overlapping
                }
            }
        }
    }
}

// REPORT ######################################################################

impl<P: Package, V: Version> Display for Term<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.constraint)
        } else {
            write!(f, "not {}", self.constraint)
        }
    }
}

// TESTS #######################################################################
