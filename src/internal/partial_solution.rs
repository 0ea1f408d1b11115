// SPDX-License-Identifier: MPL-2.0

//! The partial solution is the current state
//! of the solution being built by the algorithm.

use std::hash::BuildHasherDefault;

use log::debug;
use rustc_hash::FxHasher;

use crate::constraint::VersionConstraint;
use crate::incompatibility::IncompId;
use crate::internal::assignment::Assignment;
use crate::package::Package;
use crate::term::{SetRelation, Term};
use crate::type_aliases::Map;
use crate::version::Version;

/// Insertion-ordered map, so that the unsatisfied set iterates in
/// first-required order regardless of hash layout.
type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// The partial solution is the current state
/// of the solution being built by the algorithm.
/// It is composed of a succession of assignments,
/// defined as either decisions or derivations, called the trail.
/// The trail is append-only; only backtracking truncates it to a prefix.
#[derive(Debug, Clone)]
pub struct PartialSolution<P: Package, V: Version> {
    /// Ordered assignments.
    trail: Vec<Assignment<P, V>>,
    /// For each package, the intersection of all terms asserted about it,
    /// recomputable from the trail at any point.
    cumulative: FxIndexMap<P, Term<P, V>>,
    /// Versions decided so far.
    decisions: Map<P, V>,
    decision_level: u32,
}

impl<P: Package, V: Version> PartialSolution<P, V> {
    /// Initialize an empty partial solution.
    pub fn empty() -> Self {
        Self {
            trail: Vec::new(),
            cumulative: FxIndexMap::default(),
            decisions: Map::default(),
            decision_level: 0,
        }
    }

    /// Add a decision to the partial solution,
    /// opening a new decision level.
    pub fn decide(&mut self, package: P, version: V) {
        debug_assert!(
            !self.decisions.contains_key(&package),
            "{package} already has a decision",
        );
        debug_assert!(
            self.cumulative
                .get(&package)
                .map_or(true, |term| term.contains(&version)),
            "{package} = {version} is outside the cumulative term",
        );
        self.decision_level += 1;
        debug!("decide {package} = {version} (level {})", self.decision_level);
        let assignment = Assignment::decision(
            package.clone(),
            version.clone(),
            self.decision_level,
            self.trail.len(),
        );
        self.merge_cumulative(&assignment.term());
        self.trail.push(assignment);
        self.decisions.insert(package, version);
    }

    /// Add a derivation to the partial solution,
    /// at the current decision level.
    pub fn derive(&mut self, term: Term<P, V>, cause: IncompId<P, V>) {
        debug!("derive {term} (level {})", self.decision_level);
        self.merge_cumulative(&term);
        let index = self.trail.len();
        self.trail
            .push(Assignment::derivation(term, cause, self.decision_level, index));
    }

    fn merge_cumulative(&mut self, term: &Term<P, V>) {
        use indexmap::map::Entry;
        match self.cumulative.entry(term.package().clone()) {
            Entry::Occupied(mut entry) => {
                let merged = entry.get().intersection(term);
                entry.insert(merged);
            }
            Entry::Vacant(entry) => {
                entry.insert(term.clone());
            }
        }
    }

    /// Current decision level: 0 before any decision,
    /// incremented by each decision.
    pub fn decision_level(&self) -> u32 {
        self.decision_level
    }

    /// Relation between everything known about the term's package
    /// and the term itself. Overlapping if nothing is known yet.
    pub fn relation(&self, term: &Term<P, V>) -> SetRelation {
        match self.cumulative.get(term.package()) {
            None => SetRelation::Overlapping,
            Some(cumulative) => cumulative.relation(term),
        }
    }

    /// Whether the partial solution already guarantees the term.
    pub fn satisfies(&self, term: &Term<P, V>) -> bool {
        self.relation(term) == SetRelation::Subset
    }

    /// The earliest assignment in the trail such that the term is satisfied
    /// by the trail up to and including that assignment.
    ///
    /// Computed by replaying the assignments of the term's package in order,
    /// intersecting them until the running conjunction becomes a subset of
    /// the term. Calling this for a term the partial solution does not
    /// satisfy is a bug in the solver.
    pub fn satisfier(&self, term: &Term<P, V>) -> &Assignment<P, V> {
        let mut accumulated: Option<Term<P, V>> = None;
        for assignment in &self.trail {
            if assignment.package() != term.package() {
                continue;
            }
            let accumulated_next = match &accumulated {
                None => assignment.term(),
                Some(prev) => prev.intersection(&assignment.term()),
            };
            if accumulated_next.satisfies(term) {
                return assignment;
            }
            accumulated = Some(accumulated_next);
        }
        let trail: Vec<String> = self.trail.iter().map(|a| a.to_string()).collect();
        panic!(
            "no satisfier for {term} in the trail:\n  {}",
            trail.join("\n  "),
        );
    }

    /// Backtrack the partial solution to a given decision level:
    /// truncate the trail to the last assignment at a decision level
    /// lower or equal, and recompute the per-package view.
    pub fn backtrack(&mut self, decision_level: u32) {
        debug!("backtrack to level {decision_level}");
        let index = self
            .trail
            .iter()
            .position(|a| a.decision_level() > decision_level)
            .unwrap_or(self.trail.len());
        self.trail.truncate(index);
        self.decision_level = decision_level;
        // Recompute the caches by folding the surviving prefix.
        let trail = std::mem::take(&mut self.trail);
        self.cumulative.clear();
        self.decisions.clear();
        for assignment in &trail {
            self.merge_cumulative(&assignment.term());
            if let Assignment::Decision {
                package, version, ..
            } = assignment
            {
                self.decisions.insert(package.clone(), version.clone());
            }
        }
        self.trail = trail;
    }

    /// Constraints of the packages that are required (their cumulative term
    /// is positive) but have no decision yet, in first-required order.
    pub fn unsatisfied(&self) -> impl Iterator<Item = &VersionConstraint<P, V>> {
        self.cumulative
            .iter()
            .filter(|(package, term)| {
                term.is_positive() && !self.decisions.contains_key(*package)
            })
            .map(|(_, term)| term.constraint())
    }

    /// Mapping from package to the decided version, if any.
    pub fn decisions(&self) -> &Map<P, V> {
        &self.decisions
    }
}

// TESTS #######################################################################

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incompatibility::Incompatibility;
    use crate::internal::arena::Arena;
    use crate::range::VersionRange;

    fn term(package: &'static str, range: VersionRange<u32>, positive: bool) -> Term<&'static str, u32> {
        Term::new(VersionConstraint::new(package, range), positive)
    }

    fn dummy_cause(
        store: &mut Arena<Incompatibility<&'static str, u32>>,
    ) -> IncompId<&'static str, u32> {
        store.alloc(Incompatibility::root("root"))
    }

    #[test]
    fn satisfier_is_the_earliest_tipping_assignment() {
        let mut store = Arena::new();
        let cause = dummy_cause(&mut store);
        let mut solution = PartialSolution::empty();
        solution.derive(term("foo", VersionRange::higher_than(1u32), true), cause);
        solution.derive(term("foo", VersionRange::strictly_lower_than(5u32), true), cause);
        solution.derive(term("foo", VersionRange::strictly_lower_than(4u32), true), cause);

        // `foo >= 1` is satisfied by the very first assignment.
        let wanted = term("foo", VersionRange::higher_than(1u32), true);
        assert_eq!(solution.satisfier(&wanted).index(), 0);

        // `foo < 5` only once the second assignment narrowed the conjunction.
        let wanted = term("foo", VersionRange::strictly_lower_than(5u32), true);
        assert_eq!(solution.satisfier(&wanted).index(), 1);
    }

    #[test]
    #[should_panic]
    fn satisfier_panics_when_never_satisfied() {
        let mut store = Arena::new();
        let cause = dummy_cause(&mut store);
        let mut solution = PartialSolution::empty();
        solution.derive(term("foo", VersionRange::higher_than(1u32), true), cause);
        let wanted = term("foo", VersionRange::strictly_lower_than(1u32), true);
        let _ = solution.satisfier(&wanted);
    }

    #[test]
    fn backtrack_recomputes_the_package_view() {
        let mut store = Arena::new();
        let cause = dummy_cause(&mut store);
        let mut solution = PartialSolution::empty();
        solution.derive(term("foo", VersionRange::any(), true), cause);
        solution.decide("foo", 3u32);
        solution.derive(term("bar", VersionRange::any(), true), cause);
        solution.decide("bar", 1u32);
        assert_eq!(solution.decision_level(), 2);
        assert_eq!(solution.unsatisfied().count(), 0);

        solution.backtrack(1);
        assert_eq!(solution.decision_level(), 1);
        assert_eq!(solution.decisions().get("foo"), Some(&3u32));
        assert_eq!(solution.decisions().get("bar"), None);
        // bar is required again after the truncation.
        let unsatisfied: Vec<_> = solution.unsatisfied().collect();
        assert_eq!(unsatisfied.len(), 1);
        assert_eq!(*unsatisfied[0].package(), "bar");
    }

    #[test]
    fn relation_is_overlapping_for_unknown_packages() {
        let solution = PartialSolution::<&str, u32>::empty();
        let wanted = term("foo", VersionRange::any(), true);
        assert_eq!(solution.relation(&wanted), SetRelation::Overlapping);
        assert!(!solution.satisfies(&wanted));
    }
}
