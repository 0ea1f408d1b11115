// SPDX-License-Identifier: MPL-2.0

//! Core state and functions of the PubGrub algorithm:
//! unit propagation and conflict resolution with backjumping.

use log::debug;

use crate::error::SolverError;
use crate::incompatibility::{IncompId, Incompatibility, Relation};
use crate::internal::arena::Arena;
use crate::internal::partial_solution::PartialSolution;
use crate::package::Package;
use crate::report::SolveFailure;
use crate::term::Term;
use crate::type_aliases::Map;
use crate::version::Version;

/// Current state of the PubGrub algorithm.
pub struct State<P: Package, V: Version> {
    root: P,

    /// The store is the reference storage for all incompatibilities,
    /// including the intermediate ones derived during conflict resolution.
    /// Causes refer to positions in the store.
    incompatibility_store: Arena<Incompatibility<P, V>>,

    /// For each package, the store ids of the incompatibilities
    /// with a term for that package, in insertion order.
    incompatibilities: Map<P, Vec<IncompId<P, V>>>,

    /// Partial solution.
    pub partial_solution: PartialSolution<P, V>,
}

impl<P: Package, V: Version> State<P, V> {
    /// Initialization of PubGrub state, seeded with the incompatibility
    /// stating that the root package must not stay unresolved.
    pub fn init(root: P) -> Self {
        let mut state = Self {
            root: root.clone(),
            incompatibility_store: Arena::new(),
            incompatibilities: Map::default(),
            partial_solution: PartialSolution::empty(),
        };
        state.add_incompatibility(Incompatibility::root(root));
        state
    }

    /// The root package this state was seeded with.
    pub fn root(&self) -> &P {
        &self.root
    }

    /// Add an incompatibility to the state and index it
    /// under every package it mentions.
    pub fn add_incompatibility(&mut self, incompat: Incompatibility<P, V>) -> IncompId<P, V> {
        debug!("add incompatibility {{{incompat}}}");
        let id = self.incompatibility_store.alloc(incompat);
        self.index(id);
        id
    }

    fn index(&mut self, id: IncompId<P, V>) {
        let packages: Vec<P> = self.incompatibility_store[id]
            .terms()
            .iter()
            .map(|term| term.package().clone())
            .collect();
        for package in packages {
            self.incompatibilities.entry(package).or_default().push(id);
        }
    }

    fn relation(&self, id: IncompId<P, V>) -> Relation<P, V> {
        self.incompatibility_store[id].relation(|term| self.partial_solution.relation(term))
    }

    /// Unit propagation is the core mechanism of the solving algorithm.
    /// CF <https://github.com/dart-lang/pub/blob/master/doc/solver.md#unit-propagation>
    ///
    /// For each incompatibility touching a changed package: a contradicted
    /// term makes it inert; a single inconclusive term with every other term
    /// satisfied forces the negation of that term; fully satisfied terms are
    /// a conflict handled by resolution and backjumping.
    pub fn unit_propagation(&mut self, package: P) -> Result<(), SolverError<P, V>> {
        let mut changed = vec![package];
        while let Some(current) = changed.pop() {
            // Newest incompatibilities first, so that the latest learned
            // clauses are evaluated before older facts.
            let ids = self
                .incompatibilities
                .get(&current)
                .cloned()
                .unwrap_or_default();
            'incompats: for &id in ids.iter().rev() {
                match self.relation(id) {
                    Relation::Satisfied => {
                        debug!("conflict: {{{}}}", self.incompatibility_store[id]);
                        let root_cause = self.conflict_resolution(id)?;
                        // The learned incompatibility is almost satisfied
                        // by construction after backjumping.
                        match self.relation(root_cause) {
                            Relation::AlmostSatisfied(term) => {
                                changed.clear();
                                changed.push(term.package().clone());
                                self.partial_solution.derive(term.negate(), root_cause);
                            }
                            _ => {
                                return Err(SolverError::Failure(
                                    "learned incompatibility is not almost satisfied after backjumping"
                                        .into(),
                                ))
                            }
                        }
                        break 'incompats;
                    }
                    Relation::AlmostSatisfied(term) => {
                        changed.push(term.package().clone());
                        self.partial_solution.derive(term.negate(), id);
                    }
                    Relation::Contradicted | Relation::Inconclusive => {}
                }
            }
        }
        Ok(())
    }

    /// Return the root cause of a conflict after backjumping,
    /// learning the incompatibilities implied on the way.
    /// CF <https://github.com/dart-lang/pub/blob/master/doc/solver.md#conflict-resolution>
    fn conflict_resolution(
        &mut self,
        conflict: IncompId<P, V>,
    ) -> Result<IncompId<P, V>, SolverError<P, V>> {
        let mut current = conflict;
        let mut learned = false;
        loop {
            if self.incompatibility_store[current].is_failure(&self.root) {
                return Err(SolverError::NoSolution(SolveFailure::new(
                    current,
                    &self.incompatibility_store,
                )));
            }
            let incompat = self.incompatibility_store[current].clone();
            // Trail index, decision level, cause and term of the satisfier
            // of every term in the incompatibility.
            let satisfiers: Vec<(usize, u32, Option<IncompId<P, V>>, Term<P, V>)> = incompat
                .terms()
                .iter()
                .map(|term| {
                    let assignment = self.partial_solution.satisfier(term);
                    (
                        assignment.index(),
                        assignment.decision_level(),
                        assignment.cause(),
                        assignment.term(),
                    )
                })
                .collect();
            // The term satisfied last; on equal trail indices the first
            // one encountered wins.
            let current_pos = satisfiers
                .iter()
                .enumerate()
                .fold(0, |best, (i, s)| if s.0 > satisfiers[best].0 { i } else { best });
            let (_, satisfier_level, satisfier_cause, satisfier_term) =
                satisfiers[current_pos].clone();
            // Maximum decision level of any other satisfier, 1 if none.
            let previous_level = satisfiers
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != current_pos)
                .map(|(_, s)| s.1)
                .max()
                .unwrap_or(1);
            match satisfier_cause {
                Some(cause) if previous_level >= satisfier_level => {
                    // Resolve the conflict against the satisfier's own cause.
                    let current_term = &incompat.terms()[current_pos];
                    let mut terms: Vec<Term<P, V>> = incompat
                        .terms()
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| i != current_pos)
                        .map(|(_, term)| term.clone())
                        .collect();
                    terms.extend(
                        self.incompatibility_store[cause]
                            .terms()
                            .iter()
                            .filter(|term| term.package() != satisfier_term.package())
                            .cloned(),
                    );
                    // The satisfier may only partially satisfy the current
                    // term; the uncovered fragment joins the learned clause.
                    let difference = satisfier_term.difference(current_term);
                    if !difference.is_empty() {
                        terms.push(difference.negate());
                    }
                    let prior_cause = Incompatibility::derived(terms, current, cause);
                    debug!("prior cause: {{{prior_cause}}}");
                    current = self.incompatibility_store.alloc(prior_cause);
                    learned = true;
                }
                _ => {
                    // The satisfier is a decision, or the other satisfiers
                    // all live at an earlier level: backjump there.
                    self.partial_solution.backtrack(previous_level);
                    if learned {
                        self.index(current);
                    }
                    return Ok(current);
                }
            }
        }
    }
}
