// SPDX-License-Identifier: MPL-2.0

//! Assignments are the building blocks of a PubGrub partial solution.
//! (partial solution = the current state of the solution we are building in the algorithm).

use std::fmt::{self, Display};

use crate::incompatibility::IncompId;
use crate::package::Package;
use crate::term::Term;
use crate::version::Version;

/// An assignment is either a decision: a chosen version for a package,
/// or a derivation: a term specifying compatible versions for a package.
/// We also record the incompatibility at the origin of a derivation,
/// called its cause, plus the decision level and the position in the trail.
#[derive(Debug, Clone)]
pub enum Assignment<P: Package, V: Version> {
    /// The decision.
    Decision {
        /// The package corresponding to the decision.
        package: P,
        /// The decided version.
        version: V,
        /// Number of decisions on the trail up to and including this one.
        decision_level: u32,
        /// Position in the trail.
        index: usize,
    },
    /// The derivation.
    Derivation {
        /// Term of the derivation.
        term: Term<P, V>,
        /// Incompatibility cause of the derivation.
        cause: IncompId<P, V>,
        /// Decision level prevailing when the derivation was made.
        decision_level: u32,
        /// Position in the trail.
        index: usize,
    },
}

impl<P: Package, V: Version> Assignment<P, V> {
    /// Constructor for a decision.
    pub fn decision(package: P, version: V, decision_level: u32, index: usize) -> Self {
        Self::Decision {
            package,
            version,
            decision_level,
            index,
        }
    }

    /// Constructor for a derivation.
    pub fn derivation(
        term: Term<P, V>,
        cause: IncompId<P, V>,
        decision_level: u32,
        index: usize,
    ) -> Self {
        Self::Derivation {
            term,
            cause,
            decision_level,
            index,
        }
    }

    /// Return the package for this assignment.
    pub fn package(&self) -> &P {
        match self {
            Self::Decision { package, .. } => package,
            Self::Derivation { term, .. } => term.package(),
        }
    }

    /// Retrieve the current assignment as a [Term].
    /// If this is a decision, it returns a positive term with that exact version.
    /// Otherwise, if this is a derivation, just returns its term.
    pub fn term(&self) -> Term<P, V> {
        match self {
            Self::Decision {
                package, version, ..
            } => Term::exact(package.clone(), version.clone()),
            Self::Derivation { term, .. } => term.clone(),
        }
    }

    /// Decision level of this assignment.
    pub fn decision_level(&self) -> u32 {
        match self {
            Self::Decision { decision_level, .. } => *decision_level,
            Self::Derivation { decision_level, .. } => *decision_level,
        }
    }

    /// Position of this assignment in the trail.
    pub fn index(&self) -> usize {
        match self {
            Self::Decision { index, .. } => *index,
            Self::Derivation { index, .. } => *index,
        }
    }

    /// The incompatibility that forced a derivation, none for a decision.
    pub fn cause(&self) -> Option<IncompId<P, V>> {
        match self {
            Self::Decision { .. } => None,
            Self::Derivation { cause, .. } => Some(*cause),
        }
    }
}

impl<P: Package, V: Version> Display for Assignment<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decision {
                package,
                version,
                decision_level,
                ..
            } => write!(f, "{package} = {version} (decision, level {decision_level})"),
            Self::Derivation {
                term,
                decision_level,
                ..
            } => write!(f, "{term} (derivation, level {decision_level})"),
        }
    }
}
