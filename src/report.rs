// SPDX-License-Identifier: MPL-2.0

//! Build a report as clear as possible as to why
//! dependency solving failed.

use std::fmt::{self, Display};

use crate::incompatibility::{Cause, IncompId, Incompatibility};
use crate::internal::arena::Arena;
use crate::package::Package;
use crate::type_aliases::Set;
use crate::version::Version;

/// The explanation of a failed resolution: the failure incompatibility
/// together with the chain of incompatibilities it was derived from.
///
/// The [Display] implementation renders the conventional
/// "version solving failed" prose: one "Because X and Y, Z." line per
/// derived incompatibility, in dependency order, ending with the failure.
#[derive(Debug, Clone)]
pub struct SolveFailure<P: Package, V: Version> {
    root: IncompId<P, V>,
    store: Arena<Incompatibility<P, V>>,
}

impl<P: Package, V: Version> SolveFailure<P, V> {
    pub(crate) fn new(root: IncompId<P, V>, store: &Arena<Incompatibility<P, V>>) -> Self {
        Self {
            root,
            store: store.clone(),
        }
    }

    /// The failure incompatibility itself: a single positive term over the
    /// root package (or no term at all), proving no solution exists.
    pub fn incompatibility(&self) -> &Incompatibility<P, V> {
        &self.store[self.root]
    }

    /// Explain the parents of a derived incompatibility before concluding
    /// from them, each derived incompatibility at most once.
    fn explain(&self, id: IncompId<P, V>, visited: &mut Set<IncompId<P, V>>, lines: &mut Vec<String>) {
        if !visited.insert(id) {
            return;
        }
        let incompat = &self.store[id];
        if let Cause::Conflict { conflict, other } = incompat.cause() {
            let (conflict, other) = (*conflict, *other);
            self.explain(conflict, visited, lines);
            self.explain(other, visited, lines);
            let conclusion = if id == self.root {
                "version solving failed".to_string()
            } else {
                self.describe(incompat)
            };
            lines.push(format!(
                "Because {} and {}, {}.",
                self.describe(&self.store[conflict]),
                self.describe(&self.store[other]),
                conclusion,
            ));
        }
    }

    /// One clause of prose for an incompatibility, cause-aware for the
    /// external ones.
    fn describe(&self, incompat: &Incompatibility<P, V>) -> String {
        match incompat.cause() {
            Cause::Root => match incompat.terms() {
                [term] => format!("{} is required", term.constraint()),
                _ => "the root requirements hold".to_string(),
            },
            Cause::Dependency { depender, version } => {
                match incompat.terms().iter().find(|t| !t.is_positive()) {
                    Some(dependency) => format!(
                        "{depender} = {version} depends on {}",
                        dependency.constraint(),
                    ),
                    _ => incompat.to_string(),
                }
            }
            Cause::NoVersions => match incompat.terms() {
                [term] => format!("no versions satisfy {}", term.constraint()),
                _ => incompat.to_string(),
            },
            Cause::Custom | Cause::Conflict { .. } => Self::describe_terms(incompat),
        }
    }

    fn describe_terms(incompat: &Incompatibility<P, V>) -> String {
        match incompat.terms() {
            [] => "version solving failed".to_string(),
            [term] if term.is_positive() => format!("{term} is forbidden"),
            [term] => format!("{} is required", term.negate()),
            [t1, t2] if t1.is_positive() && t2.is_positive() => {
                format!("{t1} is incompatible with {t2}")
            }
            terms => {
                let rendered: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                format!("{} cannot all hold", rendered.join(" and "))
            }
        }
    }
}

impl<P: Package, V: Version> Display for SolveFailure<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version solving failed:")?;
        writeln!(f)?;
        let incompat = &self.store[self.root];
        if matches!(incompat.cause(), Cause::Conflict { .. }) {
            let mut visited = Set::default();
            let mut lines = Vec::new();
            self.explain(self.root, &mut visited, &mut lines);
            for line in lines {
                writeln!(f, "{line}")?;
            }
        } else {
            writeln!(
                f,
                "Because {}, version solving failed.",
                self.describe(incompat),
            )?;
        }
        Ok(())
    }
}

impl<P: Package, V: Version> std::error::Error for SolveFailure<P, V> {}
