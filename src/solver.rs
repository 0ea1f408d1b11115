// SPDX-License-Identifier: MPL-2.0

//! PubGrub version solving algorithm.
//!
//! It consists in efficiently finding a set of packages and versions
//! that satisfy all the constraints of a given project dependencies.
//! In addition, when that is not possible,
//! PubGrub tries to provide a very human-readable and clear
//! explanation as to why that failed.
//! Below is an example of explanation present in
//! the introductory blog post about PubGrub
//!
//! ```txt
//! Because dropdown >=2.0.0 depends on icons >=2.0.0 and
//!   root depends on icons <2.0.0, dropdown >=2.0.0 is forbidden.
//!
//! And because menu >=1.1.0 depends on dropdown >=2.0.0,
//!   menu >=1.1.0 is forbidden.
//!
//! And because menu <1.1.0 depends on dropdown >=1.0.0 <2.0.0
//!   which depends on intl <4.0.0, every version of menu
//!   requires intl <4.0.0.
//!
//! So, because root depends on both menu >=1.0.0 and intl >=5.0.0,
//!   version solving failed.
//! ```
//!
//! The algorithm is generic and works for any type of dependency system
//! as long as packages (P) and versions (V) implement
//! the [Package](crate::package::Package) and [Version](crate::version::Version) traits.
//! Both are automatically implemented: [Package](crate::package::Package) for any
//! type implementing [Clone] + [Eq] + [Hash](std::hash::Hash) + [Debug](std::fmt::Debug)
//! + [Display](std::fmt::Display), and [Version](crate::version::Version) for any
//! totally ordered [Clone] + [Debug](std::fmt::Debug) + [Display](std::fmt::Display) type.
//!
//! ## API
//!
//! ```
//! use versolve::range::VersionRange;
//! use versolve::solver::{resolve, OfflineSource};
//!
//! let mut source = OfflineSource::<&str, u32>::new("root");
//! source.add_dependencies("root", 1, vec![("a", VersionRange::higher_than(1u32))]);
//! source.add_dependencies("a", 1, vec![]);
//!
//! let solution = resolve(&source).unwrap();
//! assert_eq!(solution.get("a"), Some(&1));
//! ```
//!
//! Where the [Source] supplies the root package, the candidate versions
//! allowed by a constraint, and the incompatibilities induced by selecting
//! a package at a version. If there is no solution, the reason will be
//! provided as clear as possible.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::error::Error;

use log::{debug, info};

use crate::constraint::VersionConstraint;
use crate::error::SolverError;
use crate::incompatibility::Incompatibility;
use crate::internal::core::State;
use crate::package::Package;
use crate::range::VersionRange;
use crate::term::Term;
use crate::type_aliases::{Map, SelectedDependencies};
use crate::version::Version;

/// Main function of the library.
/// Finds a set of packages and versions satisfying the dependency
/// constraints reachable from the source's root package.
pub fn resolve<P: Package, V: Version, S: Source<P, V>>(
    source: &S,
) -> Result<SelectedDependencies<P, V>, SolverError<P, V>> {
    VersionSolver::new(source).solve()
}

/// Trait that allows the algorithm to retrieve the packages and constraints
/// of the dependency system. An implementor needs to be supplied to
/// [VersionSolver] or [resolve].
///
/// Both methods are treated as pure for the duration of a solve:
/// asking twice must return the same answer.
pub trait Source<P: Package, V: Version> {
    /// The synthetic package representing the user's top-level requirement.
    /// It behaves like any other package and must have at least one version.
    fn root(&self) -> P;

    /// Versions of `package` allowed by `range`, preferred versions first.
    /// The solver always picks the first candidate of the list.
    fn versions_for(&self, package: &P, range: &VersionRange<V>)
        -> Result<Vec<V>, Box<dyn Error>>;

    /// The incompatibilities induced by selecting `package` at `version`:
    /// one [Incompatibility::from_dependency] entry per declared dependency,
    /// plus any additional incompatibility, built with
    /// [Incompatibility::custom_terms] when the dependency shape does not fit.
    fn incompatibilities_for(
        &self,
        package: &P,
        version: &V,
    ) -> Result<Vec<Incompatibility<P, V>>, Box<dyn Error>>;

    /// Decision heuristic: index of the unsatisfied constraint to try next.
    /// `unsatisfied` is never empty and is ordered by first requirement.
    /// The default picks the first one.
    ///
    /// Pub chooses the package with the fewest matching versions, which
    /// tends to find conflicts earlier if any exist.
    fn prioritize(&self, unsatisfied: &[&VersionConstraint<P, V>]) -> usize {
        let _ = unsatisfied;
        0
    }
}

/// State of one version solving run over a [Source].
///
/// The solver alternates unit propagation with decisions until the partial
/// solution either satisfies every requirement or proves that none can.
pub struct VersionSolver<'s, P: Package, V: Version, S: Source<P, V>> {
    source: &'s S,
    state: State<P, V>,
    /// Package versions whose dependency incompatibilities were already
    /// added, so revisiting a version after backtracking does not grow
    /// the incompatibility set.
    added_dependencies: Map<P, BTreeSet<V>>,
}

impl<'s, P: Package, V: Version, S: Source<P, V>> VersionSolver<'s, P, V, S> {
    /// Create a solver seeded with the source's root package.
    pub fn new(source: &'s S) -> Self {
        let root = source.root();
        Self {
            source,
            state: State::init(root),
            added_dependencies: Map::default(),
        }
    }

    /// Run the algorithm: on success, a mapping with exactly one version per
    /// non-root package reached by the dependencies; otherwise a
    /// [NoSolution](SolverError::NoSolution) explaining the conflict.
    pub fn solve(&mut self) -> Result<SelectedDependencies<P, V>, SolverError<P, V>> {
        info!("solving versions for {}", self.state.root());
        let mut next = self.state.root().clone();
        loop {
            self.state.unit_propagation(next)?;
            match self.choose_package_version()? {
                Some(package) => next = package,
                None => {
                    let mut solution = self.state.partial_solution.decisions().clone();
                    solution.remove(self.state.root());
                    info!("version solving finished: {} packages", solution.len());
                    return Ok(solution);
                }
            }
        }
    }

    /// Pick the next package and version to try, none meaning the partial
    /// solution is total. When the source has no candidate for a required
    /// constraint, record that fact as an incompatibility and hand the
    /// package back to propagation, which will reject it at this level
    /// and trigger backjumping.
    fn choose_package_version(&mut self) -> Result<Option<P>, SolverError<P, V>> {
        let constraint = {
            let unsatisfied: Vec<&VersionConstraint<P, V>> =
                self.state.partial_solution.unsatisfied().collect();
            if unsatisfied.is_empty() {
                return Ok(None);
            }
            let index = self.source.prioritize(&unsatisfied).min(unsatisfied.len() - 1);
            unsatisfied[index].clone()
        };
        let package = constraint.package().clone();
        let versions = self
            .source
            .versions_for(&package, constraint.range())
            .map_err(|source| SolverError::ErrorRetrievingVersions {
                package: package.clone(),
                source,
            })?;
        let Some(version) = versions.into_iter().next() else {
            debug!("no versions satisfy {constraint}");
            self.state
                .add_incompatibility(Incompatibility::no_versions(Term::positive(constraint)));
            return Ok(Some(package));
        };
        if self
            .added_dependencies
            .entry(package.clone())
            .or_default()
            .insert(version.clone())
        {
            let incompats = self
                .source
                .incompatibilities_for(&package, &version)
                .map_err(|source| SolverError::ErrorRetrievingDependencies {
                    package: package.clone(),
                    version: version.clone(),
                    source,
                })?;
            for incompat in incompats {
                self.state.add_incompatibility(incompat);
            }
        }
        self.state.partial_solution.decide(package.clone(), version);
        Ok(Some(package))
    }
}

/// A basic implementation of [Source], holding all the dependency
/// information in memory. Versions are served newest first.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OfflineSource<P: Package, V: Version> {
    root: P,
    dependencies: Map<P, BTreeMap<V, Vec<(P, VersionRange<V>)>>>,
}

impl<P: Package, V: Version> OfflineSource<P, V> {
    /// Creates an OfflineSource with the given root package
    /// and no dependency information.
    pub fn new(root: P) -> Self {
        Self {
            root,
            dependencies: Map::default(),
        }
    }

    /// Registers the dependencies of a package and version pair.
    /// The root package is registered like any other.
    /// All subsequent calls for a given package version pair
    /// replace the dependencies by the new ones.
    pub fn add_dependencies<I: IntoIterator<Item = (P, VersionRange<V>)>>(
        &mut self,
        package: P,
        version: V,
        dependencies: I,
    ) {
        *self
            .dependencies
            .entry(package)
            .or_default()
            .entry(version)
            .or_default() = dependencies.into_iter().collect();
    }

    /// Lists packages that have been saved.
    pub fn packages(&self) -> impl Iterator<Item = &P> {
        self.dependencies.keys()
    }
}

impl<P: Package, V: Version> Source<P, V> for OfflineSource<P, V> {
    fn root(&self) -> P {
        self.root.clone()
    }

    fn versions_for(
        &self,
        package: &P,
        range: &VersionRange<V>,
    ) -> Result<Vec<V>, Box<dyn Error>> {
        Ok(self
            .dependencies
            .get(package)
            .map(|versions| {
                versions
                    .keys()
                    .rev()
                    .filter(|v| range.contains(v))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn incompatibilities_for(
        &self,
        package: &P,
        version: &V,
    ) -> Result<Vec<Incompatibility<P, V>>, Box<dyn Error>> {
        Ok(self
            .dependencies
            .get(package)
            .and_then(|versions| versions.get(version))
            .map(|dependencies| {
                dependencies
                    .iter()
                    .map(|(dep_package, dep_range)| {
                        Incompatibility::from_dependency(
                            package.clone(),
                            version.clone(),
                            VersionConstraint::new(dep_package.clone(), dep_range.clone()),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
