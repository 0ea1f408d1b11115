// SPDX-License-Identifier: MPL-2.0

//! PubGrub version solving algorithm.
//!
//! Version solving consists in efficiently finding a set of packages and versions
//! that satisfy all the constraints of a given project dependencies.
//! In addition, when that is not possible,
//! we should try to provide a very human-readable and clear
//! explanation as to why that failed.
//!
//! # Package and Version traits
//!
//! All the code in this crate is manipulating packages and versions,
//! and for this to work, we defined `Package` and `Version` traits
//! that are used as bounds on most of the exposed types and functions.
//!
//! Package identifiers need to implement our [Package](package::Package) trait,
//! which is automatic if the type already implements
//! [Clone] + [Eq] + [Hash](std::hash::Hash) + [Debug](std::fmt::Debug)
//! + [Display](std::fmt::Display).
//! So things like [String] will work out of the box.
//!
//! Our [Version](version::Version) trait is automatic for any totally ordered
//! [Clone] + [Debug](std::fmt::Debug) + [Display](std::fmt::Display) type;
//! the solver never inspects a version beyond comparing it.
//! For convenience, this library already provides two version types.
//! The first one is [NumberVersion](version::NumberVersion),
//! basically a newtype for [u32].
//! The second one is [SemanticVersion](version::SemanticVersion)
//! that implements semantic versioning rules.
//!
//! # Basic example
//!
//! Let's imagine that we are building a user interface
//! with a menu containing dropdowns with some icons,
//! icons that we are also directly using in other parts of the interface.
//! For this scenario our direct dependencies are `menu` and `icons`,
//! but the complete set of dependencies looks like follows:
//!
//! - `root` depends on `menu` and `icons`
//! - `menu` depends on `dropdown`
//! - `dropdown` depends on `icons`
//! - `icons` has no dependency
//!
//! We can model that scenario with this library as follows
//! ```
//! use versolve::range::VersionRange;
//! use versolve::solver::{resolve, OfflineSource};
//!
//! let mut source = OfflineSource::<&str, u32>::new("root");
//! source.add_dependencies(
//!     "root", 1, vec![("menu", VersionRange::any()), ("icons", VersionRange::any())],
//! );
//! source.add_dependencies("menu", 1, vec![("dropdown", VersionRange::any())]);
//! source.add_dependencies("dropdown", 1, vec![("icons", VersionRange::any())]);
//! source.add_dependencies("icons", 1, vec![]);
//!
//! // Run the solver.
//! let solution = resolve(&source).unwrap();
//! assert_eq!(solution.get("icons"), Some(&1));
//! ```
//!
//! # Writing your own source
//!
//! The [OfflineSource](solver::OfflineSource) used above is a basic
//! implementation of the [Source](solver::Source) trait, which is the
//! interface between the solver and the dependency metadata.
//! Implementing it requires three methods:
//! the `root` package, `versions_for` a constraint
//! (preferred candidates first), and the `incompatibilities_for`
//! a selected package version, one per declared dependency.
//!
//! On a real scenario, these methods may involve reading the file system
//! or doing network requests, so you may want to hold a cache in your type.
//! You could use the [OfflineSource](solver::OfflineSource) type provided
//! by the crate as guidance, but you are free to use whatever approach
//! makes sense in your situation.
//!
//! # Solution and error reporting
//!
//! When everything goes well, the solver finds and returns a complete
//! set of direct and indirect dependencies satisfying all the constraints,
//! one version per non-root package reached.
//! But sometimes there is no solution because dependencies are incompatible.
//! In such cases, solving returns a
//! [SolverError::NoSolution(failure)](error::SolverError::NoSolution),
//! where the provided [SolveFailure](report::SolveFailure) holds the failure
//! incompatibility and the full chain of reasons it was derived from.
//! Its [Display](std::fmt::Display) implementation renders the conventional
//! explanation, for example:
//!
//! ```txt
//! version solving failed:
//!
//! Because b = 1 depends on shared = 2 and a = 1 depends on shared = 1,
//! b = 1 is incompatible with a = 1.
//! ```

#![warn(missing_docs)]

pub mod constraint;
pub mod error;
pub mod incompatibility;
pub mod package;
pub mod range;
pub mod report;
pub mod solver;
pub mod term;
pub mod type_aliases;
pub mod version;

mod internal;
