// SPDX-License-Identifier: MPL-2.0

//! Handling version solving errors.

use thiserror::Error;

use crate::package::Package;
use crate::report::SolveFailure;
use crate::version::Version;

/// Errors that may occur while solving dependencies.
#[derive(Error, Debug)]
pub enum SolverError<P: Package, V: Version> {
    /// There is no solution for this set of dependencies.
    /// This is not a bug: the explanation says which constraints conflict.
    #[error(transparent)]
    NoSolution(SolveFailure<P, V>),

    /// Error arising when the implementer of [Source](crate::solver::Source)
    /// returned an error in the method
    /// [versions_for](crate::solver::Source::versions_for).
    #[error("retrieving available versions of package {package} failed")]
    ErrorRetrievingVersions {
        /// Package for which we want the list of versions.
        package: P,
        /// Error raised by the implementer of [Source](crate::solver::Source).
        source: Box<dyn std::error::Error>,
    },

    /// Error arising when the implementer of [Source](crate::solver::Source)
    /// returned an error in the method
    /// [incompatibilities_for](crate::solver::Source::incompatibilities_for).
    #[error("retrieving incompatibilities of {package} {version} failed")]
    ErrorRetrievingDependencies {
        /// Package whose dependencies we want.
        package: P,
        /// Version of the package for which we want the dependencies.
        version: V,
        /// Error raised by the implementer of [Source](crate::solver::Source).
        source: Box<dyn std::error::Error>,
    },

    /// Something unexpected happened.
    #[error("{0}")]
    Failure(String),
}
