// SPDX-License-Identifier: MPL-2.0

//! A constraint binds a range of versions to a package identity.

use std::fmt::{self, Display};

use crate::package::Package;
use crate::range::VersionRange;
use crate::version::Version;

/// A range of versions of a specific package.
///
/// The constraint itself does not know which versions exist; the
/// [Source](crate::solver::Source) enumerates the candidates that fall
/// within the range.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionConstraint<P: Package, V: Version> {
    package: P,
    range: VersionRange<V>,
}

impl<P: Package, V: Version> VersionConstraint<P, V> {
    /// Constraint allowing versions of `package` within `range`.
    pub fn new(package: P, range: VersionRange<V>) -> Self {
        Self { package, range }
    }

    /// Constraint allowing every version of `package`.
    pub fn any(package: P) -> Self {
        Self::new(package, VersionRange::any())
    }

    /// Constraint allowing exactly one version of `package`.
    pub fn exact(package: P, version: V) -> Self {
        Self::new(package, VersionRange::exact(version))
    }

    /// The package this constraint applies to.
    pub fn package(&self) -> &P {
        &self.package
    }

    /// The allowed range of versions.
    pub fn range(&self) -> &VersionRange<V> {
        &self.range
    }
}

impl<P: Package, V: Version> Display for VersionConstraint<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.package, self.range)
    }
}
