// SPDX-License-Identifier: MPL-2.0

//! Ranges are constraints defining sets of versions.
//!
//! Concretely, those constraints correspond to any set of versions
//! representable as the concatenation, union, and complement
//! of the ranges building blocks.
//!
//! Those building blocks are:
//!  - [empty()](VersionRange::empty): the empty set
//!  - [any()](VersionRange::any): the set of all possible versions
//!  - [exact(v)](VersionRange::exact): the set containing only the version v
//!  - [higher_than(v)](VersionRange::higher_than): the set defined by `v <= versions`
//!  - [strictly_higher_than(v)](VersionRange::strictly_higher_than): the set defined by `v < versions`
//!  - [lower_than(v)](VersionRange::lower_than): the set defined by `versions <= v`
//!  - [strictly_lower_than(v)](VersionRange::strictly_lower_than): the set defined by `versions < v`
//!  - [between(v1, v2)](VersionRange::between): the set defined by `v1 <= versions < v2`
//!
//! A range is kept in canonical form: a union holds at least two non-empty,
//! pairwise disjoint, non-touching intervals in ascending order. Two ranges
//! describing the same set of versions therefore compare equal.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use thiserror::Error;

/// A set of versions over a totally ordered version type.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VersionRange<V> {
    /// Contains no version. Only equal to itself.
    Empty,
    /// A contiguous span of versions with optional endpoints.
    /// With both endpoints present, either `min < max`, or `min == max` with
    /// both endpoints inclusive (a point range).
    Interval {
        /// Lower endpoint, none meaning unbounded.
        min: Option<V>,
        /// Whether the lower endpoint itself belongs to the range.
        include_min: bool,
        /// Upper endpoint, none meaning unbounded.
        max: Option<V>,
        /// Whether the upper endpoint itself belongs to the range.
        include_max: bool,
    },
    /// Ascending, pairwise disjoint, non-touching intervals.
    Union(Vec<VersionRange<V>>),
}

/// Bound inclusivity carried next to an optional endpoint value.
type Endpoint<'a, V> = (Option<&'a V>, bool);

/// Order two lower bounds, none being minus infinity.
/// On equal versions an inclusive bound starts earlier than an exclusive one.
fn cmp_lower<V: Ord>(a: Endpoint<V>, b: Endpoint<V>) -> Ordering {
    match (a.0, b.0) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(y).then(match (a.1, b.1) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        }),
    }
}

/// Order two upper bounds, none being plus infinity.
/// On equal versions an exclusive bound ends earlier than an inclusive one.
fn cmp_upper<V: Ord>(a: Endpoint<V>, b: Endpoint<V>) -> Ordering {
    match (a.0, b.0) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(y).then(match (a.1, b.1) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => Ordering::Equal,
        }),
    }
}

impl<V> VersionRange<V> {
    /// Empty set of versions.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Set of all possible versions.
    pub fn any() -> Self {
        Self::Interval {
            min: None,
            include_min: false,
            max: None,
            include_max: false,
        }
    }

    /// Set of all versions higher or equal to some version.
    pub fn higher_than(v: impl Into<V>) -> Self {
        Self::Interval {
            min: Some(v.into()),
            include_min: true,
            max: None,
            include_max: false,
        }
    }

    /// Set of all versions strictly higher than some version.
    pub fn strictly_higher_than(v: impl Into<V>) -> Self {
        Self::Interval {
            min: Some(v.into()),
            include_min: false,
            max: None,
            include_max: false,
        }
    }

    /// Set of all versions lower or equal to some version.
    pub fn lower_than(v: impl Into<V>) -> Self {
        Self::Interval {
            min: None,
            include_min: false,
            max: Some(v.into()),
            include_max: true,
        }
    }

    /// Set of all versions strictly lower than some version.
    pub fn strictly_lower_than(v: impl Into<V>) -> Self {
        Self::Interval {
            min: None,
            include_min: false,
            max: Some(v.into()),
            include_max: false,
        }
    }

    /// Set of versions greater or equal to `v1` but less than `v2`.
    pub fn between(v1: impl Into<V>, v2: impl Into<V>) -> Self {
        Self::Interval {
            min: Some(v1.into()),
            include_min: true,
            max: Some(v2.into()),
            include_max: false,
        }
    }

    /// True if this is the empty set.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True if this is the set of all versions.
    pub fn is_any(&self) -> bool {
        matches!(
            self,
            Self::Interval {
                min: None,
                max: None,
                ..
            }
        )
    }

    /// View this range as a slice of intervals.
    fn intervals(&self) -> &[Self] {
        match self {
            Self::Empty => &[],
            Self::Interval { .. } => std::slice::from_ref(self),
            Self::Union(ranges) => ranges,
        }
    }

    /// Endpoints of an interval. Must not be called on another variant.
    fn bounds(&self) -> (Endpoint<V>, Endpoint<V>) {
        match self {
            Self::Interval {
                min,
                include_min,
                max,
                include_max,
            } => ((min.as_ref(), *include_min), (max.as_ref(), *include_max)),
            _ => unreachable!("bounds of a non-interval range"),
        }
    }

    /// Rebuild a range from canonically ordered intervals.
    fn from_intervals(mut intervals: Vec<Self>) -> Self {
        match intervals.len() {
            0 => Self::Empty,
            1 => intervals.pop().unwrap(),
            _ => Self::Union(intervals),
        }
    }
}

impl<V: Clone> VersionRange<V> {
    /// Set containing exactly one version.
    pub fn exact(v: impl Into<V>) -> Self {
        let v = v.into();
        Self::Interval {
            min: Some(v.clone()),
            include_min: true,
            max: Some(v),
            include_max: true,
        }
    }
}

impl<V: Ord + Debug> VersionRange<V> {
    /// General interval constructor.
    ///
    /// With both endpoints present, `min < max` must hold, or `min == max`
    /// with both endpoints inclusive (a point range). Anything else is a
    /// programming error and panics.
    pub fn interval(min: Option<V>, include_min: bool, max: Option<V>, include_max: bool) -> Self {
        if let (Some(l), Some(u)) = (&min, &max) {
            match l.cmp(u) {
                Ordering::Less => {}
                Ordering::Equal if include_min && include_max => {}
                _ => panic!(
                    "invalid interval: min {:?} (inclusive: {}) and max {:?} (inclusive: {})",
                    l, include_min, u, include_max
                ),
            }
        }
        Self::Interval {
            min,
            include_min,
            max,
            include_max,
        }
    }
}

impl<V: Ord> VersionRange<V> {
    /// Returns true if this range contains the specified version.
    pub fn contains(&self, v: &V) -> bool {
        match self {
            Self::Empty => false,
            Self::Interval {
                min,
                include_min,
                max,
                include_max,
            } => {
                let above = match min {
                    None => true,
                    Some(m) if *include_min => v >= m,
                    Some(m) => v > m,
                };
                let below = match max {
                    None => true,
                    Some(m) if *include_max => v <= m,
                    Some(m) => v < m,
                };
                above && below
            }
            Self::Union(ranges) => ranges.iter().any(|r| r.contains(v)),
        }
    }

    /// True if at least one version lies in both ranges.
    pub fn intersects(&self, other: &Self) -> bool {
        self.intervals()
            .iter()
            .any(|a| other.intervals().iter().any(|b| Self::overlap(a, b)))
    }

    /// Whether every version of `a` is below every version of `b`,
    /// the shared endpoint (if any) belonging to at most one of them.
    fn strictly_below(a: &Self, b: &Self) -> bool {
        let (_, a_upper) = a.bounds();
        let (b_lower, _) = b.bounds();
        match (a_upper.0, b_lower.0) {
            (None, _) | (_, None) => false,
            (Some(u), Some(l)) => match u.cmp(l) {
                Ordering::Less => true,
                Ordering::Equal => !(a_upper.1 && b_lower.1),
                Ordering::Greater => false,
            },
        }
    }

    fn overlap(a: &Self, b: &Self) -> bool {
        !Self::strictly_below(a, b) && !Self::strictly_below(b, a)
    }

    /// Whether `a` reaches `b`: the two intervals overlap or touch,
    /// so their union is a single interval. `b` must not start below `a`.
    fn connects(a: &Self, b: &Self) -> bool {
        let (_, a_upper) = a.bounds();
        let (b_lower, _) = b.bounds();
        match (a_upper.0, b_lower.0) {
            (None, _) | (_, None) => true,
            (Some(u), Some(l)) => match u.cmp(l) {
                Ordering::Greater => true,
                Ordering::Equal => a_upper.1 || b_lower.1,
                Ordering::Less => false,
            },
        }
    }
}

impl<V: Ord + Clone> VersionRange<V> {
    /// Computes the intersection of two sets of versions.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        for a in self.intervals() {
            for b in other.intervals() {
                if let Some(i) = Self::intersect_intervals(a, b) {
                    out.push(i);
                }
            }
        }
        Self::from_intervals(out)
    }

    /// Intersection of two intervals: the greater lower bound and the lesser
    /// upper bound. On equal endpoints the stricter (exclusive) side wins.
    fn intersect_intervals(a: &Self, b: &Self) -> Option<Self> {
        let (a_lower, a_upper) = a.bounds();
        let (b_lower, b_upper) = b.bounds();
        let lower = if cmp_lower(a_lower, b_lower) == Ordering::Less {
            b_lower
        } else {
            a_lower
        };
        let upper = if cmp_upper(a_upper, b_upper) == Ordering::Greater {
            b_upper
        } else {
            a_upper
        };
        if let (Some(l), Some(u)) = (lower.0, upper.0) {
            match l.cmp(u) {
                Ordering::Greater => return None,
                Ordering::Equal if !(lower.1 && upper.1) => return None,
                _ => {}
            }
        }
        Some(Self::Interval {
            min: lower.0.cloned(),
            include_min: lower.1,
            max: upper.0.cloned(),
            include_max: upper.1,
        })
    }

    /// Computes the union of two sets of versions.
    pub fn union(&self, other: &Self) -> Self {
        let mut intervals: Vec<Self> = self
            .intervals()
            .iter()
            .chain(other.intervals())
            .cloned()
            .collect();
        intervals.sort_by(|a, b| cmp_lower(a.bounds().0, b.bounds().0));
        let mut merged: Vec<Self> = Vec::with_capacity(intervals.len());
        for next in intervals {
            if let Some(last) = merged.last_mut() {
                if Self::connects(last, &next) {
                    if cmp_upper(last.bounds().1, next.bounds().1) == Ordering::Less {
                        if let (
                            Self::Interval {
                                max, include_max, ..
                            },
                            Self::Interval {
                                max: next_max,
                                include_max: next_include_max,
                                ..
                            },
                        ) = (last, next)
                        {
                            *max = next_max;
                            *include_max = next_include_max;
                        }
                    }
                    continue;
                }
            }
            merged.push(next);
        }
        Self::from_intervals(merged)
    }

    /// Returns the complement, which contains everything not in this range.
    pub fn complement(&self) -> Self {
        match self {
            Self::Empty => Self::any(),
            Self::Interval {
                min,
                include_min,
                max,
                include_max,
            } => {
                let mut pieces = Vec::new();
                if let Some(m) = min {
                    pieces.push(Self::Interval {
                        min: None,
                        include_min: false,
                        max: Some(m.clone()),
                        include_max: !include_min,
                    });
                }
                if let Some(m) = max {
                    pieces.push(Self::Interval {
                        min: Some(m.clone()),
                        include_min: !include_max,
                        max: None,
                        include_max: false,
                    });
                }
                Self::from_intervals(pieces)
            }
            Self::Union(ranges) => ranges
                .iter()
                .map(Self::complement)
                .reduce(|a, b| a.intersection(&b))
                .unwrap_or_else(Self::any),
        }
    }

    /// Indicates if this range is a subset of another range.
    pub fn subset_of(&self, other: &Self) -> bool {
        self == &self.intersection(other)
    }

    /// Indicates if the two ranges have no version in common.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.intersects(other)
    }
}

// REPORT ######################################################################

impl<V: Display + Eq> Display for VersionRange<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "none"),
            Self::Interval {
                min,
                include_min,
                max,
                include_max,
            } => match (min, max) {
                (None, None) => write!(f, "any"),
                (Some(a), Some(b)) if a == b => write!(f, "= {a}"),
                _ => {
                    if let Some(m) = min {
                        write!(f, "{} {m}", if *include_min { ">=" } else { ">" })?;
                        if max.is_some() {
                            write!(f, ", ")?;
                        }
                    }
                    if let Some(m) = max {
                        write!(f, "{} {m}", if *include_max { "<=" } else { "<" })?;
                    }
                    Ok(())
                }
            },
            Self::Union(ranges) => {
                for (idx, range) in ranges.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{range}")?;
                }
                Ok(())
            }
        }
    }
}

// PARSING #####################################################################

/// Error parsing the textual rendering of a [VersionRange].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeParseError {
    /// A comparison fragment was not one of `= v`, `> v`, `>= v`, `< v`, `<= v`.
    #[error("cannot parse `{0}` as a range fragment")]
    Fragment(String),
    /// The version part of a fragment did not parse.
    #[error("cannot parse `{0}` as a version")]
    Version(String),
}

impl<V: FromStr + Ord + Clone> FromStr for VersionRange<V> {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "none" {
            return Ok(Self::Empty);
        }
        let mut union = Self::Empty;
        for part in s.split(" or ") {
            union = union.union(&Self::parse_interval(part.trim())?);
        }
        Ok(union)
    }
}

impl<V: FromStr + Ord + Clone> VersionRange<V> {
    fn parse_interval(part: &str) -> Result<Self, RangeParseError> {
        if part == "any" {
            return Ok(Self::any());
        }
        if let Some(v) = part.strip_prefix("= ") {
            return Ok(Self::exact(Self::parse_version(v)?));
        }
        let mut interval = Self::any();
        for fragment in part.split(", ") {
            let bound = if let Some(v) = fragment.strip_prefix(">= ") {
                Self::higher_than(Self::parse_version(v)?)
            } else if let Some(v) = fragment.strip_prefix("> ") {
                Self::strictly_higher_than(Self::parse_version(v)?)
            } else if let Some(v) = fragment.strip_prefix("<= ") {
                Self::lower_than(Self::parse_version(v)?)
            } else if let Some(v) = fragment.strip_prefix("< ") {
                Self::strictly_lower_than(Self::parse_version(v)?)
            } else {
                return Err(RangeParseError::Fragment(fragment.to_string()));
            };
            interval = interval.intersection(&bound);
        }
        Ok(interval)
    }

    fn parse_version(s: &str) -> Result<V, RangeParseError> {
        s.trim()
            .parse()
            .map_err(|_| RangeParseError::Version(s.to_string()))
    }
}

// TESTS #######################################################################
