// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

/// Map implementation used by the library.
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;

/// Set implementation used by the library.
pub type Set<V> = rustc_hash::FxHashSet<V>;

/// Concrete package/version pairs picked by the library during
/// [resolve](crate::solver::resolve). Contains exactly one version per
/// non-root package reached by the solved dependencies.
pub type SelectedDependencies<P, V> = Map<P, V>;
