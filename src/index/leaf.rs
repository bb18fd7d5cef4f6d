//! Leaf range index
//!
//! Maps a single criterion value to the multiset of positions at which it was
//! observed and answers closed-range counts over those positions.
//!
//! # Invariants
//!
//! - Positions of one value are kept sorted ascending, duplicates adjacent
//! - Range bounds are inclusive on both ends
//! - `left > right` yields 0, never an error

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rayon::prelude::*;

/// Number of distinct values at which sweeps switch to a parallel fold.
pub const PARALLEL_SWEEP_MIN_VALUES: usize = 1024;

/// Sorted multiset of positions supporting O(log n) closed-range counts.
#[derive(Debug, Clone)]
pub struct PositionMultiset<K> {
    sorted: Vec<K>,
}

impl<K> Default for PositionMultiset<K> {
    fn default() -> Self {
        Self { sorted: Vec::new() }
    }
}

impl<K: Ord> PositionMultiset<K> {
    /// Creates an empty multiset
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one observation.
    ///
    /// Lands after any equal positions, so in-order appends never shift.
    pub fn insert(&mut self, position: K) {
        let at = self.sorted.partition_point(|p| p <= &position);
        self.sorted.insert(at, position);
    }

    /// Observations strictly below `left`.
    fn below(&self, left: &K) -> usize {
        self.sorted.partition_point(|p| p < left)
    }

    /// Observations strictly above `right`.
    fn above(&self, right: &K) -> usize {
        self.sorted.len() - self.sorted.partition_point(|p| p <= right)
    }

    /// Observations with position in `[left, right]`.
    pub fn count_in(&self, left: &K, right: &K) -> usize {
        if left > right {
            return 0;
        }
        self.sorted
            .len()
            .saturating_sub(self.below(left))
            .saturating_sub(self.above(right))
    }

    /// Total observations
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Whether no observation was recorded
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

/// Per-value position multisets for the last criterion of a key path.
#[derive(Debug)]
pub struct LeafRangeIndex<V, K>
where
    V: Eq + Hash,
{
    observations: DashMap<V, PositionMultiset<K>>,
}

impl<V, K> Default for LeafRangeIndex<V, K>
where
    V: Eq + Hash,
{
    fn default() -> Self {
        Self {
            observations: DashMap::new(),
        }
    }
}

impl<V, K> LeafRangeIndex<V, K>
where
    V: Eq + Hash + Send + Sync,
    K: Ord + Send + Sync,
{
    /// Creates an empty leaf
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `value` at `position`.
    pub fn add(&self, value: V, position: K) {
        self.observations.entry(value).or_default().insert(position);
    }

    /// Observations of `value` within `[left, right]`.
    pub fn query(&self, value: &V, left: &K, right: &K) -> u64 {
        self.observations
            .get(value)
            .map_or(0, |set| set.count_in(left, right) as u64)
    }

    /// Sum of in-range observations over every known value.
    pub fn accumulate(&self, left: &K, right: &K) -> u64 {
        if left > right {
            return 0;
        }
        self.sweep(|set| set.count_in(left, right) as u64)
    }

    /// Number of distinct values with at least one in-range observation.
    pub fn count(&self, left: &K, right: &K) -> u64 {
        if left > right {
            return 0;
        }
        self.sweep(|set| u64::from(set.count_in(left, right) > 0))
    }

    /// Number of distinct values seen
    pub fn value_count(&self) -> usize {
        self.observations.len()
    }

    /// Total observations across all values
    pub fn observation_count(&self) -> usize {
        self.observations.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn sweep<F>(&self, per_value: F) -> u64
    where
        F: Fn(&PositionMultiset<K>) -> u64 + Send + Sync,
    {
        if self.observations.len() < PARALLEL_SWEEP_MIN_VALUES {
            return self
                .observations
                .iter()
                .map(|entry| per_value(entry.value()))
                .sum();
        }

        let total = AtomicU64::new(0);
        self.observations.par_iter().for_each(|entry| {
            total.fetch_add(per_value(entry.value()), Ordering::Relaxed);
        });
        total.into_inner()
    }
}
