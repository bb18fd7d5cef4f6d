//! Metrics registry
//!
//! - Counters only, monotonic
//! - Exact values
//! - Thread-safe, lock-free (Relaxed atomics)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one catalog
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Indices defined
    indices_defined: AtomicU64,
    /// Definitions rejected for an id already in use
    definitions_rejected: AtomicU64,
    /// Observations landed in an index, one per index
    observations_indexed: AtomicU64,
    /// Observations left out of an index because of a missing criterion
    observations_skipped: AtomicU64,
    /// Insertions rejected (unknown index, missing criterion, arity mismatch)
    insertions_rejected: AtomicU64,
    /// Answered (index, range) pairs
    queries_executed: AtomicU64,
    /// Query calls rejected for an unknown index
    queries_rejected: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment indices defined
    pub fn increment_indices_defined(&self) {
        self.indices_defined.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment definitions rejected
    pub fn increment_definitions_rejected(&self) {
        self.definitions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment observations indexed
    pub fn increment_observations_indexed(&self) {
        self.observations_indexed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment observations skipped
    pub fn increment_observations_skipped(&self) {
        self.observations_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment insertions rejected
    pub fn increment_insertions_rejected(&self) {
        self.insertions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Add answered (index, range) pairs
    pub fn add_queries_executed(&self, pairs: u64) {
        self.queries_executed.fetch_add(pairs, Ordering::Relaxed);
    }

    /// Increment queries rejected
    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            indices_defined: self.indices_defined.load(Ordering::Relaxed),
            definitions_rejected: self.definitions_rejected.load(Ordering::Relaxed),
            observations_indexed: self.observations_indexed.load(Ordering::Relaxed),
            observations_skipped: self.observations_skipped.load(Ordering::Relaxed),
            insertions_rejected: self.insertions_rejected.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
        }
    }

    /// Current snapshot as a JSON object
    pub fn to_json(&self) -> String {
        // A struct of plain integers always serializes
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub indices_defined: u64,
    pub definitions_rejected: u64,
    pub observations_indexed: u64,
    pub observations_skipped: u64,
    pub insertions_rejected: u64,
    pub queries_executed: u64,
    pub queries_rejected: u64,
}
