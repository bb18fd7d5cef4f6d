//! Catalog configuration
//!
//! Controls whether the catalog fans out over indices and ranges on the
//! rayon pool. Results are identical either way; only scheduling changes.

/// Configuration for a `Catalog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Whether catalog-wide insertion and cross products run in parallel.
    pub parallel: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl CatalogConfig {
    /// Fan out on the rayon pool.
    pub fn parallel() -> Self {
        Self::default()
    }

    /// Evaluate every fan-out unit on the calling thread.
    pub fn sequential() -> Self {
        Self { parallel: false }
    }
}
