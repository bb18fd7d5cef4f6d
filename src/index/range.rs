//! Query ranges

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed position range `[start, end]` with a display name.
///
/// The name labels the range in cross-product responses. Unnamed ranges are
/// labelled `[start-end]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryRange<K> {
    name: String,
    start: K,
    end: K,
}

impl<K: fmt::Display> QueryRange<K> {
    /// Range labelled by its bounds
    pub fn new(start: K, end: K) -> Self {
        let name = format!("[{}-{}]", start, end);
        Self { name, start, end }
    }
}

impl<K> QueryRange<K> {
    /// Range with an explicit label
    pub fn named(name: impl Into<String>, start: K, end: K) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Range label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inclusive lower bound
    pub fn start(&self) -> &K {
        &self.start
    }

    /// Inclusive upper bound
    pub fn end(&self) -> &K {
        &self.end
    }
}

impl<K: PartialOrd> QueryRange<K> {
    /// Whether `start > end`; such a range matches nothing
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_range_label() {
        let range = QueryRange::new(1, 10);
        assert_eq!(range.name(), "[1-10]");
        assert_eq!(*range.start(), 1);
        assert_eq!(*range.end(), 10);
    }

    #[test]
    fn test_named_range_keeps_label() {
        let range = QueryRange::named("week", 1, 7);
        assert_eq!(range.name(), "week");
    }

    #[test]
    fn test_inverted() {
        assert!(QueryRange::new(4, 2).is_inverted());
        assert!(!QueryRange::new(4, 4).is_inverted());
    }
}
