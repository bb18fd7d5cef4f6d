//! Key sequences used to traverse a criterion trie
//!
//! A `KeySequence` is the ordered tuple of criterion values extracted from
//! one element for one named index. It carries a front cursor and a back
//! bound over shared storage, so every recursion step can own its own copy of
//! the cursor state.
//!
//! A missing criterion is represented by `None`.

use std::sync::Arc;

/// Ordered, consumable view over a tuple of criterion values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySequence<V> {
    values: Arc<[Option<V>]>,
    /// Index of the next value to consume
    front: usize,
    /// One past the last usable value
    back: usize,
}

impl<V> KeySequence<V> {
    /// Create a sequence where every value is present.
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        values.into_iter().map(Some).collect()
    }

    /// Create a sequence from values that may be missing.
    pub fn from_values(values: Vec<Option<V>>) -> Self {
        let back = values.len();
        Self {
            values: values.into(),
            front: 0,
            back,
        }
    }

    /// Number of values left between the cursor and the back bound.
    pub fn arity(&self) -> usize {
        self.back - self.front
    }

    /// Whether at least one value is left.
    pub fn has_next(&self) -> bool {
        self.back > self.front
    }

    /// Whether exactly one value is left.
    pub fn is_last(&self) -> bool {
        self.arity() == 1
    }

    /// Shrink the usable range by `n` values from the back.
    ///
    /// Saturates at the front cursor; consumed values are never restored.
    pub fn drop_back(mut self, n: usize) -> Self {
        self.back = self.back.saturating_sub(n).max(self.front);
        self
    }

    /// Drop the final criterion, turning a full key into a prefix.
    pub fn drop_last(self) -> Self {
        self.drop_back(1)
    }

    /// Whether any unconsumed value is missing.
    pub fn has_missing(&self) -> bool {
        self.remaining().iter().any(Option::is_none)
    }

    /// The front value, without consuming it.
    pub fn peek(&self) -> Option<&V> {
        self.remaining().first().and_then(Option::as_ref)
    }

    /// Unconsumed values.
    pub fn remaining(&self) -> &[Option<V>] {
        &self.values[self.front..self.back]
    }
}

impl<V: Clone> KeySequence<V> {
    /// Consume and return the front value.
    ///
    /// Returns `None` when the sequence is exhausted or the value is missing.
    pub fn pop(&mut self) -> Option<V> {
        if !self.has_next() {
            return None;
        }
        let value = self.values[self.front].clone();
        self.front += 1;
        value
    }
}

impl<V> FromIterator<Option<V>> for KeySequence<V> {
    fn from_iter<I: IntoIterator<Item = Option<V>>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}
