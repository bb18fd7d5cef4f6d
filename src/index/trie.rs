//! Recursive criterion trie
//!
//! Interior nodes branch on successive criterion values of a `KeySequence`;
//! the node reached after consuming all but one value holds a
//! `LeafRangeIndex` keyed by the last criterion.
//!
//! # Invariants
//!
//! - Every sequence inserted into one trie has the same arity
//! - A node is a leaf iff it sits at depth `arity - 1`
//! - Nodes are created on first insertion along a path and never removed
//! - Reads never create nodes

use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::errors::{IndexError, IndexResult};
use super::keys::KeySequence;
use super::leaf::LeafRangeIndex;

/// A trie node: either the terminal leaf or a branch by criterion value.
#[derive(Debug)]
pub enum TrieNode<V, K>
where
    V: Eq + Hash,
{
    /// Terminal node keyed by the last criterion
    Leaf(LeafRangeIndex<V, K>),
    /// Interior node keyed by the next criterion
    Branch(DashMap<V, Arc<TrieNode<V, K>>>),
}

impl<V, K> TrieNode<V, K>
where
    V: Eq + Hash + Clone + Send + Sync,
    K: Ord + Send + Sync,
{
    /// Node shape for a path with `remaining` criteria still to consume.
    fn for_remaining(remaining: usize) -> Self {
        if remaining <= 1 {
            TrieNode::Leaf(LeafRangeIndex::new())
        } else {
            TrieNode::Branch(DashMap::new())
        }
    }

    fn add(&self, mut keys: KeySequence<V>, position: K) {
        let Some(key) = keys.pop() else {
            return;
        };

        match self {
            TrieNode::Leaf(leaf) => leaf.add(key, position),
            TrieNode::Branch(children) => {
                // Entry holds the shard lock, so the child is created once
                let child = Arc::clone(
                    children
                        .entry(key)
                        .or_insert_with(|| Arc::new(TrieNode::for_remaining(keys.arity())))
                        .value(),
                );
                child.add(keys, position);
            }
        }
    }

    /// Existing child for the front key, if any.
    fn child(&self, keys: &KeySequence<V>) -> Option<Arc<TrieNode<V, K>>> {
        let TrieNode::Branch(children) = self else {
            return None;
        };
        let key = keys.peek()?;
        children.get(key).map(|child| Arc::clone(child.value()))
    }

    fn query(&self, mut keys: KeySequence<V>, start: &K, end: &K) -> u64 {
        if keys.is_last() {
            return match (self, keys.pop()) {
                (TrieNode::Leaf(leaf), Some(value)) => leaf.query(&value, start, end),
                _ => 0,
            };
        }

        match self.child(&keys) {
            Some(child) => {
                keys.pop();
                child.query(keys, start, end)
            }
            None => 0,
        }
    }

    /// Walk the whole prefix, then apply `terminal` to the reached leaf.
    fn prefix<F>(&self, mut keys: KeySequence<V>, terminal: &F) -> u64
    where
        F: Fn(&LeafRangeIndex<V, K>) -> u64,
    {
        if !keys.has_next() {
            return match self {
                TrieNode::Leaf(leaf) => terminal(leaf),
                TrieNode::Branch(_) => 0,
            };
        }

        match self.child(&keys) {
            Some(child) => {
                keys.pop();
                child.prefix(keys, terminal)
            }
            None => 0,
        }
    }

    fn node_count(&self) -> usize {
        match self {
            TrieNode::Leaf(_) => 1,
            TrieNode::Branch(children) => {
                1 + children
                    .iter()
                    .map(|child| child.value().node_count())
                    .sum::<usize>()
            }
        }
    }
}

#[derive(Debug)]
struct Root<V, K>
where
    V: Eq + Hash,
{
    arity: usize,
    node: TrieNode<V, K>,
}

/// Composite-key range index over one named index's key sequences.
#[derive(Debug)]
pub struct CriterionTrie<V, K>
where
    V: Eq + Hash,
{
    /// Set by the first insertion, which fixes the arity
    root: OnceLock<Root<V, K>>,
}

impl<V, K> Default for CriterionTrie<V, K>
where
    V: Eq + Hash,
{
    fn default() -> Self {
        Self {
            root: OnceLock::new(),
        }
    }
}

impl<V, K> CriterionTrie<V, K>
where
    V: Eq + Hash + Clone + Send + Sync,
    K: Ord + Send + Sync,
{
    /// Creates an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of the full key path at `position`.
    ///
    /// Fails with `MissingCriterion` if any value is missing and with
    /// `ArityMismatch` if the arity is zero or differs from the arity of the
    /// first insertion.
    pub fn add(&self, keys: KeySequence<V>, position: K) -> IndexResult<()> {
        let arity = keys.arity();
        if arity == 0 {
            return Err(IndexError::arity_mismatch(self.arity().unwrap_or(0), 0));
        }
        if keys.has_missing() {
            return Err(IndexError::missing_criterion());
        }

        let root = self.root.get_or_init(|| Root {
            arity,
            node: TrieNode::for_remaining(arity),
        });
        if root.arity != arity {
            return Err(IndexError::arity_mismatch(root.arity, arity));
        }

        root.node.add(keys, position);
        Ok(())
    }

    /// Observations of the exact key path within `[start, end]`.
    pub fn query(&self, keys: KeySequence<V>, start: &K, end: &K) -> u64 {
        self.root
            .get()
            .map_or(0, |root| root.node.query(keys, start, end))
    }

    /// Distinct values of the criterion following the prefix `keys` with at
    /// least one observation within `[start, end]`.
    pub fn count(&self, keys: KeySequence<V>, start: &K, end: &K) -> u64 {
        self.root.get().map_or(0, |root| {
            root.node
                .prefix(keys, &|leaf: &LeafRangeIndex<V, K>| leaf.count(start, end))
        })
    }

    /// Observations within `[start, end]` summed over every value of the
    /// criterion following the prefix `keys`.
    pub fn accumulate(&self, keys: KeySequence<V>, start: &K, end: &K) -> u64 {
        self.root.get().map_or(0, |root| {
            root.node
                .prefix(keys, &|leaf: &LeafRangeIndex<V, K>| leaf.accumulate(start, end))
        })
    }

    /// Arity fixed by the first insertion
    pub fn arity(&self) -> Option<usize> {
        self.root.get().map(|root| root.arity)
    }

    /// Whether nothing was inserted yet
    pub fn is_empty(&self) -> bool {
        self.root.get().is_none()
    }

    /// Number of nodes, leaf and branch
    pub fn node_count(&self) -> usize {
        self.root.get().map_or(0, |root| root.node.node_count())
    }
}
