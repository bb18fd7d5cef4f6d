//! Multi-criteria range index
//!
//! Elements are indexed under named indices. Each index turns an element into
//! an ordered `KeySequence` of criterion values and records the element's
//! position in a `CriterionTrie`: interior nodes branch on every criterion but
//! the last, and the leaf keeps, per last-criterion value, a sorted multiset
//! of positions.
//!
//! # Queries
//!
//! - exact: observations of a full key within a position range
//! - count: distinct last-criterion values under a prefix within a range
//! - accumulate: observations under a prefix within a range
//!
//! # Invariants
//!
//! - In-memory only, append-only: nothing is ever removed
//! - Ranges are inclusive; an inverted range matches nothing
//! - Concurrent insertions and queries are safe; each answer reflects some
//!   linearization of the insertions

mod catalog;
mod config;
mod errors;
mod keys;
mod leaf;
mod range;
mod response;
mod trie;

pub use catalog::{Catalog, Generator, NamedIndex};
pub use config::CatalogConfig;
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use keys::KeySequence;
pub use leaf::{LeafRangeIndex, PositionMultiset, PARALLEL_SWEEP_MIN_VALUES};
pub use range::QueryRange;
pub use response::{Answer, QueryKind, ResponseKey, ResponseTable, NOT_APPLICABLE};
pub use trie::{CriterionTrie, TrieNode};
