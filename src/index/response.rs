//! Cross-product query responses
//!
//! A `ResponseTable` maps `(index id, range)` to an `Answer`. Two ranges with
//! the same name but different bounds are distinct keys. Tables are built per
//! call and folded together with `merge`, which is right-biased on key
//! collisions.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::range::QueryRange;

/// Integer rendering of `Answer::NotApplicable`
pub const NOT_APPLICABLE: i64 = -1;

/// Which family of query produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryKind {
    /// Exact queries (`query`)
    Joint,
    /// Prefix queries (`count`)
    Combination,
}

impl QueryKind {
    /// Qualifier used in flat labels
    pub fn symbol(&self) -> &'static str {
        match self {
            QueryKind::Joint => "J",
            QueryKind::Combination => "C",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Result of one (index, range) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    /// Computed result
    Value(u64),
    /// The index's generator yields a missing criterion for the element
    NotApplicable,
}

impl Answer {
    /// Integer form, `NOT_APPLICABLE` for `NotApplicable`
    pub fn as_i64(&self) -> i64 {
        match self {
            Answer::Value(v) => i64::try_from(*v).unwrap_or(i64::MAX),
            Answer::NotApplicable => NOT_APPLICABLE,
        }
    }

    /// Computed value, if any
    pub fn value(&self) -> Option<u64> {
        match self {
            Answer::Value(v) => Some(*v),
            Answer::NotApplicable => None,
        }
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

/// Key of one response entry: an index and the full range it was queried over
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseKey<K> {
    /// Index identifier
    pub index_id: String,
    /// Queried range
    pub range: QueryRange<K>,
}

/// Associative, mergeable result container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTable<K> {
    kind: QueryKind,
    entries: BTreeMap<ResponseKey<K>, Answer>,
}

impl<K> ResponseTable<K> {
    /// Empty table for the given query family
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    /// Query family of this table
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Answer for `index_id` over the only range labelled `range_name`.
    ///
    /// `None` if no range or more than one range carries that label.
    pub fn get_named(&self, index_id: &str, range_name: &str) -> Option<Answer> {
        let mut matches = self
            .entries
            .iter()
            .filter(|(key, _)| key.index_id == index_id && key.range.name() == range_name)
            .map(|(_, answer)| *answer);
        match (matches.next(), matches.next()) {
            (Some(answer), None) => Some(answer),
            _ => None,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries ordered by index id, then range
    pub fn iter(&self) -> impl Iterator<Item = (&ResponseKey<K>, &Answer)> {
        self.entries.iter()
    }

    /// Render as `"{index}_{qualifier}_{range}" -> value`.
    ///
    /// Labels use range names, so ranges sharing a name share a label.
    pub fn to_flat_map(&self) -> BTreeMap<String, i64> {
        self.entries
            .iter()
            .map(|(key, answer)| (self.label(key), answer.as_i64()))
            .collect()
    }

    fn label(&self, key: &ResponseKey<K>) -> String {
        format!("{}_{}_{}", key.index_id, self.kind.symbol(), key.range.name())
    }
}

impl<K: Ord + Clone> ResponseTable<K> {
    /// Record or overwrite the answer for `(index_id, range)`.
    pub fn add(&mut self, index_id: &str, range: &QueryRange<K>, answer: Answer) -> &mut Self {
        self.entries.insert(
            ResponseKey {
                index_id: index_id.to_string(),
                range: range.clone(),
            },
            answer,
        );
        self
    }

    /// Answer for `(index_id, range)`
    pub fn get(&self, index_id: &str, range: &QueryRange<K>) -> Option<Answer> {
        let key = ResponseKey {
            index_id: index_id.to_string(),
            range: range.clone(),
        };
        self.entries.get(&key).copied()
    }

    /// New table with the entries of `self` overlaid by `other`'s.
    pub fn merge(&self, other: &ResponseTable<K>) -> ResponseTable<K> {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().map(|(k, v)| (k.clone(), *v)));
        ResponseTable {
            kind: self.kind,
            entries,
        }
    }
}

impl<K> Serialize for ResponseTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flat = self.to_flat_map();
        let mut map = serializer.serialize_map(Some(flat.len()))?;
        for (label, value) in &flat {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
