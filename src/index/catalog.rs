//! Catalog of named criterion indices
//!
//! A catalog owns a registry of named indices. Each index pairs a key
//! generator (element → `KeySequence`) with a `CriterionTrie`. The catalog
//! routes insertions to one or every index and evaluates single queries and
//! (index × range) cross products.
//!
//! # API
//!
//! - `define(id, generator)` / `define_and_add(id, element, generator, pos)`
//! - `add_to(id, element, pos)` - insert into one index
//! - `add(element, pos)` - insert into every index, skipping missing criteria
//! - `query` / `query_all` / `query_many` - exact path counts
//! - `count` / `count_all` / `count_many` / `count_keys` - distinct suffix values
//! - `accumulate` / `accumulate_keys` - summed suffix observations
//!
//! # Invariants
//!
//! - Identifiers are unique; an index is never removed or redefined
//! - Every index keeps the arity of its first insertion
//! - Queries never mutate an index
//! - A cross-product answer is `NotApplicable` iff the generator yields a
//!   missing criterion for the queried key

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::config::CatalogConfig;
use super::errors::{IndexError, IndexResult};
use super::keys::KeySequence;
use super::range::QueryRange;
use super::response::{Answer, QueryKind, ResponseTable};
use super::trie::CriterionTrie;

/// Key generator of a named index
pub type Generator<T, V> = Arc<dyn Fn(&T) -> KeySequence<V> + Send + Sync>;

/// One named index: its generator and its trie.
pub struct NamedIndex<T: ?Sized, V, K>
where
    V: Eq + Hash,
{
    id: String,
    generator: Generator<T, V>,
    trie: CriterionTrie<V, K>,
}

impl<T: ?Sized, V, K> NamedIndex<T, V, K>
where
    V: Eq + Hash + Clone + Send + Sync,
    K: Ord + Send + Sync,
{
    /// Index identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key sequence the generator yields for `element`
    pub fn keys_for(&self, element: &T) -> KeySequence<V> {
        (self.generator)(element)
    }

    /// Underlying trie
    pub fn trie(&self) -> &CriterionTrie<V, K> {
        &self.trie
    }
}

impl<T: ?Sized, V, K> fmt::Debug for NamedIndex<T, V, K>
where
    V: Eq + Hash + Clone + Send + Sync,
    K: Ord + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedIndex")
            .field("id", &self.id)
            .field("arity", &self.trie.arity())
            .finish()
    }
}

/// Registry of named indices over elements of type `T`, keyed by criterion
/// values of type `V`, observed at positions of type `K`.
pub struct Catalog<T: ?Sized, V, K>
where
    V: Eq + Hash,
{
    indices: RwLock<HashMap<String, Arc<NamedIndex<T, V, K>>>>,
    config: CatalogConfig,
    metrics: MetricsRegistry,
}

impl<T: ?Sized, V, K> Default for Catalog<T, V, K>
where
    V: Eq + Hash,
{
    fn default() -> Self {
        Self::with_config(CatalogConfig::default())
    }
}

impl<T: ?Sized, V, K> Catalog<T, V, K>
where
    V: Eq + Hash,
{
    /// Empty catalog with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty catalog with an explicit configuration
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            indices: RwLock::new(HashMap::new()),
            config,
            metrics: MetricsRegistry::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Operational counters
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Whether an index with this identifier exists
    pub fn is_defined(&self, id: &str) -> bool {
        self.indices.read().contains_key(id)
    }

    /// Identifiers of all defined indices, sorted
    pub fn index_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.indices.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of defined indices
    pub fn len(&self) -> usize {
        self.indices.read().len()
    }

    /// Whether no index is defined
    pub fn is_empty(&self) -> bool {
        self.indices.read().is_empty()
    }
}

impl<T, V, K> Catalog<T, V, K>
where
    T: ?Sized + Sync,
    V: Eq + Hash + Clone + Send + Sync,
    K: Ord + Clone + Send + Sync,
{
    // ==================
    // Definition
    // ==================

    /// Define an empty index.
    ///
    /// Fails with `AlreadyDefined` if the identifier is taken.
    pub fn define<F>(&self, id: impl Into<String>, generator: F) -> IndexResult<()>
    where
        F: Fn(&T) -> KeySequence<V> + Send + Sync + 'static,
    {
        let id = id.into();
        let mut indices = self.indices.write();
        if indices.contains_key(&id) {
            drop(indices);
            return Err(self.reject_definition(IndexError::already_defined(id)));
        }

        indices.insert(
            id.clone(),
            Arc::new(NamedIndex {
                id: id.clone(),
                generator: Arc::new(generator),
                trie: CriterionTrie::new(),
            }),
        );
        drop(indices);

        self.metrics.increment_indices_defined();
        log_event_with_fields(Event::IndexDefined, &[("index", &id)]);
        Ok(())
    }

    /// Define an index and insert its first observation.
    ///
    /// The index stays defined even if the insertion itself is rejected.
    pub fn define_and_add<F>(
        &self,
        id: impl Into<String>,
        element: &T,
        generator: F,
        position: K,
    ) -> IndexResult<()>
    where
        F: Fn(&T) -> KeySequence<V> + Send + Sync + 'static,
    {
        let id = id.into();
        self.define(id.clone(), generator)?;
        self.add_to(&id, element, position)
    }

    // ==================
    // Insertion
    // ==================

    /// Insert `element` at `position` into one index.
    ///
    /// Fails with `UnknownIndex`, or with `MissingCriterion` /
    /// `ArityMismatch` if the generated key cannot be stored.
    pub fn add_to(&self, id: &str, element: &T, position: K) -> IndexResult<()> {
        let Some(index) = self.get(id) else {
            return Err(self.reject_insert(IndexError::unknown_index(id)));
        };

        index
            .trie
            .add(index.keys_for(element), position)
            .map_err(|e| self.reject_insert(e.with_index(id)))?;

        self.metrics.increment_observations_indexed();
        Ok(())
    }

    /// Insert `element` at `position` into every defined index.
    ///
    /// An index whose generator yields a missing criterion for `element` is
    /// skipped; the other indices are unaffected. Returns the number of
    /// indices the observation landed in.
    pub fn add(&self, element: &T, position: K) -> usize {
        let indices = self.snapshot();

        let insert = |index: &Arc<NamedIndex<T, V, K>>| -> bool {
            let keys = index.keys_for(element);
            if keys.has_missing() {
                self.metrics.increment_observations_skipped();
                log_event_with_fields(Event::ObservationSkipped, &[("index", index.id())]);
                return false;
            }

            match index.trie.add(keys, position.clone()) {
                Ok(()) => {
                    self.metrics.increment_observations_indexed();
                    true
                }
                Err(e) => {
                    self.reject_insert(e.with_index(index.id()));
                    false
                }
            }
        };

        if self.config.parallel {
            indices.par_iter().filter(|&index| insert(index)).count()
        } else {
            indices.iter().filter(|&index| insert(index)).count()
        }
    }

    // ==================
    // Single-index queries
    // ==================

    /// Observations of `element`'s full key within `[start, end]`.
    pub fn query(&self, id: &str, element: &T, start: K, end: K) -> IndexResult<u64> {
        let index = self.query_target(id)?;
        let answer = index.trie.query(index.keys_for(element), &start, &end);
        self.metrics.add_queries_executed(1);
        Ok(answer)
    }

    /// Distinct values of the last criterion, among elements sharing
    /// `element`'s other criteria, observed within `[start, end]`.
    pub fn count(&self, id: &str, element: &T, start: K, end: K) -> IndexResult<u64> {
        let index = self.query_target(id)?;
        let keys = index.keys_for(element).drop_last();
        let answer = index.trie.count(keys, &start, &end);
        self.metrics.add_queries_executed(1);
        Ok(answer)
    }

    /// Like `count`, with a caller-supplied prefix instead of a generated key.
    pub fn count_keys(&self, id: &str, keys: KeySequence<V>, start: K, end: K) -> IndexResult<u64> {
        let index = self.query_target(id)?;
        let answer = index.trie.count(keys, &start, &end);
        self.metrics.add_queries_executed(1);
        Ok(answer)
    }

    /// Observations within `[start, end]` summed over every value of the last
    /// criterion, among elements sharing `element`'s other criteria.
    pub fn accumulate(&self, id: &str, element: &T, start: K, end: K) -> IndexResult<u64> {
        let index = self.query_target(id)?;
        let keys = index.keys_for(element).drop_last();
        let answer = index.trie.accumulate(keys, &start, &end);
        self.metrics.add_queries_executed(1);
        Ok(answer)
    }

    /// Like `accumulate`, with a caller-supplied prefix instead of a
    /// generated key.
    pub fn accumulate_keys(
        &self,
        id: &str,
        keys: KeySequence<V>,
        start: K,
        end: K,
    ) -> IndexResult<u64> {
        let index = self.query_target(id)?;
        let answer = index.trie.accumulate(keys, &start, &end);
        self.metrics.add_queries_executed(1);
        Ok(answer)
    }

    // ==================
    // Cross products
    // ==================

    /// Exact query of every defined index over every range.
    pub fn query_all(&self, element: &T, ranges: &[QueryRange<K>]) -> ResponseTable<K> {
        self.cross_product(element, &self.snapshot(), ranges, QueryKind::Joint)
    }

    /// Exact query of the given indices over every range.
    ///
    /// Fails with `UnknownIndex` before evaluating anything if an identifier
    /// is not defined.
    pub fn query_many<S: AsRef<str>>(
        &self,
        element: &T,
        ids: &[S],
        ranges: &[QueryRange<K>],
    ) -> IndexResult<ResponseTable<K>> {
        let indices = self.select(ids)?;
        Ok(self.cross_product(element, &indices, ranges, QueryKind::Joint))
    }

    /// Prefix count of every defined index over every range.
    pub fn count_all(&self, element: &T, ranges: &[QueryRange<K>]) -> ResponseTable<K> {
        self.cross_product(element, &self.snapshot(), ranges, QueryKind::Combination)
    }

    /// Prefix count of the given indices over every range.
    pub fn count_many<S: AsRef<str>>(
        &self,
        element: &T,
        ids: &[S],
        ranges: &[QueryRange<K>],
    ) -> IndexResult<ResponseTable<K>> {
        let indices = self.select(ids)?;
        Ok(self.cross_product(element, &indices, ranges, QueryKind::Combination))
    }

    fn cross_product(
        &self,
        element: &T,
        indices: &[Arc<NamedIndex<T, V, K>>],
        ranges: &[QueryRange<K>],
        kind: QueryKind,
    ) -> ResponseTable<K> {
        // Generators are deterministic, so one key per index serves every range
        let keyed: Vec<(&NamedIndex<T, V, K>, KeySequence<V>)> = indices
            .iter()
            .map(|index| {
                let keys = index.keys_for(element);
                let keys = match kind {
                    QueryKind::Joint => keys,
                    QueryKind::Combination => keys.drop_last(),
                };
                (index.as_ref(), keys)
            })
            .collect();

        let answer_for = |index: &NamedIndex<T, V, K>,
                          keys: &KeySequence<V>,
                          range: &QueryRange<K>|
         -> Answer {
            if keys.has_missing() {
                return Answer::NotApplicable;
            }
            let keys = keys.clone();
            Answer::Value(match kind {
                QueryKind::Joint => index.trie.query(keys, range.start(), range.end()),
                QueryKind::Combination => index.trie.count(keys, range.start(), range.end()),
            })
        };

        // One unit of work per (index, range) pair
        let pairs: Vec<(&(&NamedIndex<T, V, K>, KeySequence<V>), &QueryRange<K>)> = keyed
            .iter()
            .flat_map(|entry| ranges.iter().map(move |range| (entry, range)))
            .collect();

        let table = if self.config.parallel {
            pairs
                .par_iter()
                .fold(
                    || ResponseTable::new(kind),
                    |mut table, pair| {
                        let (entry, range) = *pair;
                        let &(index, ref keys) = entry;
                        table.add(index.id(), range, answer_for(index, keys, range));
                        table
                    },
                )
                .reduce(|| ResponseTable::new(kind), |acc, part| acc.merge(&part))
        } else {
            let mut table = ResponseTable::new(kind);
            for &(entry, range) in &pairs {
                let &(index, ref keys) = entry;
                table.add(index.id(), range, answer_for(index, keys, range));
            }
            table
        };

        self.metrics
            .add_queries_executed((indices.len() * ranges.len()) as u64);
        log_event_with_fields(
            Event::QueryExecuted,
            &[
                ("indices", &indices.len().to_string()),
                ("kind", kind.symbol()),
                ("ranges", &ranges.len().to_string()),
            ],
        );
        table
    }

    // ==================
    // Registry access
    // ==================

    fn get(&self, id: &str) -> Option<Arc<NamedIndex<T, V, K>>> {
        self.indices.read().get(id).cloned()
    }

    fn snapshot(&self) -> Vec<Arc<NamedIndex<T, V, K>>> {
        self.indices.read().values().cloned().collect()
    }

    fn query_target(&self, id: &str) -> IndexResult<Arc<NamedIndex<T, V, K>>> {
        self.get(id)
            .ok_or_else(|| self.reject_query(IndexError::unknown_index(id)))
    }

    fn select<S: AsRef<str>>(&self, ids: &[S]) -> IndexResult<Vec<Arc<NamedIndex<T, V, K>>>> {
        let indices = self.indices.read();
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            match indices.get(id) {
                Some(index) => selected.push(Arc::clone(index)),
                None => return Err(self.reject_query(IndexError::unknown_index(id))),
            }
        }
        Ok(selected)
    }

    fn reject_definition(&self, err: IndexError) -> IndexError {
        self.metrics.increment_definitions_rejected();
        log_event_with_fields(
            Event::IndexRejected,
            &[
                ("code", err.code().code()),
                ("index", err.index_id().unwrap_or_default()),
                ("reason", err.message()),
            ],
        );
        err
    }

    fn reject_insert(&self, err: IndexError) -> IndexError {
        self.metrics.increment_insertions_rejected();
        log_event_with_fields(
            Event::IndexRejected,
            &[
                ("code", err.code().code()),
                ("index", err.index_id().unwrap_or_default()),
                ("reason", err.message()),
            ],
        );
        err
    }

    fn reject_query(&self, err: IndexError) -> IndexError {
        self.metrics.increment_queries_rejected();
        log_event_with_fields(
            Event::QueryRejected,
            &[
                ("code", err.code().code()),
                ("index", err.index_id().unwrap_or_default()),
            ],
        );
        err
    }
}

impl<T: ?Sized, V, K> fmt::Debug for Catalog<T, V, K>
where
    V: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<String> = self.indices.read().keys().cloned().collect();
        ids.sort();
        f.debug_struct("Catalog")
            .field("indices", &ids)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexErrorCode;

    #[derive(Debug, Clone)]
    struct Person {
        name: Option<&'static str>,
        email: Option<&'static str>,
    }

    fn person(name: &'static str, email: &'static str) -> Person {
        Person {
            name: Some(name),
            email: Some(email),
        }
    }

    fn catalog(config: CatalogConfig) -> Catalog<Person, &'static str, i32> {
        let catalog = Catalog::with_config(config);
        catalog
            .define("NAME", |p: &Person| KeySequence::from_values(vec![p.name]))
            .unwrap();
        catalog
            .define("EMAIL", |p: &Person| KeySequence::from_values(vec![p.email]))
            .unwrap();
        catalog
            .define("EMAIL_NAME", |p: &Person| {
                KeySequence::from_values(vec![p.email, p.name])
            })
            .unwrap();
        catalog
    }

    fn populated(config: CatalogConfig) -> Catalog<Person, &'static str, i32> {
        let catalog = catalog(config);
        catalog.add(&person("jon", "a"), 1);
        catalog.add(&person("jon", "a"), 5);
        catalog.add(&person("arya", "a"), 1);
        catalog
    }

    #[test]
    fn test_define_twice_fails() {
        let catalog = catalog(CatalogConfig::sequential());
        let err = catalog
            .define("NAME", |p: &Person| KeySequence::from_values(vec![p.name]))
            .unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::AlreadyDefined);
        assert_eq!(catalog.len(), 3);

        let snapshot = catalog.metrics().snapshot();
        assert_eq!(snapshot.indices_defined, 3);
        assert_eq!(snapshot.definitions_rejected, 1);
        assert_eq!(snapshot.insertions_rejected, 0);
    }

    #[test]
    fn test_unknown_index_everywhere() {
        let catalog = populated(CatalogConfig::sequential());
        let jon = person("jon", "a");
        let unknown = |r: IndexResult<u64>| r.unwrap_err().code() == IndexErrorCode::UnknownIndex;

        assert!(unknown(catalog.query("NOPE", &jon, 0, 10)));
        assert!(unknown(catalog.count("NOPE", &jon, 0, 10)));
        assert!(unknown(catalog.accumulate("NOPE", &jon, 0, 10)));
        assert!(unknown(catalog.count_keys("NOPE", KeySequence::of(["a"]), 0, 10)));
        assert!(unknown(catalog.accumulate_keys("NOPE", KeySequence::of(["a"]), 0, 10)));
        assert_eq!(
            catalog.add_to("NOPE", &jon, 1).unwrap_err().code(),
            IndexErrorCode::UnknownIndex
        );
        assert!(catalog
            .query_many(&jon, &["NAME", "NOPE"], &[QueryRange::new(0, 10)])
            .is_err());
        assert!(catalog
            .count_many(&jon, &["NOPE"], &[QueryRange::new(0, 10)])
            .is_err());

        assert_eq!(catalog.metrics().snapshot().queries_rejected, 7);
    }

    #[test]
    fn test_exact_query() {
        let catalog = populated(CatalogConfig::sequential());
        assert_eq!(catalog.query("NAME", &person("jon", "?"), 1, 4).unwrap(), 1);
        assert_eq!(catalog.query("NAME", &person("jon", "?"), 1, 5).unwrap(), 2);
        assert_eq!(catalog.query("NAME", &person("arya", "?"), 1, 5).unwrap(), 1);
        assert_eq!(catalog.query("EMAIL_NAME", &person("jon", "a"), 1, 5).unwrap(), 2);
    }

    #[test]
    fn test_count_and_accumulate_diverge() {
        let catalog = populated(CatalogConfig::sequential());
        let jon = person("jon", "a");

        assert_eq!(catalog.count("EMAIL_NAME", &jon, 1, 5).unwrap(), 2);
        assert_eq!(catalog.accumulate("EMAIL_NAME", &jon, 1, 5).unwrap(), 3);

        assert_eq!(catalog.count_keys("EMAIL_NAME", KeySequence::of(["a"]), 1, 5).unwrap(), 2);
        assert_eq!(
            catalog.accumulate_keys("EMAIL_NAME", KeySequence::of(["a"]), 1, 5).unwrap(),
            3
        );
    }

    #[test]
    fn test_single_criterion_count_spans_all_values() {
        let catalog = populated(CatalogConfig::sequential());
        // Dropping the only criterion leaves the whole root leaf
        assert_eq!(catalog.count("NAME", &person("anyone", "?"), 1, 5).unwrap(), 2);
        assert_eq!(catalog.accumulate("NAME", &person("anyone", "?"), 1, 5).unwrap(), 3);
    }

    #[test]
    fn test_add_skips_missing_criterion_per_index() {
        let catalog = catalog(CatalogConfig::sequential());
        let nameless = Person {
            name: None,
            email: Some("a"),
        };

        assert_eq!(catalog.add(&nameless, 3), 1);
        assert_eq!(catalog.query("EMAIL", &nameless, 0, 10).unwrap(), 1);
        assert_eq!(catalog.query("NAME", &person("jon", "a"), 0, 10).unwrap(), 0);

        let snapshot = catalog.metrics().snapshot();
        assert_eq!(snapshot.observations_indexed, 1);
        assert_eq!(snapshot.observations_skipped, 2);
    }

    #[test]
    fn test_add_to_rejects_missing_criterion() {
        let catalog = catalog(CatalogConfig::sequential());
        let nameless = Person {
            name: None,
            email: Some("a"),
        };
        let err = catalog.add_to("NAME", &nameless, 1).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::MissingCriterion);
        assert_eq!(err.index_id(), Some("NAME"));
    }

    #[test]
    fn test_define_and_add() {
        let catalog: Catalog<Person, &str, i32> = Catalog::new();
        catalog
            .define_and_add(
                "NAME",
                &person("jon", "a"),
                |p: &Person| KeySequence::from_values(vec![p.name]),
                7,
            )
            .unwrap();
        assert_eq!(catalog.query("NAME", &person("jon", "a"), 7, 7).unwrap(), 1);

        let err = catalog
            .define_and_add(
                "NAME",
                &person("jon", "a"),
                |p: &Person| KeySequence::from_values(vec![p.name]),
                8,
            )
            .unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::AlreadyDefined);
        assert_eq!(catalog.query("NAME", &person("jon", "a"), 0, 10).unwrap(), 1);
    }

    #[test]
    fn test_cross_product_shape() {
        let catalog = populated(CatalogConfig::sequential());
        let ranges = [QueryRange::new(1, 10), QueryRange::new(4, 4)];

        let table = catalog
            .query_many(&person("jon", "a"), &["NAME", "EMAIL"], &ranges)
            .unwrap();

        assert_eq!(table.kind(), QueryKind::Joint);
        assert_eq!(table.len(), 4);
        assert_eq!(table.get("NAME", &ranges[0]), Some(Answer::Value(2)));
        assert_eq!(table.get("NAME", &ranges[1]), Some(Answer::Value(0)));
        assert_eq!(table.get("EMAIL", &ranges[0]), Some(Answer::Value(3)));
        assert_eq!(table.get("EMAIL", &ranges[1]), Some(Answer::Value(0)));
    }

    #[test]
    fn test_cross_product_not_applicable() {
        let catalog = populated(CatalogConfig::sequential());
        let nameless = Person {
            name: None,
            email: Some("a"),
        };

        let table = catalog.query_all(&nameless, &[QueryRange::new(1, 5)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get_named("NAME", "[1-5]"), Some(Answer::NotApplicable));
        assert_eq!(table.get_named("EMAIL_NAME", "[1-5]"), Some(Answer::NotApplicable));
        assert_eq!(table.get_named("EMAIL", "[1-5]"), Some(Answer::Value(3)));
    }

    #[test]
    fn test_count_cross_product_ignores_missing_last_criterion() {
        let catalog = populated(CatalogConfig::sequential());
        let nameless = Person {
            name: None,
            email: Some("a"),
        };

        // The name is dropped before the prefix walk
        let table = catalog
            .count_many(&nameless, &["EMAIL_NAME", "NAME"], &[QueryRange::new(1, 5)])
            .unwrap();
        assert_eq!(table.kind(), QueryKind::Combination);
        assert_eq!(table.get_named("EMAIL_NAME", "[1-5]"), Some(Answer::Value(2)));
        assert_eq!(table.get_named("NAME", "[1-5]"), Some(Answer::Value(2)));
    }

    #[test]
    fn test_same_named_ranges_stay_distinct() {
        let catalog = populated(CatalogConfig::parallel());
        let narrow = QueryRange::named("w", 1, 1);
        let wide = QueryRange::named("w", 1, 5);

        let table = catalog
            .query_many(&person("jon", "a"), &["NAME"], &[narrow.clone(), wide.clone()])
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("NAME", &narrow), Some(Answer::Value(1)));
        assert_eq!(table.get("NAME", &wide), Some(Answer::Value(2)));
        assert_eq!(table.get_named("NAME", "w"), None);
    }

    #[test]
    fn test_parallel_matches_sequential_over_many_pairs() {
        let sequential = catalog(CatalogConfig::sequential());
        let parallel = catalog(CatalogConfig::parallel());
        for position in 0..200 {
            let name = if position % 3 == 0 { "jon" } else { "arya" };
            sequential.add(&person(name, "a"), position);
            parallel.add(&person(name, "a"), position);
        }
        let ranges: Vec<QueryRange<i32>> = (0..40)
            .map(|s| QueryRange::named("r", s * 5, s * 5 + 9))
            .collect();
        let jon = person("jon", "a");

        let table = parallel.query_all(&jon, &ranges);
        assert_eq!(table.len(), 3 * ranges.len());
        assert_eq!(table, sequential.query_all(&jon, &ranges));
        assert_eq!(parallel.count_all(&jon, &ranges), sequential.count_all(&jon, &ranges));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = populated(CatalogConfig::sequential());
        let parallel = populated(CatalogConfig::parallel());
        let ranges = [
            QueryRange::new(1, 10),
            QueryRange::new(4, 4),
            QueryRange::new(2, 5),
            QueryRange::new(5, 1),
        ];
        let jon = person("jon", "a");

        assert_eq!(sequential.query_all(&jon, &ranges), parallel.query_all(&jon, &ranges));
        assert_eq!(sequential.count_all(&jon, &ranges), parallel.count_all(&jon, &ranges));
    }

    #[test]
    fn test_arity_mismatch_is_logged_and_skipped() {
        let catalog: Catalog<Vec<&'static str>, &'static str, i32> =
            Catalog::with_config(CatalogConfig::sequential());
        catalog
            .define("ALL", |v: &Vec<&'static str>| KeySequence::of(v.iter().copied()))
            .unwrap();

        assert_eq!(catalog.add(&vec!["a", "b"], 1), 1);
        assert_eq!(catalog.add(&vec!["a"], 2), 0);
        assert_eq!(
            catalog.add_to("ALL", &vec!["a", "b", "c"], 3).unwrap_err().code(),
            IndexErrorCode::ArityMismatch
        );
        assert_eq!(catalog.metrics().snapshot().insertions_rejected, 2);
    }

    #[test]
    fn test_introspection() {
        let catalog = catalog(CatalogConfig::sequential());
        assert!(catalog.is_defined("NAME"));
        assert!(!catalog.is_defined("nope"));
        assert_eq!(catalog.index_ids(), vec!["EMAIL", "EMAIL_NAME", "NAME"]);
        assert!(!catalog.is_empty());
        assert!(format!("{:?}", catalog).contains("EMAIL_NAME"));
    }
}
