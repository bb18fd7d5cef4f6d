//! Concurrent Indexing Tests
//!
//! Tests for thread safety of a shared catalog:
//! - Concurrent insertions lose no observations
//! - Concurrent insertions of one path create one branch
//! - Queries during insertion observe a consistent prefix of the work

use multirange::index::{Catalog, CatalogConfig, KeySequence, QueryRange};
use std::sync::Arc;
use std::thread;

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Debug, Clone)]
struct Visit {
    city: String,
    user: String,
}

fn visit(city: &str, user: &str) -> Visit {
    Visit {
        city: city.to_string(),
        user: user.to_string(),
    }
}

fn visit_catalog(config: CatalogConfig) -> Arc<Catalog<Visit, String, u64>> {
    let catalog = Catalog::with_config(config);
    catalog
        .define("USER", |v: &Visit| KeySequence::of([v.user.clone()]))
        .unwrap();
    catalog
        .define("CITY_USER", |v: &Visit| {
            KeySequence::of([v.city.clone(), v.user.clone()])
        })
        .unwrap();
    Arc::new(catalog)
}

const THREADS: u64 = 8;
const PER_THREAD: u64 = 500;

// =============================================================================
// Insertion Tests
// =============================================================================

/// Many threads inserting the same element lose no observations.
#[test]
fn test_same_element_from_many_threads() {
    let catalog = visit_catalog(CatalogConfig::default());
    let mut handles = vec![];

    for t in 0..THREADS {
        let catalog = Arc::clone(&catalog);
        handles.push(thread::spawn(move || {
            let element = visit("paris", "ana");
            for i in 0..PER_THREAD {
                catalog.add(&element, t * PER_THREAD + i);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let element = visit("paris", "ana");
    let total = THREADS * PER_THREAD;
    assert_eq!(catalog.query("USER", &element, 0, total).unwrap(), total);
    assert_eq!(catalog.query("CITY_USER", &element, 0, total).unwrap(), total);
    assert_eq!(catalog.count("CITY_USER", &element, 0, total).unwrap(), 1);
    assert_eq!(catalog.accumulate("CITY_USER", &element, 0, total).unwrap(), total);
    assert_eq!(catalog.metrics().snapshot().observations_indexed, total * 2);
}

/// Threads inserting disjoint users all land under one shared city branch.
#[test]
fn test_distinct_users_share_branch() {
    let catalog = visit_catalog(CatalogConfig::sequential());
    let mut handles = vec![];

    for t in 0..THREADS {
        let catalog = Arc::clone(&catalog);
        handles.push(thread::spawn(move || {
            for i in 0..PER_THREAD {
                let user = format!("user-{}-{}", t, i % 10);
                catalog.add(&visit("lima", &user), i);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let lookup = visit("lima", "anyone");
    let users = THREADS * 10;
    assert_eq!(catalog.count("CITY_USER", &lookup, 0, PER_THREAD).unwrap(), users);
    assert_eq!(
        catalog.accumulate("CITY_USER", &lookup, 0, PER_THREAD).unwrap(),
        THREADS * PER_THREAD
    );
    assert_eq!(
        catalog
            .count_keys("CITY_USER", KeySequence::of(["lima".to_string()]), 0, PER_THREAD)
            .unwrap(),
        users
    );
}

/// Queries running during insertion never exceed the final answer and are
/// monotonic per reader.
#[test]
fn test_queries_during_insertion() {
    let catalog = visit_catalog(CatalogConfig::default());
    let element = visit("oslo", "ivo");

    let writer = {
        let catalog = Arc::clone(&catalog);
        let element = element.clone();
        thread::spawn(move || {
            for i in 0..PER_THREAD * 4 {
                catalog.add(&element, i);
            }
        })
    };

    let reader = {
        let catalog = Arc::clone(&catalog);
        let element = element.clone();
        thread::spawn(move || {
            let mut last = 0;
            for _ in 0..200 {
                let seen = catalog.query("USER", &element, 0, u64::MAX).unwrap();
                assert!(seen >= last);
                assert!(seen <= PER_THREAD * 4);
                last = seen;
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(
        catalog.query("USER", &element, 0, u64::MAX).unwrap(),
        PER_THREAD * 4
    );
}

/// Cross products evaluated from many threads agree with each other.
#[test]
fn test_concurrent_cross_products() {
    let catalog = visit_catalog(CatalogConfig::default());
    for i in 0..100u64 {
        catalog.add(&visit("rome", &format!("u{}", i % 7)), i);
    }

    let ranges: Vec<QueryRange<u64>> = (0..10).map(|s| QueryRange::new(s * 10, s * 10 + 9)).collect();
    let ranges = Arc::new(ranges);
    let expected = catalog.count_all(&visit("rome", "u0"), &ranges);

    let mut handles = vec![];
    for _ in 0..THREADS {
        let catalog = Arc::clone(&catalog);
        let ranges = Arc::clone(&ranges);
        handles.push(thread::spawn(move || {
            catalog.count_all(&visit("rome", "u0"), &ranges)
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert_eq!(expected.len(), 20);
}

/// Concurrent definitions of one id admit exactly one winner.
#[test]
fn test_concurrent_define_single_winner() {
    let catalog: Arc<Catalog<Visit, String, u64>> = Arc::new(Catalog::new());
    let mut handles = vec![];

    for _ in 0..THREADS {
        let catalog = Arc::clone(&catalog);
        handles.push(thread::spawn(move || {
            catalog
                .define("USER", |v: &Visit| KeySequence::of([v.user.clone()]))
                .is_ok()
        }));
    }

    let winners = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(catalog.len(), 1);

    let snapshot = catalog.metrics().snapshot();
    assert_eq!(snapshot.indices_defined, 1);
    assert_eq!(snapshot.definitions_rejected, THREADS - 1);
    assert_eq!(snapshot.insertions_rejected, 0);
}
