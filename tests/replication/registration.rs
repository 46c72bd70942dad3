//! Registration Tests
//!
//! Lookup in the registry is keyed by name, and every registered name drives
//! the one context it is handed.

use crate::common::*;
use std::sync::Arc;

fn registry() -> ReplicationRegistry {
    init_test_tracing();
    let mut registry = ReplicationRegistry::new();
    registry
        .register(Arc::new(TestReplication::primary()), false)
        .unwrap();
    registry
        .register(Arc::new(TestReplication::alt()), false)
        .unwrap();
    registry
}

#[test]
fn both_names_resolve_to_distinct_entries() {
    let registry = registry();
    let primary = registry.find(Some("test")).unwrap();
    let alt = registry.find(Some("test-alt")).unwrap();

    assert_eq!(primary.descriptor().name, "test");
    assert_eq!(alt.descriptor().name, "test-alt");
    assert_eq!(primary.descriptor().version, alt.descriptor().version);
}

#[test]
fn names_share_the_same_context() {
    let registry = registry();
    let primary = registry.find(Some("test")).unwrap();
    let alt = registry.find(Some("test-alt")).unwrap();
    let mut h = Harness::new();
    let pages = vec![page(1), page(2)];

    primary.begin(&mut h.ctx).unwrap();
    alt.frames(&mut h.ctx, PAGE_SIZE, &frames(&[1], &pages[..1]), 0, false)
        .unwrap();
    primary
        .frames(&mut h.ctx, PAGE_SIZE, &frames(&[2], &pages[1..]), 2, true)
        .unwrap();
    alt.end(&mut h.ctx).unwrap();

    assert_eq!(h.ctx.state(), ReplicationState::Idle);
    assert_eq!(h.ctx.ledger().page_numbers(), vec![2, 1]);
}

#[test]
fn default_lookup_follows_registration() {
    let mut registry = registry();
    assert_eq!(registry.find(None).unwrap().name(), "test");

    registry
        .register(Arc::new(TestReplication::alt()), true)
        .unwrap();
    assert_eq!(registry.find(None).unwrap().name(), "test-alt");
    assert_eq!(registry.names(), vec!["test", "test-alt"]);

    registry.unregister("test-alt").unwrap();
    assert_eq!(registry.find(None).unwrap().name(), "test");
    assert!(registry.find(Some("test-alt")).is_none());
}

#[test]
fn driver_runs_through_registered_entry() {
    let registry = registry();
    let alt = registry.find(Some("test-alt")).unwrap();
    let mut h = Harness::with_follower();

    let mut driver = CommitDriver::new(alt.as_ref(), PAGE_SIZE);
    let outcome = driver.commit(&mut h.ctx, &[images(&[1, 2]), images(&[3])], 3);

    assert!(outcome.is_ok());
    assert_eq!(h.follower().commits(), 1);
    assert_eq!(h.follower().database_size(), 3);
}
