//! Failure Injection Tests
//!
//! The injector makes exactly N calls to its target fail, then goes inert.
//! Each fail point leaves the state machine where the engine can recover.

use crate::common::*;

#[test]
fn n_failures_then_success() {
    let mut h = Harness::new();
    h.ctx
        .injector_mut()
        .arm_times(FailPoint::Begin, ErrorCode::BUSY, 3);

    for _ in 0..3 {
        let err = h.ctx.begin().unwrap_err();
        assert_eq!(err.code(), ErrorCode::BUSY);
        assert_eq!(h.ctx.state(), ReplicationState::Idle);
    }
    h.ctx.begin().unwrap();
    assert_eq!(h.ctx.state(), ReplicationState::Pending);

    assert_eq!(h.ctx.injector().remaining(), 0);
    assert_eq!(h.ctx.injector().fired(), 3);
}

#[test]
fn budget_is_spent_only_on_target() {
    let mut h = Harness::new();
    h.ctx
        .injector_mut()
        .arm_times(FailPoint::End, ErrorCode::LOCKED, 1);
    let pages = vec![page(0)];

    h.ctx.begin().unwrap();
    h.ctx
        .frames(PAGE_SIZE, &frames(&[1], &pages), 1, true)
        .unwrap();
    assert_eq!(h.ctx.injector().remaining(), 1);

    let err = h.ctx.end().unwrap_err();
    assert_eq!(err.code(), ErrorCode::LOCKED);
    assert_eq!(h.ctx.injector().remaining(), 0);
}

#[test]
fn arm_without_count_fails_forever() {
    let mut h = Harness::new();
    h.ctx.injector_mut().arm(FailPoint::Begin, ErrorCode::PERM);

    for _ in 0..100 {
        assert!(h.ctx.begin().is_err());
    }
    assert_eq!(h.ctx.injector().remaining(), UNLIMITED_FAILURES - 100);
}

#[test]
fn disarm_stops_failures() {
    let mut h = Harness::new();
    h.ctx.injector_mut().arm(FailPoint::Begin, ErrorCode::PERM);
    assert!(h.ctx.begin().is_err());

    h.ctx.injector_mut().disarm();
    h.ctx.begin().unwrap();
}

#[test]
fn injected_undo_leaves_state_for_retry() {
    let mut h = Harness::with_follower();
    let pages = vec![page(0)];

    h.ctx.begin().unwrap();
    h.ctx
        .frames(PAGE_SIZE, &frames(&[1], &pages), 0, false)
        .unwrap();
    h.ctx
        .injector_mut()
        .arm_times(FailPoint::Undo, ErrorCode::IOERR, 1);

    let err = h.ctx.undo().unwrap_err();
    assert!(err.is_injected());
    assert_eq!(h.ctx.state(), ReplicationState::Writing);
    assert_eq!(h.follower().undo_calls(), 0);

    h.ctx.undo().unwrap();
    h.ctx.end().unwrap();
    assert_eq!(h.follower().undo_calls(), 1);
}

#[test]
fn error_converts_to_raw_engine_code() {
    let mut h = Harness::new();
    h.ctx
        .injector_mut()
        .arm_times(FailPoint::Begin, ErrorCode::CORRUPT, 1);

    let result = h.ctx.begin();
    assert_eq!(to_raw_code(&result), 11);
    assert_eq!(
        result.unwrap_err(),
        ReplicationError::Injected {
            point: FailPoint::Begin,
            code: ErrorCode::CORRUPT,
        }
    );
    assert_eq!(to_raw_code(&h.ctx.begin()), 0);
}

#[test]
fn reset_twice_matches_reset_once() {
    let mut h = Harness::with_follower();
    let replication = TestReplication::primary();
    let mut driver = CommitDriver::new(&replication, PAGE_SIZE);
    assert!(driver.commit(&mut h.ctx, &[images(&[1, 2])], 2).is_ok());
    h.ctx
        .injector_mut()
        .arm_times(FailPoint::Frames, ErrorCode::FULL, 2);

    h.ctx.reset();
    let once = (
        h.ctx.state(),
        h.ctx.ledger().len(),
        h.ctx.injector().target(),
        h.ctx.injector().remaining(),
        h.ctx.has_follower(),
    );
    h.ctx.reset();
    let twice = (
        h.ctx.state(),
        h.ctx.ledger().len(),
        h.ctx.injector().target(),
        h.ctx.injector().remaining(),
        h.ctx.has_follower(),
    );

    assert_eq!(once, twice);
    assert_eq!(
        once,
        (ReplicationState::Idle, 0, None, UNLIMITED_FAILURES, false)
    );
}

#[test]
fn configured_budget_survives_reset() {
    init_test_tracing();
    let config = HarnessConfig::for_testing().with_default_failure_budget(2);
    let mut ctx = ReplicationContext::with_config(config).unwrap();
    ctx.injector_mut().arm(FailPoint::Begin, ErrorCode::BUSY);
    assert!(ctx.begin().is_err());

    ctx.reset();
    ctx.injector_mut().arm(FailPoint::Begin, ErrorCode::BUSY);
    assert!(ctx.begin().is_err());
    assert!(ctx.begin().is_err());
    ctx.begin().unwrap();
}
