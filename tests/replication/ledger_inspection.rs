//! Ledger Inspection Tests
//!
//! What a test can read back from the frame ledger after a run.

use crate::common::*;
use serde_json::json;

#[test]
fn previous_frame_links_rewrites_of_a_page() {
    let mut h = Harness::new();
    let replication = TestReplication::primary();
    let mut driver = CommitDriver::new(&replication, PAGE_SIZE);

    assert!(driver.commit(&mut h.ctx, &[images(&[1, 2])], 2).is_ok());
    assert!(driver.commit(&mut h.ctx, &[images(&[2, 3])], 3).is_ok());

    let writes = h.ctx.ledger().frames_for_page(2);
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].previous_frame, Some(2));
    assert!(writes[1].is_first_write());
    assert!(h.ctx.ledger().newest().unwrap().is_first_write());
}

#[test]
fn snapshot_serializes_newest_first() {
    let mut h = Harness::new();
    let pages = vec![vec![0u8; 1024], vec![0u8; 1024]];

    h.ctx.begin().unwrap();
    let batch = [
        WalFrame::new(7, &pages[0]),
        WalFrame::new(8, &pages[1]).with_previous_frame(1),
    ];
    h.ctx.frames(1024, &batch, 8, true).unwrap();
    h.ctx.end().unwrap();

    let value = serde_json::to_value(h.ctx.ledger().snapshot()).unwrap();
    assert_eq!(
        value,
        json!({
            "frames": [
                { "page_size": 1024, "page_number": 8, "previous_frame": 1 },
                { "page_size": 1024, "page_number": 7, "previous_frame": null },
            ]
        })
    );
}

#[test]
fn failed_batches_stay_in_ledger() {
    let mut h = Harness::new();
    h.ctx.injector_mut().arm(FailPoint::Frames, ErrorCode::IOERR);
    let replication = TestReplication::primary();
    let mut driver = CommitDriver::new(&replication, PAGE_SIZE);

    for n in 1..=4 {
        assert!(!driver.commit(&mut h.ctx, &[images(&[n])], n).is_ok());
    }
    assert_eq!(h.ctx.ledger().page_numbers(), vec![4, 3, 2, 1]);
}

#[test]
fn out_of_memory_keeps_recorded_frames() {
    init_test_tracing();
    let follower = MemoryFollower::new("main");
    let config = HarnessConfig::new().with_forward_buffer_limit(2 * PAGE_SIZE as usize);
    let mut ctx = ReplicationContext::with_config(config).unwrap();
    ctx.attach_follower(follower.clone());
    let pages = vec![page(1), page(2), page(3)];

    ctx.begin().unwrap();
    ctx.frames(PAGE_SIZE, &frames(&[1], &pages[..1]), 0, false)
        .unwrap();
    let err = ctx
        .frames(PAGE_SIZE, &frames(&[2, 3], &pages[1..]), 3, true)
        .unwrap_err();

    assert!(matches!(err, ReplicationError::OutOfMemory { .. }));
    assert_eq!(err.code(), ErrorCode::NOMEM);
    assert_eq!(ctx.ledger().page_numbers(), vec![3, 2, 1]);
    assert_eq!(follower.apply_calls(), 1);
}

#[test]
fn ledger_iterates_in_both_directions() {
    let mut h = Harness::new();
    let replication = TestReplication::primary();
    let mut driver = CommitDriver::new(&replication, PAGE_SIZE);
    assert!(driver.commit(&mut h.ctx, &[images(&[1, 2, 3])], 3).is_ok());

    let newest_first: Vec<u32> = h.ctx.ledger().iter().map(|f| f.page_number).collect();
    let oldest_first: Vec<u32> = h.ctx.ledger().iter().rev().map(|f| f.page_number).collect();
    assert_eq!(newest_first, vec![3, 2, 1]);
    assert_eq!(oldest_first, vec![1, 2, 3]);
    assert_eq!(h.ctx.ledger().get(2).unwrap().page_number, 1);
    assert!(h.ctx.ledger().get(3).is_none());
}
