//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use walrep::testing::{BatchRecord, CommitDriver, CommitOutcome, MemoryFollower, PageImage};
pub use walrep::{
    to_raw_code, Callback, ErrorCode, FailPoint, FollowerOp, FrameInfo, HarnessConfig,
    ReplicationContext, ReplicationError, ReplicationRegistry, ReplicationState,
    TestReplication, WalFrame, WalReplication, UNLIMITED_FAILURES,
};

/// Page size used by most scenarios.
pub const PAGE_SIZE: u32 = 4096;

// ============================================================================
// Initialization
// ============================================================================

/// Route harness logs to the test writer; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ============================================================================
// Harness - context plus an observing follower
// ============================================================================

/// Context configured for tests, optionally with a follower attached.
pub struct Harness {
    pub ctx: ReplicationContext,
    pub follower: Option<MemoryFollower>,
}

impl Harness {
    /// Context with no follower.
    pub fn new() -> Self {
        init_test_tracing();
        let ctx = ReplicationContext::with_config(HarnessConfig::for_testing())
            .expect("testing config is valid");
        Harness {
            ctx,
            follower: None,
        }
    }

    /// Context forwarding to a MemoryFollower on "main".
    pub fn with_follower() -> Self {
        let mut harness = Self::new();
        let follower = MemoryFollower::new("main");
        harness.ctx.attach_follower(follower.clone());
        harness.follower = Some(follower);
        harness
    }

    /// Observing handle of the attached follower.
    pub fn follower(&self) -> &MemoryFollower {
        self.follower.as_ref().expect("harness has no follower")
    }
}

// ============================================================================
// Page helpers
// ============================================================================

/// One page of `PAGE_SIZE` bytes filled with `fill`.
pub fn page(fill: u8) -> Vec<u8> {
    vec![fill; PAGE_SIZE as usize]
}

/// Page images for `page_numbers`, each filled with its own number.
pub fn images(page_numbers: &[u32]) -> Vec<PageImage> {
    page_numbers
        .iter()
        .map(|&n| PageImage::filled(n, PAGE_SIZE, n as u8))
        .collect()
}

/// Frames over `pages`, paired positionally with `page_numbers`.
pub fn frames<'a>(page_numbers: &[u32], pages: &'a [Vec<u8>]) -> Vec<WalFrame<'a>> {
    page_numbers
        .iter()
        .zip(pages)
        .map(|(&n, data)| WalFrame::new(n, data))
        .collect()
}
