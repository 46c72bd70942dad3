//! Replication descriptor
//!
//! The storage engine dispatches into a replication implementation through a
//! named descriptor. `WalReplication` is that contract; `TestReplication` is
//! the harness implementation, available under two names so registration can
//! be exercised with more than one entry. Both names drive the same state
//! machine on whatever context they are handed.

use crate::context::ReplicationContext;
use walrep_core::{ReplicationResult, WalFrame};

/// Identity and capability metadata of a replication implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplicationDescriptor {
    /// Interface version (currently 1)
    pub version: i32,
    /// Capability flags (none defined; always 0)
    pub flags: u32,
    /// Registration name
    pub name: &'static str,
}

impl ReplicationDescriptor {
    /// Current interface version.
    pub const VERSION: i32 = 1;

    /// Create a version-1 descriptor with no capability flags.
    pub const fn new(name: &'static str) -> Self {
        Self {
            version: Self::VERSION,
            flags: 0,
            name,
        }
    }
}

/// Callback contract the engine drives during its commit protocol
///
/// Each callback runs to completion on the caller's thread. `Ok(())` is
/// success; an error's `code()` is what the engine surfaces to its caller.
pub trait WalReplication: Send + Sync {
    /// Identity of this implementation.
    fn descriptor(&self) -> &ReplicationDescriptor;

    /// Registration name.
    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// A write transaction is starting.
    fn begin(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()>;

    /// A transaction that wrote no frames is being discarded.
    fn abort(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()>;

    /// A batch of frames is being written.
    fn frames(
        &self,
        ctx: &mut ReplicationContext,
        page_size: u32,
        frames: &[WalFrame<'_>],
        truncate_size: u32,
        is_commit: bool,
    ) -> ReplicationResult<()>;

    /// The transaction is being rolled back.
    fn undo(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()>;

    /// The transaction slot is being released.
    fn end(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()>;
}

/// Harness replication implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestReplication {
    descriptor: ReplicationDescriptor,
}

/// Descriptor registered as "test".
pub const TEST_REPLICATION: TestReplication = TestReplication {
    descriptor: ReplicationDescriptor::new("test"),
};

/// Descriptor registered as "test-alt".
pub const TEST_REPLICATION_ALT: TestReplication = TestReplication {
    descriptor: ReplicationDescriptor::new("test-alt"),
};

impl TestReplication {
    /// The implementation registered as "test".
    pub const fn primary() -> Self {
        TEST_REPLICATION
    }

    /// The same implementation under the name "test-alt".
    pub const fn alt() -> Self {
        TEST_REPLICATION_ALT
    }
}

impl WalReplication for TestReplication {
    fn descriptor(&self) -> &ReplicationDescriptor {
        &self.descriptor
    }

    fn begin(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()> {
        ctx.begin()
    }

    fn abort(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()> {
        ctx.abort();
        Ok(())
    }

    fn frames(
        &self,
        ctx: &mut ReplicationContext,
        page_size: u32,
        frames: &[WalFrame<'_>],
        truncate_size: u32,
        is_commit: bool,
    ) -> ReplicationResult<()> {
        ctx.frames(page_size, frames, truncate_size, is_commit)
    }

    fn undo(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()> {
        ctx.undo()
    }

    fn end(&self, ctx: &mut ReplicationContext) -> ReplicationResult<()> {
        ctx.end()
    }
}
