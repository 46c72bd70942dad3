//! WAL replication test harness
//!
//! This crate implements the replication callbacks a storage engine invokes
//! around every write transaction, instrumented for tests:
//!
//! - State machine: Begin, Abort, Frames, Undo, End with protocol checks
//! - Frame ledger: every frame seen since the last reset, newest first
//! - Failure injector: makes a chosen callback fail with a chosen code
//! - Follower forwarding: frame batches and undo passed to a second handle
//! - Descriptor and registry: the harness under the names "test" and "test-alt"
//! - Testing utilities: in-memory follower and an engine-side commit driver
//!
//! Only one transaction drives a context at a time; the context is owned by
//! the test and handed to each callback by `&mut`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffers; // Contiguous page-number and page-image buffers for forwarding
pub mod config; // HarnessConfig and validation
pub mod context; // ReplicationContext: state, injector, follower, ledger
pub mod descriptor; // WalReplication trait and the harness descriptors
pub mod follower; // Follower trait
pub mod injector; // FailureInjector
pub mod ledger; // FrameLedger and snapshots
mod machine; // Callback implementations on ReplicationContext
pub mod registry; // Name-keyed descriptor registry
pub mod state; // ReplicationState and the transition table
pub mod testing; // MemoryFollower and CommitDriver

pub use buffers::ForwardBuffers;
pub use config::{ConfigError, HarnessConfig};
pub use context::ReplicationContext;
pub use descriptor::{
    ReplicationDescriptor, TestReplication, WalReplication, TEST_REPLICATION,
    TEST_REPLICATION_ALT,
};
pub use follower::Follower;
pub use injector::{FailureInjector, UNLIMITED_FAILURES};
pub use ledger::{FrameLedger, LedgerSnapshot};
pub use registry::{RegistryError, ReplicationRegistry};
pub use state::{Callback, ReplicationState};

pub use walrep_core::{
    to_raw_code, ErrorCode, FailPoint, FollowerOp, FrameBatch, FrameInfo, PageNumber,
    ReplicationError, ReplicationResult, WalFrame,
};
