//! Testing utilities for replication
//!
//! - **MemoryFollower**: in-memory replication target with scripted failures
//! - **CommitDriver**: plays the engine's commit protocol against a descriptor
//!
//! # Example
//!
//! ```
//! use walrep_replication::testing::{CommitDriver, MemoryFollower, PageImage};
//! use walrep_replication::{ReplicationContext, TestReplication};
//!
//! let follower = MemoryFollower::new("main");
//! let mut ctx = ReplicationContext::new();
//! ctx.attach_follower(follower.clone());
//!
//! let replication = TestReplication::primary();
//! let mut driver = CommitDriver::new(&replication, 4096);
//! let outcome = driver.commit(&mut ctx, &[vec![PageImage::filled(1, 4096, 0xab)]], 1);
//!
//! assert!(outcome.is_ok());
//! assert_eq!(follower.database_size(), 1);
//! ```

mod driver;
mod memory_follower;

pub use driver::{CommitDriver, CommitOutcome, PageImage};
pub use memory_follower::{BatchRecord, MemoryFollower};
