//! walrep - WAL replication test harness
//!
//! A replication implementation for a storage engine's write-ahead log,
//! built to be driven by tests: it tracks the commit protocol as a state
//! machine, records every frame it sees, injects failures on demand, and can
//! forward frame batches to a follower.
//!
//! # Quick Start
//!
//! ```
//! use walrep::{ErrorCode, FailPoint, ReplicationContext, ReplicationState, WalFrame};
//!
//! let mut ctx = ReplicationContext::new();
//! let page = vec![0u8; 4096];
//!
//! ctx.begin()?;
//! ctx.frames(4096, &[WalFrame::new(1, &page)], 1, true)?;
//! ctx.end()?;
//! assert_eq!(ctx.ledger().len(), 1);
//!
//! // Make the next Frames call fail
//! ctx.injector_mut().arm_times(FailPoint::Frames, ErrorCode::IOERR, 1);
//! ctx.begin()?;
//! assert!(ctx.frames(4096, &[WalFrame::new(2, &page)], 2, true).is_err());
//! assert_eq!(ctx.state(), ReplicationState::Error);
//! # Ok::<(), walrep::ReplicationError>(())
//! ```
//!
//! # Architecture
//!
//! `walrep-core` holds the shared vocabulary (result codes, frames, errors).
//! `walrep-replication` holds the state machine, its descriptors, and the
//! testing utilities. This crate re-exports both.

pub use walrep_replication::*;
