//! Core types for the WAL replication harness
//!
//! This crate defines the vocabulary shared by the replication state machine,
//! its followers, and the tests that drive them:
//! - ErrorCode: Nonzero storage engine result code
//! - ReplicationError: Error type returned by replication callbacks
//! - WalFrame: One page image handed to the Frames callback
//! - FrameInfo: Ledger record of a frame that was observed
//! - FrameBatch: Packed frame batch forwarded to a follower
//! - FailPoint: Callback the failure injector can target

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{to_raw_code, ErrorCode, FollowerOp, ReplicationError, ReplicationResult};
pub use types::{FailPoint, FrameBatch, FrameInfo, PageNumber, WalFrame};
