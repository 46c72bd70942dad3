//! Error types for replication callbacks
//!
//! Callbacks report failure to the storage engine as a nonzero result code.
//! `ReplicationError` keeps the reason the code was produced so tests can
//! tell an injected failure from a follower failure or an allocation failure,
//! while `ErrorCode` is what finally crosses the callback boundary.

use crate::types::FailPoint;
use std::fmt;
use std::num::NonZeroI32;
use thiserror::Error;

/// Result type alias for replication callbacks
pub type ReplicationResult<T> = std::result::Result<T, ReplicationError>;

/// Storage engine result code
///
/// Success is represented by `Ok(())` at the callback boundary, so an
/// `ErrorCode` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(NonZeroI32);

const fn code(raw: i32) -> ErrorCode {
    match NonZeroI32::new(raw) {
        Some(value) => ErrorCode(value),
        None => panic!("result code 0 is reserved for success"),
    }
}

impl ErrorCode {
    /// Generic error
    pub const ERROR: ErrorCode = code(1);
    /// Internal logic error
    pub const INTERNAL: ErrorCode = code(2);
    /// Access permission denied
    pub const PERM: ErrorCode = code(3);
    /// Operation aborted
    pub const ABORT: ErrorCode = code(4);
    /// Database file is locked
    pub const BUSY: ErrorCode = code(5);
    /// A table in the database is locked
    pub const LOCKED: ErrorCode = code(6);
    /// Memory allocation failed
    pub const NOMEM: ErrorCode = code(7);
    /// Attempt to write a readonly database
    pub const READONLY: ErrorCode = code(8);
    /// Disk I/O error
    pub const IOERR: ErrorCode = code(10);
    /// Database image is malformed
    pub const CORRUPT: ErrorCode = code(11);
    /// Insertion failed because the database is full
    pub const FULL: ErrorCode = code(13);
    /// Interface used incorrectly
    pub const MISUSE: ErrorCode = code(21);

    /// Wrap a raw result code, returning `None` for 0 (success).
    pub fn new(raw: i32) -> Option<Self> {
        NonZeroI32::new(raw).map(ErrorCode)
    }

    /// Raw integer value of the code.
    pub fn raw(self) -> i32 {
        self.0.get()
    }

    /// Symbolic name of the primary code, if it is one the harness knows.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.raw() & 0xff {
            1 => "ERROR",
            2 => "INTERNAL",
            3 => "PERM",
            4 => "ABORT",
            5 => "BUSY",
            6 => "LOCKED",
            7 => "NOMEM",
            8 => "READONLY",
            10 => "IOERR",
            11 => "CORRUPT",
            13 => "FULL",
            21 => "MISUSE",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.raw()),
            None => write!(f, "{}", self.raw()),
        }
    }
}

/// Follower entry point that produced a forwarded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowerOp {
    /// Frame application (`apply_frames`)
    ApplyFrames,
    /// Write transaction rollback (`undo`)
    Undo,
}

impl fmt::Display for FollowerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowerOp::ApplyFrames => f.write_str("apply_frames"),
            FollowerOp::Undo => f.write_str("undo"),
        }
    }
}

/// Error returned by a replication callback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// Deliberate, test-controlled failure
    #[error("injected failure at {point}: {code}")]
    Injected {
        /// Callback the failure was injected into
        point: FailPoint,
        /// Code configured on the injector
        code: ErrorCode,
    },

    /// Ledger or forwarding buffer allocation failed
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory {
        /// Bytes the allocation asked for
        requested: usize,
    },

    /// Error passed through unchanged from the follower
    #[error("follower {operation} failed: {code}")]
    Follower {
        /// Follower entry point that failed
        operation: FollowerOp,
        /// Code returned by the follower
        code: ErrorCode,
    },
}

impl ReplicationError {
    /// Result code the storage engine sees for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReplicationError::Injected { code, .. } => *code,
            ReplicationError::OutOfMemory { .. } => ErrorCode::NOMEM,
            ReplicationError::Follower { code, .. } => *code,
        }
    }

    /// Check if the failure was injected by the harness.
    pub fn is_injected(&self) -> bool {
        matches!(self, ReplicationError::Injected { .. })
    }
}

/// Convert a callback result to the raw "0 means success" convention.
pub fn to_raw_code(result: &ReplicationResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code().raw(),
    }
}
