//! Replication lifecycle state
//!
//! State transitions driven by the engine's commit protocol:
//! - `Idle` → `Pending` (begin)
//! - `Pending` → `Idle` (abort, no frames were written)
//! - `Pending`/`Writing` → `Writing` (non-commit frame batch)
//! - `Pending`/`Writing` → `Committed` (commit frame batch)
//! - `Pending`/`Writing`/`Error` → `Undone` (undo)
//! - `Pending`/`Committed`/`Undone` → `Idle` (end)
//! - any failed frames batch → `Error`
//!
//! `Error` may also begin a new transaction so the machine is never stuck.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback of the replication contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Callback {
    /// Transaction begin
    Begin,
    /// Discard a transaction that never wrote frames
    Abort,
    /// Frame batch write
    Frames,
    /// Rollback of written frames
    Undo,
    /// Transaction end
    End,
}

impl Callback {
    /// Lowercase name used in logs and panic messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Callback::Begin => "begin",
            Callback::Abort => "abort",
            Callback::Frames => "frames",
            Callback::Undo => "undo",
            Callback::End => "end",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the replication context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReplicationState {
    /// No transaction active
    #[default]
    Idle,
    /// Transaction begun, no frames written yet
    Pending,
    /// At least one non-commit frame batch written
    Writing,
    /// Commit frame batch written
    Committed,
    /// Transaction rolled back
    Undone,
    /// A callback failed
    Error,
}

impl ReplicationState {
    /// Check if `callback` may be invoked while in this state.
    pub fn accepts(&self, callback: Callback) -> bool {
        use ReplicationState::*;
        match callback {
            Callback::Begin => matches!(self, Idle | Error),
            Callback::Abort => matches!(self, Pending),
            Callback::Frames => matches!(self, Pending | Writing),
            Callback::Undo => matches!(self, Pending | Writing | Error),
            Callback::End => matches!(self, Pending | Committed | Undone),
        }
    }

    /// Check if a transaction slot is open.
    pub fn in_transaction(&self) -> bool {
        !matches!(self, ReplicationState::Idle)
    }

    /// Get the state name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationState::Idle => "idle",
            ReplicationState::Pending => "pending",
            ReplicationState::Writing => "writing",
            ReplicationState::Committed => "committed",
            ReplicationState::Undone => "undone",
            ReplicationState::Error => "error",
        }
    }
}

impl fmt::Display for ReplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
