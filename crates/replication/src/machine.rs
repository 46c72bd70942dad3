//! Replication state machine
//!
//! One method per point in the engine's commit protocol. Each checks that
//! the callback arrived in a legal state, consults the failure injector,
//! optionally forwards to the follower, and moves the context to its next
//! state. See `state.rs` for the transition table.

use crate::buffers::ForwardBuffers;
use crate::context::ReplicationContext;
use crate::state::{Callback, ReplicationState};
use tracing::{trace, warn};
use walrep_core::{
    FailPoint, FollowerOp, FrameInfo, ReplicationError, ReplicationResult, WalFrame,
};

impl ReplicationContext {
    /// Start a transaction.
    ///
    /// Legal from `Idle` or `Error`. An injected failure leaves the state
    /// unchanged; success moves to `Pending`.
    pub fn begin(&mut self) -> ReplicationResult<()> {
        self.expect_state(Callback::Begin);
        if let Some(code) = self.injector.fire(FailPoint::Begin) {
            return Err(ReplicationError::Injected {
                point: FailPoint::Begin,
                code,
            });
        }
        self.transition(Callback::Begin, ReplicationState::Pending);
        Ok(())
    }

    /// Discard a transaction that never wrote frames.
    ///
    /// Legal only from `Pending`. Always succeeds.
    pub fn abort(&mut self) {
        self.expect_state(Callback::Abort);
        self.transition(Callback::Abort, ReplicationState::Idle);
    }

    /// Write a batch of frames.
    ///
    /// Legal from `Pending` or `Writing`. Every frame is recorded in the
    /// ledger before anything can fail. The batch is the first of its
    /// transaction when entered from `Pending`, and the follower sees it
    /// flagged as such. Success moves to `Committed` for a commit batch and
    /// to `Writing` otherwise; any failure moves to `Error`.
    ///
    /// # Panics
    ///
    /// If the page size is outside the configured range or a frame image is
    /// not exactly one page long.
    pub fn frames(
        &mut self,
        page_size: u32,
        frames: &[WalFrame<'_>],
        truncate_size: u32,
        is_commit: bool,
    ) -> ReplicationResult<()> {
        self.expect_state(Callback::Frames);
        assert!(
            self.config.accepts_page_size(page_size),
            "replication protocol violation: page size {} not accepted",
            page_size
        );
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(
                frame.data.len(),
                page_size as usize,
                "replication protocol violation: frame {} image is not one page",
                i
            );
        }

        let result = self
            .record_frames(page_size, frames)
            .and_then(|is_begin| {
                self.forward_frames(page_size, frames, is_begin, truncate_size, is_commit)
            });

        match result {
            Ok(()) => {
                let next = if is_commit {
                    ReplicationState::Committed
                } else {
                    ReplicationState::Writing
                };
                self.transition(Callback::Frames, next);
                Ok(())
            }
            Err(e) => {
                self.transition(Callback::Frames, ReplicationState::Error);
                Err(e)
            }
        }
    }

    /// Append the batch to the ledger, newest last in arrival order.
    ///
    /// Room for the whole batch is reserved first, so a failed allocation
    /// or a full ledger records nothing. Returns whether this is the first
    /// batch of the transaction.
    fn record_frames(&mut self, page_size: u32, frames: &[WalFrame<'_>]) -> ReplicationResult<bool> {
        let oom = ReplicationError::OutOfMemory {
            requested: frames.len().saturating_mul(std::mem::size_of::<FrameInfo>()),
        };
        if let Some(limit) = self.config.ledger_frame_limit {
            if self.ledger.len().saturating_add(frames.len()) > limit {
                warn!(target: "walrep::replication", limit, "Frame ledger full");
                return Err(oom);
            }
        }
        self.ledger.try_reserve(frames.len()).map_err(|_| oom)?;
        for frame in frames {
            trace!(
                target: "walrep::replication",
                page_number = frame.page_number,
                previous_frame = ?frame.previous_frame,
                "Frame recorded"
            );
            self.ledger.record(FrameInfo::from_frame(page_size, frame));
        }
        Ok(self.state == ReplicationState::Pending)
    }

    fn forward_frames(
        &mut self,
        page_size: u32,
        frames: &[WalFrame<'_>],
        is_begin: bool,
        truncate_size: u32,
        is_commit: bool,
    ) -> ReplicationResult<()> {
        if let Some(code) = self.injector.fire(FailPoint::Frames) {
            return Err(ReplicationError::Injected {
                point: FailPoint::Frames,
                code,
            });
        }
        let Some(link) = self.follower.as_mut() else {
            return Ok(());
        };

        let buffers = ForwardBuffers::pack(frames, page_size, self.config.forward_buffer_limit)
            .map_err(|e| {
                warn!(target: "walrep::replication", error = %e, "Forwarding buffers unavailable");
                e
            })?;
        let batch = buffers.batch(is_begin, truncate_size, is_commit);
        link.follower
            .apply_frames(&link.schema, &batch)
            .map_err(|code| {
                warn!(
                    target: "walrep::replication",
                    schema = %link.schema,
                    code = %code,
                    "Follower rejected frames"
                );
                ReplicationError::Follower {
                    operation: FollowerOp::ApplyFrames,
                    code,
                }
            })
    }

    /// Roll back the current transaction.
    ///
    /// Legal from `Pending`, `Writing`, or `Error`. The follower is asked to
    /// undo only when frames were staged but not committed (`Writing`).
    /// Success moves to `Undone`; a failure leaves the state unchanged.
    pub fn undo(&mut self) -> ReplicationResult<()> {
        self.expect_state(Callback::Undo);
        let result = if let Some(code) = self.injector.fire(FailPoint::Undo) {
            Err(ReplicationError::Injected {
                point: FailPoint::Undo,
                code,
            })
        } else {
            self.forward_undo()
        };
        if result.is_ok() {
            self.transition(Callback::Undo, ReplicationState::Undone);
        }
        result
    }

    fn forward_undo(&mut self) -> ReplicationResult<()> {
        if self.state != ReplicationState::Writing {
            return Ok(());
        }
        let Some(link) = self.follower.as_mut() else {
            return Ok(());
        };
        link.follower.undo(&link.schema).map_err(|code| {
            warn!(
                target: "walrep::replication",
                schema = %link.schema,
                code = %code,
                "Follower rejected undo"
            );
            ReplicationError::Follower {
                operation: FollowerOp::Undo,
                code,
            }
        })
    }

    /// Close the transaction slot.
    ///
    /// Legal from `Pending`, `Committed`, or `Undone`. The state returns to
    /// `Idle` before the injector is consulted, so a failing End never
    /// leaves the machine outside `Idle`.
    pub fn end(&mut self) -> ReplicationResult<()> {
        self.expect_state(Callback::End);
        self.transition(Callback::End, ReplicationState::Idle);
        if let Some(code) = self.injector.fire(FailPoint::End) {
            return Err(ReplicationError::Injected {
                point: FailPoint::End,
                code,
            });
        }
        Ok(())
    }
}
