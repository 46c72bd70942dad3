//! Commit protocol driver
//!
//! Plays the storage engine's side of the replication contract so tests can
//! run whole transactions through a descriptor without a real engine. The
//! driver numbers WAL frames as it writes them and fills in each frame's
//! previous-frame reference, rewinding the numbering when a transaction is
//! rolled back.

use crate::context::ReplicationContext;
use crate::descriptor::WalReplication;
use crate::state::Callback;
use std::collections::HashMap;
use walrep_core::{to_raw_code, PageNumber, ReplicationError, ReplicationResult, WalFrame};

/// Page written by one frame of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Page number
    pub page_number: PageNumber,
    /// Page image, exactly one page long
    pub data: Vec<u8>,
}

impl PageImage {
    /// Create a page image.
    pub fn new(page_number: PageNumber, data: Vec<u8>) -> Self {
        PageImage { page_number, data }
    }

    /// Create a page image of `page_size` bytes all set to `fill`.
    pub fn filled(page_number: PageNumber, page_size: u32, fill: u8) -> Self {
        PageImage {
            page_number,
            data: vec![fill; page_size as usize],
        }
    }
}

/// What a driven transaction did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Callbacks issued, in order
    pub calls: Vec<Callback>,
    /// Result reported to the engine's caller
    pub result: ReplicationResult<()>,
    /// Failures from cleanup callbacks after `result` was already an error
    pub cleanup_errors: Vec<ReplicationError>,
}

impl CommitOutcome {
    /// Check if the transaction succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Result as the raw callback code (0 on success).
    pub fn raw_code(&self) -> i32 {
        to_raw_code(&self.result)
    }
}

#[derive(Debug, Clone, Default)]
struct WalPosition {
    last_frame: u32,
    latest: HashMap<PageNumber, u32>,
}

/// Engine-side driver of the commit protocol
pub struct CommitDriver<'r> {
    replication: &'r dyn WalReplication,
    page_size: u32,
    wal: WalPosition,
}

impl std::fmt::Debug for CommitDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitDriver")
            .field("replication", &self.replication.name())
            .field("page_size", &self.page_size)
            .field("last_frame", &self.wal.last_frame)
            .finish()
    }
}

impl<'r> CommitDriver<'r> {
    /// Create a driver writing `page_size` pages through `replication`.
    pub fn new(replication: &'r dyn WalReplication, page_size: u32) -> Self {
        CommitDriver {
            replication,
            page_size,
            wal: WalPosition::default(),
        }
    }

    /// Page size used for every batch.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the last frame written by a committed transaction (0 if none).
    pub fn last_frame(&self) -> u32 {
        self.wal.last_frame
    }

    /// Run one write transaction.
    ///
    /// Begin, one Frames call per batch with the last one committing at
    /// `database_size` pages, then End. A failed Begin abandons the
    /// transaction. A failed Frames is followed by Undo and End; End is
    /// skipped if Undo fails, leaving the context in `Error`. No batches
    /// means Begin then Abort.
    pub fn commit(
        &mut self,
        ctx: &mut ReplicationContext,
        batches: &[Vec<PageImage>],
        database_size: u32,
    ) -> CommitOutcome {
        let replication = self.replication;
        let mut outcome = CommitOutcome {
            calls: vec![Callback::Begin],
            result: Ok(()),
            cleanup_errors: Vec::new(),
        };
        if let Err(e) = replication.begin(ctx) {
            outcome.result = Err(e);
            return outcome;
        }

        if batches.is_empty() {
            outcome.calls.push(Callback::Abort);
            outcome.result = replication.abort(ctx);
            return outcome;
        }

        let saved = self.wal.clone();
        for (i, batch) in batches.iter().enumerate() {
            let is_commit = i + 1 == batches.len();
            let truncate_size = if is_commit { database_size } else { 0 };
            let frames = self.stage(batch);

            outcome.calls.push(Callback::Frames);
            if let Err(e) = replication.frames(ctx, self.page_size, &frames, truncate_size, is_commit)
            {
                self.wal = saved;
                outcome.result = Err(e);
                self.unwind(ctx, &mut outcome);
                return outcome;
            }
        }

        outcome.calls.push(Callback::End);
        outcome.result = replication.end(ctx);
        outcome
    }

    /// Write `batches` without committing, then roll back.
    ///
    /// Begin, one non-commit Frames call per batch, Undo, End. If Undo
    /// fails the context is left mid-transaction and must be reset.
    pub fn rollback(
        &mut self,
        ctx: &mut ReplicationContext,
        batches: &[Vec<PageImage>],
    ) -> CommitOutcome {
        let replication = self.replication;
        let mut outcome = CommitOutcome {
            calls: vec![Callback::Begin],
            result: Ok(()),
            cleanup_errors: Vec::new(),
        };
        if let Err(e) = replication.begin(ctx) {
            outcome.result = Err(e);
            return outcome;
        }

        let saved = self.wal.clone();
        for batch in batches {
            let frames = self.stage(batch);
            outcome.calls.push(Callback::Frames);
            if let Err(e) = replication.frames(ctx, self.page_size, &frames, 0, false) {
                outcome.result = Err(e);
                break;
            }
        }
        self.wal = saved;

        if outcome.result.is_err() {
            self.unwind(ctx, &mut outcome);
            return outcome;
        }

        outcome.calls.push(Callback::Undo);
        if let Err(e) = replication.undo(ctx) {
            outcome.result = Err(e);
            return outcome;
        }
        outcome.calls.push(Callback::End);
        outcome.result = replication.end(ctx);
        outcome
    }

    /// Undo then End after a failed batch, collecting their failures.
    fn unwind(&self, ctx: &mut ReplicationContext, outcome: &mut CommitOutcome) {
        outcome.calls.push(Callback::Undo);
        if let Err(e) = self.replication.undo(ctx) {
            outcome.cleanup_errors.push(e);
            return;
        }
        outcome.calls.push(Callback::End);
        if let Err(e) = self.replication.end(ctx) {
            outcome.cleanup_errors.push(e);
        }
    }

    /// Assign WAL frame indices to `batch` and link each page to its last frame.
    fn stage<'b>(&mut self, batch: &'b [PageImage]) -> Vec<WalFrame<'b>> {
        batch
            .iter()
            .map(|image| {
                self.wal.last_frame += 1;
                let frame = WalFrame::new(image.page_number, &image.data);
                match self.wal.latest.insert(image.page_number, self.wal.last_frame) {
                    Some(previous) => frame.with_previous_frame(previous),
                    None => frame,
                }
            })
            .collect()
    }
}
