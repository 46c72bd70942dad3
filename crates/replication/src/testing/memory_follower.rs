//! In-memory follower
//!
//! Emulates the WAL of a follower connection: a begin batch opens a write
//! transaction, frames are staged, a commit batch publishes the staged pages
//! and the new database size, and undo drops whatever is staged. Cloning the
//! handle shares the state, so a test can keep one clone for assertions
//! while another is attached to the context.

use crate::follower::Follower;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use walrep_core::{ErrorCode, FrameBatch, PageNumber};

/// Header of one batch received by a [`MemoryFollower`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    /// Schema the batch was addressed to
    pub schema: String,
    /// First batch of its transaction
    pub is_begin: bool,
    /// Page size in bytes
    pub page_size: u32,
    /// Page numbers, in batch order
    pub page_numbers: Vec<PageNumber>,
    /// Database size in pages after commit
    pub truncate_size: u32,
    /// Last batch of its transaction
    pub is_commit: bool,
}

#[derive(Debug, Default)]
struct FollowerState {
    committed: BTreeMap<PageNumber, Vec<u8>>,
    staged: Option<BTreeMap<PageNumber, Vec<u8>>>,
    database_size: u32,
    batches: Vec<BatchRecord>,
    apply_calls: usize,
    undo_calls: usize,
    commits: usize,
    fail_next_apply: Option<ErrorCode>,
    fail_next_undo: Option<ErrorCode>,
}

/// Follower backed by an in-memory page map
#[derive(Debug, Clone)]
pub struct MemoryFollower {
    schema: Arc<str>,
    state: Arc<Mutex<FollowerState>>,
}

impl MemoryFollower {
    /// Create an empty follower serving `schema`.
    pub fn new(schema: &str) -> Self {
        MemoryFollower {
            schema: Arc::from(schema),
            state: Arc::new(Mutex::new(FollowerState::default())),
        }
    }

    /// Schema this follower serves.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Fail the next `apply_frames` call with `code`, leaving state untouched.
    pub fn fail_next_apply(&self, code: ErrorCode) {
        self.state.lock().fail_next_apply = Some(code);
    }

    /// Fail the next `undo` call with `code`, leaving state untouched.
    pub fn fail_next_undo(&self, code: ErrorCode) {
        self.state.lock().fail_next_undo = Some(code);
    }

    /// Committed image of `page_number`.
    pub fn page(&self, page_number: PageNumber) -> Option<Vec<u8>> {
        self.state.lock().committed.get(&page_number).cloned()
    }

    /// Committed page numbers, ascending.
    pub fn committed_pages(&self) -> Vec<PageNumber> {
        self.state.lock().committed.keys().copied().collect()
    }

    /// Database size in pages as of the last commit.
    pub fn database_size(&self) -> u32 {
        self.state.lock().database_size
    }

    /// Check if a write transaction is open.
    pub fn has_open_transaction(&self) -> bool {
        self.state.lock().staged.is_some()
    }

    /// Every batch received, oldest first, including rejected ones.
    pub fn batches(&self) -> Vec<BatchRecord> {
        self.state.lock().batches.clone()
    }

    /// Number of `apply_frames` calls.
    pub fn apply_calls(&self) -> usize {
        self.state.lock().apply_calls
    }

    /// Number of `undo` calls.
    pub fn undo_calls(&self) -> usize {
        self.state.lock().undo_calls
    }

    /// Number of committed transactions.
    pub fn commits(&self) -> usize {
        self.state.lock().commits
    }
}

impl Follower for MemoryFollower {
    fn apply_frames(&mut self, schema: &str, batch: &FrameBatch<'_>) -> Result<(), ErrorCode> {
        let mut state = self.state.lock();
        state.apply_calls += 1;
        state.batches.push(BatchRecord {
            schema: schema.to_string(),
            is_begin: batch.is_begin,
            page_size: batch.page_size,
            page_numbers: batch.page_numbers.to_vec(),
            truncate_size: batch.truncate_size,
            is_commit: batch.is_commit,
        });

        if let Some(code) = state.fail_next_apply.take() {
            return Err(code);
        }
        if schema != &*self.schema {
            return Err(ErrorCode::ERROR);
        }

        let mut staged = match (batch.is_begin, state.staged.take()) {
            (true, None) => BTreeMap::new(),
            (false, Some(staged)) => staged,
            (true, Some(staged)) => {
                state.staged = Some(staged);
                return Err(ErrorCode::MISUSE);
            }
            (false, None) => return Err(ErrorCode::MISUSE),
        };
        for (page_number, image) in batch.frames() {
            staged.insert(page_number, image.to_vec());
        }

        if batch.is_commit {
            state.committed.extend(staged);
            state.committed.retain(|&pgno, _| pgno <= batch.truncate_size);
            state.database_size = batch.truncate_size;
            state.commits += 1;
        } else {
            state.staged = Some(staged);
        }
        Ok(())
    }

    fn undo(&mut self, schema: &str) -> Result<(), ErrorCode> {
        let mut state = self.state.lock();
        state.undo_calls += 1;

        if let Some(code) = state.fail_next_undo.take() {
            return Err(code);
        }
        if schema != &*self.schema {
            return Err(ErrorCode::ERROR);
        }
        state.staged.take().map(|_| ()).ok_or(ErrorCode::MISUSE)
    }
}
