//! Frame ledger
//!
//! Append-only record of every frame the Frames callback observed since the
//! last context reset, read newest-first. The state machine only ever
//! appends to it; nothing in the commit path reads it back.

use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;
use walrep_core::{FrameInfo, PageNumber};

/// Ordered record of observed frames
///
/// Entries are stored in arrival order and exposed newest-first, so index 0
/// is always the most recently observed frame.
#[derive(Debug, Clone, Default)]
pub struct FrameLedger {
    frames: Vec<FrameInfo>,
}

impl FrameLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `additional` frames.
    ///
    /// Lets a caller make sure a whole batch fits before recording any of it.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.frames.try_reserve(additional)
    }

    /// Record a frame as the newest entry.
    pub(crate) fn record(&mut self, info: FrameInfo) {
        self.frames.push(info);
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if no frames were recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate frames, newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &FrameInfo> + ExactSizeIterator {
        self.frames.iter().rev()
    }

    /// Most recently recorded frame.
    pub fn newest(&self) -> Option<&FrameInfo> {
        self.frames.last()
    }

    /// Frame at `index`, where 0 is the newest.
    pub fn get(&self, index: usize) -> Option<&FrameInfo> {
        let len = self.frames.len();
        if index >= len {
            return None;
        }
        self.frames.get(len - 1 - index)
    }

    /// Page numbers of all recorded frames, newest first.
    pub fn page_numbers(&self) -> Vec<PageNumber> {
        self.iter().map(|f| f.page_number).collect()
    }

    /// Frames that wrote `page_number`, newest first.
    pub fn frames_for_page(&self, page_number: PageNumber) -> Vec<&FrameInfo> {
        self.iter()
            .filter(|f| f.page_number == page_number)
            .collect()
    }

    /// Serializable copy of the ledger.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            frames: self.iter().copied().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FrameLedger {
    type Item = &'a FrameInfo;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, FrameInfo>>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter().rev()
    }
}

/// Point-in-time copy of a ledger, newest first
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Recorded frames, newest first
    pub frames: Vec<FrameInfo>,
}
