//! Frame and batch types
//!
//! `WalFrame` is what the storage engine hands to the Frames callback,
//! `FrameInfo` is what the harness keeps about it afterwards, and
//! `FrameBatch` is the packed form a follower receives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Database page number (1-based in the storage engine)
pub type PageNumber = u32;

/// Callback that the failure injector can target
///
/// Abort has no fail point: discarding an empty transaction always succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailPoint {
    /// Transaction begin
    Begin,
    /// Frame batch write
    Frames,
    /// Rollback of written frames
    Undo,
    /// Transaction end
    End,
}

impl FailPoint {
    /// All fail points, in commit-protocol order.
    pub const ALL: [FailPoint; 4] = [
        FailPoint::Begin,
        FailPoint::Frames,
        FailPoint::Undo,
        FailPoint::End,
    ];

    /// Lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailPoint::Begin => "begin",
            FailPoint::Frames => "frames",
            FailPoint::Undo => "undo",
            FailPoint::End => "end",
        }
    }
}

impl fmt::Display for FailPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single WAL frame passed to the Frames callback
///
/// The page image is borrowed from the engine for the duration of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalFrame<'a> {
    /// Page this frame writes
    pub page_number: PageNumber,
    /// Most recent earlier frame in the WAL containing the same page
    ///
    /// `None` when this is the first write to the page in the current WAL.
    pub previous_frame: Option<u32>,
    /// Page image, exactly one page in length
    pub data: &'a [u8],
}

impl<'a> WalFrame<'a> {
    /// Create a frame for a page written for the first time in this WAL.
    pub fn new(page_number: PageNumber, data: &'a [u8]) -> Self {
        Self {
            page_number,
            previous_frame: None,
            data,
        }
    }

    /// Set the previous-frame reference (builder pattern).
    pub fn with_previous_frame(mut self, frame: u32) -> Self {
        self.previous_frame = Some(frame);
        self
    }
}

/// Information about a frame observed by the Frames callback
///
/// Immutable once recorded. Used only for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Number of bytes in the frame's page
    pub page_size: u32,
    /// Page number
    pub page_number: PageNumber,
    /// Most recent earlier frame also containing `page_number`, or `None` if new
    pub previous_frame: Option<u32>,
}

impl FrameInfo {
    /// Record the observable parts of a frame.
    pub fn from_frame(page_size: u32, frame: &WalFrame<'_>) -> Self {
        Self {
            page_size,
            page_number: frame.page_number,
            previous_frame: frame.previous_frame,
        }
    }

    /// Check if this was the first write to its page in the WAL.
    pub fn is_first_write(&self) -> bool {
        self.previous_frame.is_none()
    }
}

/// A frame batch packed for a follower
///
/// `page_numbers` holds exactly `frame_count` entries and `pages` holds
/// exactly `page_size * frame_count` bytes, page `i` at offset
/// `i * page_size`.
#[derive(Debug, Clone, Copy)]
pub struct FrameBatch<'a> {
    /// First batch of a transaction on the leader
    pub is_begin: bool,
    /// Page size in bytes
    pub page_size: u32,
    /// Number of frames in the batch
    pub frame_count: usize,
    /// Page numbers, one per frame
    pub page_numbers: &'a [PageNumber],
    /// Contiguous page images
    pub pages: &'a [u8],
    /// Database size in pages after a commit, 0 otherwise
    pub truncate_size: u32,
    /// Batch ends the transaction
    pub is_commit: bool,
}

impl<'a> FrameBatch<'a> {
    /// Iterate `(page_number, page_image)` pairs in batch order.
    pub fn frames(&self) -> impl Iterator<Item = (PageNumber, &'a [u8])> + 'a {
        let page_size = self.page_size as usize;
        let pages = self.pages;
        let page_numbers = self.page_numbers;
        page_numbers
            .iter()
            .enumerate()
            .map(move |(i, pgno)| (*pgno, &pages[i * page_size..(i + 1) * page_size]))
    }
}
