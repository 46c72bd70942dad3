//! Forwarding buffers for follower frame application
//!
//! A frame batch reaches the follower as two contiguous buffers: one page
//! number per frame and the page images laid end to end. Both are sized
//! exactly from the batch and owned by a `ForwardBuffers` value scoped to a
//! single Frames call, so they are released on every exit path.

use std::collections::TryReserveError;
use walrep_core::{FrameBatch, PageNumber, ReplicationError, ReplicationResult, WalFrame};

/// Packed page numbers and page images for one frame batch
#[derive(Debug)]
pub struct ForwardBuffers {
    page_size: u32,
    page_numbers: Vec<PageNumber>,
    pages: Vec<u8>,
}

impl ForwardBuffers {
    /// Bytes needed to pack `frame_count` frames of `page_size` bytes.
    ///
    /// Returns `None` if the size does not fit in `usize`.
    pub fn required_bytes(page_size: u32, frame_count: usize) -> Option<usize> {
        let numbers = frame_count.checked_mul(std::mem::size_of::<PageNumber>())?;
        let images = frame_count.checked_mul(page_size as usize)?;
        numbers.checked_add(images)
    }

    /// Pack `frames` into contiguous buffers.
    ///
    /// Every frame image must be exactly `page_size` bytes. Allocation is
    /// fallible: exceeding `limit` or the allocator's capacity reports
    /// `OutOfMemory` and leaves nothing allocated.
    pub fn pack(
        frames: &[WalFrame<'_>],
        page_size: u32,
        limit: Option<usize>,
    ) -> ReplicationResult<Self> {
        let frame_count = frames.len();
        let requested = Self::required_bytes(page_size, frame_count)
            .ok_or(ReplicationError::OutOfMemory {
                requested: usize::MAX,
            })?;
        if let Some(limit) = limit {
            if requested > limit {
                return Err(ReplicationError::OutOfMemory { requested });
            }
        }

        let oom = |_: TryReserveError| ReplicationError::OutOfMemory { requested };
        let mut page_numbers = Vec::new();
        page_numbers.try_reserve_exact(frame_count).map_err(oom)?;
        let mut pages = Vec::new();
        pages
            .try_reserve_exact(page_size as usize * frame_count)
            .map_err(oom)?;

        for frame in frames {
            debug_assert_eq!(frame.data.len(), page_size as usize);
            page_numbers.push(frame.page_number);
            pages.extend_from_slice(frame.data);
        }

        Ok(Self {
            page_size,
            page_numbers,
            pages,
        })
    }

    /// Number of packed frames.
    pub fn frame_count(&self) -> usize {
        self.page_numbers.len()
    }

    /// Packed page numbers.
    pub fn page_numbers(&self) -> &[PageNumber] {
        &self.page_numbers
    }

    /// Packed page images.
    pub fn pages(&self) -> &[u8] {
        &self.pages
    }

    /// Borrow the buffers as a follower batch.
    pub fn batch(&self, is_begin: bool, truncate_size: u32, is_commit: bool) -> FrameBatch<'_> {
        FrameBatch {
            is_begin,
            page_size: self.page_size,
            frame_count: self.page_numbers.len(),
            page_numbers: &self.page_numbers,
            pages: &self.pages,
            truncate_size,
            is_commit,
        }
    }
}
