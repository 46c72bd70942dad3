//! Follower forwarding interface
//!
//! A follower is a second storage handle acting as a replication target.
//! When one is attached to the context, committed frame batches and undo
//! requests are forwarded to it and its result codes are passed back to the
//! engine unchanged.

use walrep_core::{ErrorCode, FrameBatch};

/// Replication target that applies frame batches
pub trait Follower {
    /// Apply a frame batch to `schema`.
    fn apply_frames(&mut self, schema: &str, batch: &FrameBatch<'_>) -> Result<(), ErrorCode>;

    /// Roll back the write transaction open on `schema`.
    fn undo(&mut self, schema: &str) -> Result<(), ErrorCode>;
}

impl<F: Follower + ?Sized> Follower for Box<F> {
    fn apply_frames(&mut self, schema: &str, batch: &FrameBatch<'_>) -> Result<(), ErrorCode> {
        (**self).apply_frames(schema, batch)
    }

    fn undo(&mut self, schema: &str) -> Result<(), ErrorCode> {
        (**self).undo(schema)
    }
}

/// Follower handle together with the schema frames are applied to
pub(crate) struct FollowerLink {
    pub(crate) follower: Box<dyn Follower>,
    pub(crate) schema: String,
}

impl std::fmt::Debug for FollowerLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowerLink")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
