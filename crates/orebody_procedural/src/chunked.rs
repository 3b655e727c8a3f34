//! # Chunked Passes
//!
//! Applies a prepared classifier to a block slice in bounded batches. The
//! classifier is prepared once from the whole slice, so concatenating the
//! batches equals the whole-slice result.

use std::slice::Chunks;

use orebody_core::{Block, GridBatch, ModelError, ModelResult, Progress};

use crate::classifier::BlockClassifier;

/// Iterator of classified batches. Drive it with
/// [`orebody_core::collect_batches`] or an explicit loop.
pub struct ChunkedPass<'a> {
    classifier: Box<dyn BlockClassifier + 'a>,
    chunks: Chunks<'a, Block>,
    processed: usize,
    total: usize,
}

impl<'a> ChunkedPass<'a> {
    /// Creates a pass over `blocks` in batches of at most `chunk_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if `chunk_size` is zero.
    pub fn new(
        classifier: Box<dyn BlockClassifier + 'a>,
        blocks: &'a [Block],
        chunk_size: usize,
    ) -> ModelResult<Self> {
        if chunk_size == 0 {
            return Err(ModelError::invalid("chunk_size", "must be greater than zero"));
        }
        Ok(Self {
            classifier,
            chunks: blocks.chunks(chunk_size),
            processed: 0,
            total: blocks.len(),
        })
    }

    /// Progress so far.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        Progress {
            processed: self.processed,
            total: self.total,
        }
    }
}

impl Iterator for ChunkedPass<'_> {
    type Item = GridBatch;

    fn next(&mut self) -> Option<GridBatch> {
        let chunk = self.chunks.next()?;
        self.processed += chunk.len();
        Some(GridBatch {
            blocks: self.classifier.apply(chunk),
            progress: self.progress(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}
