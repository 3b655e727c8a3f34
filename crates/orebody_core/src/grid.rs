//! # Grid Builder
//!
//! Turns [`GridParams`] into an ordered lattice of waste blocks.
//!
//! ## Ordering
//!
//! Blocks are enumerated with `i` outermost, then `j`, then `k`. Block `n` of
//! the sequence therefore has `i = n / (ny·nz)`, `j = (n / nz) % ny`,
//! `k = n % nz`.
//!
//! ## Large Grids
//!
//! [`GridParams::batches`] yields the same sequence in bounded batches with
//! progress, so an interactive host can interleave its own work between
//! batches. Concatenating the batches gives exactly [`build_grid`]'s output.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::{ModelError, ModelResult};
use crate::math::Vec3;

/// Regular grid definition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Origin X.
    pub x0: f64,
    /// Origin Y.
    pub y0: f64,
    /// Origin Z (top of the model).
    pub z0: f64,
    /// Block size along X.
    pub dx: f64,
    /// Block size along Y.
    pub dy: f64,
    /// Block size along Z.
    pub dz: f64,
    /// Block count along X.
    pub nx: u32,
    /// Block count along Y.
    pub ny: u32,
    /// Block count along Z.
    pub nz: u32,
}

impl GridParams {
    /// Creates grid parameters from origin, increments and counts.
    #[must_use]
    pub const fn new(origin: Vec3, increments: Vec3, counts: [u32; 3]) -> Self {
        Self {
            x0: origin.x,
            y0: origin.y,
            z0: origin.z,
            dx: increments.x,
            dy: increments.y,
            dz: increments.z,
            nx: counts[0],
            ny: counts[1],
            nz: counts[2],
        }
    }

    /// Checks increments and counts.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if any increment is not a
    /// positive finite number, any count is zero, any origin coordinate is
    /// not finite, or the block count overflows `usize`.
    pub fn validate(&self) -> ModelResult<()> {
        for (name, value) in [("x0", self.x0), ("y0", self.y0), ("z0", self.z0)] {
            if !value.is_finite() {
                return Err(ModelError::invalid(name, format!("origin must be finite, got {value}")));
            }
        }
        for (name, value) in [("dx", self.dx), ("dy", self.dy), ("dz", self.dz)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelError::invalid(name, format!("increment must be > 0, got {value}")));
            }
        }
        for (name, value) in [("nx", self.nx), ("ny", self.ny), ("nz", self.nz)] {
            if value == 0 {
                return Err(ModelError::invalid(name, "count must be > 0"));
            }
        }
        self.checked_block_count().map(|_| ())
    }

    fn checked_block_count(&self) -> ModelResult<usize> {
        (self.nx as usize)
            .checked_mul(self.ny as usize)
            .and_then(|n| n.checked_mul(self.nz as usize))
            .ok_or_else(|| ModelError::invalid("nx*ny*nz", "block count overflows"))
    }

    /// Total number of blocks (saturating; call [`Self::validate`] first).
    #[must_use]
    pub fn block_count(&self) -> usize {
        (self.nx as usize)
            .saturating_mul(self.ny as usize)
            .saturating_mul(self.nz as usize)
    }

    /// Volume of one block.
    #[must_use]
    pub fn block_volume(&self) -> f64 {
        self.dx * self.dy * self.dz
    }

    /// Block size as a vector.
    #[must_use]
    pub const fn increments(&self) -> Vec3 {
        Vec3::new(self.dx, self.dy, self.dz)
    }

    /// Centroid of block (i, j, k). Z decreases as `k` increases.
    #[inline]
    #[must_use]
    pub fn centroid(&self, i: u32, j: u32, k: u32) -> Vec3 {
        Vec3::new(
            self.x0 + (f64::from(i) + 0.5) * self.dx,
            self.y0 + (f64::from(j) + 0.5) * self.dy,
            self.z0 - (f64::from(k) + 0.5) * self.dz,
        )
    }

    /// Block at position `n` of the canonical enumeration.
    #[inline]
    fn block_at(&self, n: usize) -> Block {
        let nz = self.nz as usize;
        let ny = self.ny as usize;
        let i = (n / (ny * nz)) as u32;
        let j = ((n / nz) % ny) as u32;
        let k = (n % nz) as u32;
        let c = self.centroid(i, j, k);
        Block::new(i, j, k, c.x, c.y, c.z)
    }

    /// Iterates over every block in canonical order.
    ///
    /// # Errors
    ///
    /// Fails validation exactly like [`build_grid`].
    pub fn blocks(&self) -> ModelResult<GridBlocks> {
        self.validate()?;
        Ok(GridBlocks {
            params: *self,
            next: 0,
            total: self.block_count(),
        })
    }

    /// Iterates over the blocks in batches of at most `batch_size`.
    ///
    /// # Errors
    ///
    /// Fails validation exactly like [`build_grid`], and rejects a zero batch size.
    pub fn batches(&self, batch_size: usize) -> ModelResult<GridBatches> {
        if batch_size == 0 {
            return Err(ModelError::invalid("batch_size", "must be > 0"));
        }
        Ok(GridBatches {
            blocks: self.blocks()?,
            batch_size,
        })
    }
}

/// Builds the full block lattice.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for non-positive increments or
/// zero counts. No blocks are produced on failure.
pub fn build_grid(params: &GridParams) -> ModelResult<Vec<Block>> {
    let blocks: Vec<Block> = params.blocks()?.collect();
    tracing::debug!(
        blocks = blocks.len(),
        nx = params.nx,
        ny = params.ny,
        nz = params.nz,
        "built grid"
    );
    Ok(blocks)
}

/// Iterator over the blocks of a validated grid.
#[derive(Clone, Debug)]
pub struct GridBlocks {
    params: GridParams,
    next: usize,
    total: usize,
}

impl Iterator for GridBlocks {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.next >= self.total {
            return None;
        }
        let block = self.params.block_at(self.next);
        self.next += 1;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridBlocks {}

/// Fractional progress through a batched pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Blocks produced so far (including the current batch).
    pub processed: usize,
    /// Total blocks in the pass.
    pub total: usize,
}

impl Progress {
    /// Completed fraction in [0, 1]. An empty pass is complete.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    /// Returns true once every block has been produced.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// One bounded batch of blocks and the progress after producing it.
#[derive(Clone, Debug)]
pub struct GridBatch {
    /// Blocks in this batch, in canonical order.
    pub blocks: Vec<Block>,
    /// Progress after this batch.
    pub progress: Progress,
}

/// Batched grid builder. See [`GridParams::batches`].
#[derive(Clone, Debug)]
pub struct GridBatches {
    blocks: GridBlocks,
    batch_size: usize,
}

impl Iterator for GridBatches {
    type Item = GridBatch;

    fn next(&mut self) -> Option<GridBatch> {
        let blocks: Vec<Block> = self.blocks.by_ref().take(self.batch_size).collect();
        if blocks.is_empty() {
            return None;
        }
        Some(GridBatch {
            blocks,
            progress: Progress {
                processed: self.blocks.next,
                total: self.blocks.total,
            },
        })
    }
}

/// Drains a batch iterator into one vector, reporting progress after each batch.
pub fn collect_batches<I>(batches: I, mut on_progress: impl FnMut(Progress)) -> Vec<Block>
where
    I: IntoIterator<Item = GridBatch>,
{
    let mut out = Vec::new();
    for mut batch in batches {
        out.append(&mut batch.blocks);
        on_progress(batch.progress);
    }
    out
}
