//! # Model Bounds
//!
//! Axis-aligned extent of a block slice and an estimate of its cell size.
//! Randomized generators scale their default shapes to these numbers and mix
//! [`ModelBounds::fingerprint`] into their seed.

use crate::block::Block;
use crate::math::Vec3;

/// Bounding box of block centroids plus estimated cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelBounds {
    /// Minimum centroid coordinates.
    pub min: Vec3,
    /// Maximum centroid coordinates.
    pub max: Vec3,
    /// Estimated block size per axis.
    pub cell_size: Vec3,
    /// Number of blocks the bounds were computed from.
    pub block_count: usize,
}

impl ModelBounds {
    /// Computes bounds from a block slice. Returns `None` for an empty slice.
    #[must_use]
    pub fn from_blocks(blocks: &[Block]) -> Option<Self> {
        let first = blocks.first()?;

        let mut min = first.position();
        let mut max = min;
        let (mut min_idx, mut max_idx) = ([first.i, first.j, first.k], [first.i, first.j, first.k]);

        for block in &blocks[1..] {
            let p = block.position();
            min = min.min(p);
            max = max.max(p);
            for (axis, idx) in [block.i, block.j, block.k].into_iter().enumerate() {
                min_idx[axis] = min_idx[axis].min(idx);
                max_idx[axis] = max_idx[axis].max(idx);
            }
        }

        let extent = (max - min).to_array();
        let mut sizes = [None; 3];
        for axis in 0..3 {
            let span = max_idx[axis] - min_idx[axis];
            if span > 0 && extent[axis] > 0.0 {
                sizes[axis] = Some(extent[axis] / f64::from(span));
            }
        }

        // Single-layer axes borrow the mean size of the resolved axes.
        let known: Vec<f64> = sizes.iter().flatten().copied().collect();
        let fallback = if known.is_empty() {
            1.0
        } else {
            known.iter().sum::<f64>() / known.len() as f64
        };
        let cell_size = Vec3::new(
            sizes[0].unwrap_or(fallback),
            sizes[1].unwrap_or(fallback),
            sizes[2].unwrap_or(fallback),
        );

        Some(Self {
            min,
            max,
            cell_size,
            block_count: blocks.len(),
        })
    }

    /// Centre of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size of the bounding box per axis (centroid to centroid).
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Extent including the outer half-cells, floored at one cell per axis.
    ///
    /// Generators use this for default shape sizes so single-layer models
    /// still get non-degenerate bodies.
    #[must_use]
    pub fn span(&self) -> Vec3 {
        self.extent() + self.cell_size
    }

    /// Mean horizontal cell size.
    #[must_use]
    pub fn horizontal_cell(&self) -> f64 {
        (self.cell_size.x + self.cell_size.y) * 0.5
    }

    /// Mean cell size over all three axes.
    #[must_use]
    pub fn mean_cell(&self) -> f64 {
        (self.cell_size.x + self.cell_size.y + self.cell_size.z) / 3.0
    }

    /// Normalized depth of an elevation: 0 at the shallowest centroid, 1 at
    /// the deepest. A model one block thick is all depth 0.
    #[must_use]
    pub fn normalized_depth(&self, z: f64) -> f64 {
        let height = self.max.z - self.min.z;
        if height <= f64::EPSILON {
            0.0
        } else {
            ((self.max.z - z) / height).clamp(0.0, 1.0)
        }
    }

    /// Stable 64-bit digest of the bounds, used to derive per-model seeds.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let words = [
            self.min.x.to_bits(),
            self.min.y.to_bits(),
            self.min.z.to_bits(),
            self.max.x.to_bits(),
            self.max.y.to_bits(),
            self.max.z.to_bits(),
            self.block_count as u64,
        ];
        for word in words {
            // FNV-1a over 64-bit words
            hash ^= word;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            hash ^= hash >> 29;
        }
        hash
    }
}
