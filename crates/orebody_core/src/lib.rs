//! # OREBODY Core
//!
//! Data types shared by every stage of block-model generation.
//!
//! ## Design Principles
//!
//! 1. **Pure**: Grids and blocks are plain values; nothing is mutated in place
//! 2. **Explicit**: Material tables and seeds are passed in, never global
//! 3. **Batched**: Large grids can be produced in bounded batches
//!
//! ## Core Components
//!
//! - `GridParams` / `build_grid`: The regular block lattice
//! - `Block`: One lattice cell with classification and grades
//! - `MaterialTable`: Rock type to material properties
//! - `ModelBounds`: Extent and cell size of a block slice
//! - `ModelSeed`: Per-call randomization
//!
//! ## Example
//!
//! ```rust,ignore
//! use orebody_core::{build_grid, GridParams, Vec3};
//!
//! let params = GridParams::new(Vec3::ZERO, Vec3::splat(30.0), [20, 20, 10]);
//! let blocks = build_grid(&params)?;
//! assert_eq!(blocks.len(), 4000);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod bounds;
pub mod error;
pub mod grid;
pub mod legacy;
pub mod material;
pub mod math;
pub mod seed;

pub use block::{Block, DEFAULT_DENSITY};
pub use bounds::ModelBounds;
pub use error::{ModelError, ModelResult};
pub use grid::{build_grid, collect_batches, GridBatch, GridBatches, GridBlocks, GridParams, Progress};
pub use legacy::LegacyBlock;
pub use material::{MaterialDefinition, MaterialTable, RockType};
pub use math::Vec3;
pub use seed::ModelSeed;
