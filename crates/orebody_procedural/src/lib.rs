//! # OREBODY Procedural Generation
//!
//! Deterministic classification of block lattices into synthetic geology.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed on the same grid always produces the same model
//! 2. **Prepared once**: Shape parameters are drawn once per call, never per block
//! 3. **Order-free**: Classifying a block depends only on that block, so
//!    chunked and whole-slice passes agree
//!
//! ## Core Components
//!
//! - `ValueNoise`: Seeded 3D value noise
//! - `BlockClassifier`: Prepared per-block classification
//! - `pattern`: Categorical material patterns
//! - `deposit`: Continuous ore-body synthesis
//! - `ModelGenerator`: Kind-based dispatch, whole or chunked
//!
//! ## Example
//!
//! ```rust,ignore
//! use orebody_core::{build_grid, GridParams, MaterialTable, ModelSeed, Vec3};
//! use orebody_procedural::{GeneratorKind, GeneratorOptions, ModelGenerator};
//!
//! let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(30.0), [20, 20, 10]))?;
//! let generator = ModelGenerator::new(MaterialTable::standard(), GeneratorOptions::default());
//!
//! let model = generator.apply(GeneratorKind::Porphyry, &blocks, Some(ModelSeed::new(42)))?;
//! assert_eq!(model.len(), blocks.len());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunked;
pub mod classifier;
pub mod deposit;
pub mod generator;
pub mod grade;
pub mod noise;
pub mod pattern;

pub use chunked::ChunkedPass;
pub use classifier::{run_classifier, BlockClassifier, GenerationContext, Palette};
pub use deposit::{
    ellipsoid, porphyry, salt_dome, vein, EllipsoidParams, FaultTrace, PorphyryParams, ReservoirEconomics,
    SaltDomeParams, VeinParams,
};
pub use generator::{ClassifierBuilder, GeneratorKind, GeneratorOptions, GeneratorRegistry, ModelGenerator};
pub use grade::{EconomicModel, GradeThresholds, OreGrader};
pub use noise::{hash_unit, lerp, noise3d, smoothstep, ValueNoise};
pub use pattern::{
    checkerboard, gradient, inclined_vein, layered, ore_horizon, random, random_clusters, uniform,
    InclinedVeinParams, LayeredParams, OreHorizonParams, RandomParams, UniformParams,
};
