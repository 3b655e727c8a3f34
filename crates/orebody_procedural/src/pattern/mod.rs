//! # Material Patterns
//!
//! Categorical classifiers: each assigns a rock type per block together with
//! the matching material properties. Only `inclined_vein` and
//! `random_clusters` adjust grades away from the table values.

pub mod basic;
pub mod depth;
pub mod structure;

pub use basic::{checkerboard, random, uniform, Checkerboard, RandomParams, RandomTiers, Uniform, UniformParams};
pub use depth::{
    gradient, layered, ore_horizon, Gradient, Layered, LayeredParams, OreHorizon, OreHorizonParams, GRADIENT_CUTOFFS,
};
pub use structure::{inclined_vein, random_clusters, InclinedVein, InclinedVeinParams, RandomClusters};
