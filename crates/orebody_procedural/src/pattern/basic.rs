//! Uniform, checkerboard and random-tier patterns.

use orebody_core::{Block, MaterialDefinition, MaterialTable, ModelError, ModelResult, ModelSeed, RockType};
use serde::{Deserialize, Serialize};

use crate::classifier::{run_classifier, BlockClassifier, GenerationContext, Palette};
use crate::noise::hash_unit;

const RANDOM_PURPOSE: u64 = 0x7261_6E64_6F6D_0001;

/// Parameters of the uniform pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformParams {
    /// Rock type assigned to every block.
    pub rock_type: RockType,
}

impl Default for UniformParams {
    fn default() -> Self {
        Self {
            rock_type: RockType::OreMed,
        }
    }
}

/// Assigns one rock type everywhere.
#[derive(Clone, Debug)]
pub struct Uniform {
    rock: RockType,
    material: MaterialDefinition,
}

impl Uniform {
    /// Resolves the rock type against a material table.
    #[must_use]
    pub fn new(params: &UniformParams, materials: &MaterialTable) -> Self {
        Self {
            rock: params.rock_type,
            material: materials.definition(params.rock_type),
        }
    }
}

impl BlockClassifier for Uniform {
    fn classify(&self, block: &Block) -> Block {
        block.with_material(self.rock, &self.material)
    }
}

/// Uniform pattern over a slice.
#[must_use]
pub fn uniform(blocks: &[Block], materials: &MaterialTable, params: &UniformParams) -> Vec<Block> {
    Uniform::new(params, materials).apply(blocks)
}

/// Alternates `Ore_High` and `Waste` by the parity of `i + j + k`.
#[derive(Clone, Debug)]
pub struct Checkerboard {
    palette: Palette,
}

impl Checkerboard {
    /// Creates the pattern.
    #[must_use]
    pub fn new(materials: &MaterialTable) -> Self {
        Self {
            palette: Palette::from_table(materials),
        }
    }
}

impl BlockClassifier for Checkerboard {
    fn classify(&self, block: &Block) -> Block {
        let parity = (u64::from(block.i) + u64::from(block.j) + u64::from(block.k)) % 2;
        let rock = if parity == 0 { RockType::OreHigh } else { RockType::Waste };
        self.palette.paint(block, rock)
    }
}

/// Checkerboard pattern over a slice.
#[must_use]
pub fn checkerboard(blocks: &[Block], materials: &MaterialTable) -> Vec<Block> {
    Checkerboard::new(materials).apply(blocks)
}

/// Parameters of the random pattern.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomParams {
    /// Relative jitter applied to density, grades and value.
    pub jitter: f64,
}

impl Default for RandomParams {
    fn default() -> Self {
        Self { jitter: 0.2 }
    }
}

impl RandomParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] unless `0 <= jitter < 1`.
    pub fn validate(&self) -> ModelResult<()> {
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(ModelError::invalid("jitter", format!("must be in [0, 1), got {}", self.jitter)));
        }
        Ok(())
    }
}

/// Draws one of the four grade tiers per block and jitters its properties.
///
/// Draws are hashed from the block's lattice indices, so the outcome does
/// not depend on the order or grouping in which blocks are classified.
#[derive(Clone, Debug)]
pub struct RandomTiers {
    seed: u64,
    jitter: f64,
    palette: Palette,
}

impl RandomTiers {
    /// Prepares the pattern for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for an out-of-range jitter.
    pub fn prepare(ctx: &GenerationContext<'_>, params: &RandomParams) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            seed: ctx.seed.derive(RANDOM_PURPOSE).value(),
            jitter: params.jitter,
            palette: ctx.palette(),
        })
    }

    fn factor(&self, block: &Block, channel: u32) -> f64 {
        1.0 + (hash_unit(self.seed, block.i, block.j, block.k, channel) * 2.0 - 1.0) * self.jitter
    }
}

impl BlockClassifier for RandomTiers {
    fn classify(&self, block: &Block) -> Block {
        let draw = hash_unit(self.seed, block.i, block.j, block.k, 0);
        let tier = ((draw * 4.0) as usize).min(3);
        let rock = RockType::GRADE_TIERS[tier];
        let material = self.palette.get(rock);

        Block {
            density: material.density * self.factor(block, 1),
            grade_cu: Some(material.grade_cu * self.factor(block, 2)),
            grade_au: Some(material.grade_au * self.factor(block, 3)),
            econ_value: Some(material.econ_value * self.factor(block, 4)),
            ..self.palette.paint(block, rock)
        }
    }
}

/// Random pattern over a slice.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for an out-of-range jitter.
pub fn random(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &RandomParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(blocks, materials, seed, || params.validate(), |ctx| RandomTiers::prepare(ctx, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orebody_core::{build_grid, GridParams, Vec3};

    fn grid() -> Vec<Block> {
        build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(10.0), [10, 10, 10])).unwrap()
    }

    #[test]
    fn test_uniform_assigns_table_values() {
        let table = MaterialTable::standard();
        let out = uniform(&grid(), &table, &UniformParams::default());

        assert!(out.iter().all(|b| b.rock_type == RockType::OreMed));
        assert!(out.iter().all(|b| b.density == 2.7));
        assert!(out.iter().all(|b| b.grade_cu == Some(0.7)));
        assert!(out.iter().all(|b| b.grade_au == Some(1.5)));
        assert!(out.iter().all(|b| b.econ_value == Some(74.0)));
    }

    #[test]
    fn test_checkerboard_parity() {
        let out = checkerboard(&grid(), &MaterialTable::standard());
        for b in &out {
            let expected = if (b.i + b.j + b.k) % 2 == 0 {
                RockType::OreHigh
            } else {
                RockType::Waste
            };
            assert_eq!(b.rock_type, expected);
        }
        // Half of an even-sized cube each
        assert_eq!(out.iter().filter(|b| b.rock_type == RockType::OreHigh).count(), 500);
    }

    #[test]
    fn test_random_uses_every_tier_with_bounded_jitter() {
        let table = MaterialTable::standard();
        let out = random(&grid(), &table, &RandomParams::default(), Some(ModelSeed::new(9))).unwrap();

        for tier in RockType::GRADE_TIERS {
            let count = out.iter().filter(|b| b.rock_type == tier).count();
            assert!(count > 150, "{tier} drawn only {count} times out of 1000");
        }
        for b in &out {
            let nominal = table.definition(b.rock_type).density;
            assert!(b.density >= nominal * 0.8 - 1e-9 && b.density <= nominal * 1.2 + 1e-9);
        }
    }

    #[test]
    fn test_random_reproducible_with_seed() {
        let table = MaterialTable::standard();
        let a = random(&grid(), &table, &RandomParams::default(), Some(ModelSeed::new(1))).unwrap();
        let b = random(&grid(), &table, &RandomParams::default(), Some(ModelSeed::new(1))).unwrap();
        let c = random(&grid(), &table, &RandomParams::default(), Some(ModelSeed::new(2))).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_rejects_bad_jitter() {
        let params = RandomParams { jitter: 1.5 };
        let table = MaterialTable::standard();
        assert!(matches!(
            random(&grid(), &table, &params, None),
            Err(ModelError::InvalidParameter { name: "jitter", .. })
        ));
    }
}
