//! Structurally controlled patterns: a single inclined vein and noise clusters.

use orebody_core::{Block, MaterialTable, ModelError, ModelResult, ModelSeed, RockType, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classifier::{run_classifier, BlockClassifier, GenerationContext, Palette};
use crate::grade::EconomicModel;
use crate::noise::ValueNoise;

const CLUSTER_PURPOSE: u64 = 0x636C_7573_7465_7231;

/// Optional overrides for the inclined vein. Unset fields are drawn per call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclinedVeinParams {
    /// Strike azimuth in degrees clockwise from north.
    pub strike: Option<f64>,
    /// Dip in degrees from horizontal.
    pub dip: Option<f64>,
    /// Half-thickness in horizontal cell widths.
    pub thickness_cells: Option<f64>,
}

impl InclinedVeinParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for a non-finite strike, a
    /// dip outside (0, 90] or a non-positive thickness.
    pub fn validate(&self) -> ModelResult<()> {
        if let Some(strike) = self.strike {
            if !strike.is_finite() {
                return Err(ModelError::invalid("strike", "must be finite"));
            }
        }
        if let Some(dip) = self.dip {
            if !(dip > 0.0 && dip <= 90.0) {
                return Err(ModelError::invalid("dip", format!("must be in (0, 90], got {dip}")));
            }
        }
        if let Some(thickness) = self.thickness_cells {
            if !(thickness.is_finite() && thickness > 0.0) {
                return Err(ModelError::invalid("thickness_cells", format!("must be positive, got {thickness}")));
            }
        }
        Ok(())
    }
}

/// `Ore` within a random distance of a dipping plane, `Waste` elsewhere.
///
/// Grades decay linearly from the nominal `Ore` grades on the plane to half
/// of them at the vein edge.
#[derive(Clone, Debug)]
pub struct InclinedVein {
    center: Vec3,
    normal: Vec3,
    thickness: f64,
    economics: EconomicModel,
    palette: Palette,
}

impl InclinedVein {
    /// Draws the plane for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid overrides.
    pub fn prepare(
        ctx: &mut GenerationContext<'_>,
        params: &InclinedVeinParams,
        economics: EconomicModel,
    ) -> ModelResult<Self> {
        params.validate()?;
        let bounds = ctx.bounds;

        // Every value is drawn so an override leaves the others unchanged.
        let drawn_strike: f64 = ctx.rng.gen_range(0.0..360.0);
        let drawn_dip: f64 = ctx.rng.gen_range(30.0..=75.0);
        let drawn_thickness: f64 = ctx.rng.gen_range(1.5..=3.5);
        let offset = Vec3::new(
            ctx.rng.gen_range(-0.2..=0.2),
            ctx.rng.gen_range(-0.2..=0.2),
            ctx.rng.gen_range(-0.1..=0.1),
        );

        let strike = params.strike.unwrap_or(drawn_strike).to_radians();
        let dip = params.dip.unwrap_or(drawn_dip).to_radians();
        let thickness = params.thickness_cells.unwrap_or(drawn_thickness) * bounds.horizontal_cell();
        let center = bounds.center() + bounds.extent().mul_elements(offset);
        let normal = Vec3::new(dip.sin() * strike.cos(), -dip.sin() * strike.sin(), dip.cos());

        tracing::debug!(
            strike = strike.to_degrees(),
            dip = dip.to_degrees(),
            thickness,
            "inclined vein drawn"
        );

        Ok(Self {
            center,
            normal,
            thickness,
            economics,
            palette: ctx.palette(),
        })
    }
}

impl BlockClassifier for InclinedVein {
    fn classify(&self, block: &Block) -> Block {
        let distance = (block.position() - self.center).dot(self.normal).abs();
        if distance >= self.thickness {
            return self.palette.paint(block, RockType::Waste);
        }

        let factor = 1.0 - 0.5 * distance / self.thickness;
        let ore = self.palette.get(RockType::Ore);
        let cu = ore.grade_cu * factor;
        let au = ore.grade_au * factor;
        Block {
            grade_cu: Some(cu),
            grade_au: Some(au),
            econ_value: Some(self.economics.ore_value(cu, au)),
            ..self.palette.paint(block, RockType::Ore)
        }
    }
}

/// Inclined-vein pattern over a slice.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for invalid overrides.
pub fn inclined_vein(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &InclinedVeinParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(
        blocks,
        materials,
        seed,
        || params.validate(),
        |ctx| InclinedVein::prepare(ctx, params, EconomicModel::default()),
    )
}

/// Grade tiers from two octaves of value noise.
#[derive(Clone, Debug)]
pub struct RandomClusters {
    noise: ValueNoise,
    offset: Vec3,
    scale: f64,
    economics: EconomicModel,
    palette: Palette,
}

impl RandomClusters {
    /// Draws the noise offsets for one call.
    #[must_use]
    pub fn prepare(ctx: &mut GenerationContext<'_>, economics: EconomicModel) -> Self {
        let offset = Vec3::new(
            ctx.rng.gen_range(0.0..1000.0),
            ctx.rng.gen_range(0.0..1000.0),
            ctx.rng.gen_range(0.0..1000.0),
        );
        let scale = 0.2 / ctx.bounds.mean_cell();
        tracing::debug!(?offset, scale, "cluster noise drawn");

        Self {
            noise: ctx.noise(CLUSTER_PURPOSE),
            offset,
            scale,
            economics,
            palette: ctx.palette(),
        }
    }

    /// Combined noise value in [0, 1] at a block.
    #[must_use]
    pub fn value_at(&self, block: &Block) -> f64 {
        let p = block.position() * self.scale + self.offset;
        let base = self.noise.sample(p.x, p.y, p.z, 1.0);
        let detail = self.noise.sample(p.x, p.y, p.z, 3.0);
        (base + 0.25 * detail) / 1.25
    }
}

impl BlockClassifier for RandomClusters {
    fn classify(&self, block: &Block) -> Block {
        let v = self.value_at(block);
        let rock = if v < 0.45 {
            RockType::Waste
        } else if v < 0.55 {
            RockType::OreLow
        } else if v < 0.7 {
            RockType::OreMed
        } else {
            RockType::OreHigh
        };

        let painted = self.palette.paint(block, rock);
        if rock == RockType::Waste {
            return painted;
        }

        let material = self.palette.get(rock);
        let factor = 0.8 + 0.4 * v;
        let cu = material.grade_cu * factor;
        let au = material.grade_au * factor;
        Block {
            grade_cu: Some(cu),
            grade_au: Some(au),
            econ_value: Some(self.economics.ore_value(cu, au)),
            ..painted
        }
    }
}

/// Random-cluster pattern over a slice.
#[must_use]
pub fn random_clusters(blocks: &[Block], materials: &MaterialTable, seed: Option<ModelSeed>) -> Vec<Block> {
    GenerationContext::from_blocks(blocks, materials, seed)
        .map(|mut ctx| RandomClusters::prepare(&mut ctx, EconomicModel::default()).apply(blocks))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orebody_core::{build_grid, GridParams};

    fn grid() -> Vec<Block> {
        build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(10.0), [20, 20, 10])).unwrap()
    }

    #[test]
    fn test_vertical_vein_is_a_slab() {
        // Dip 90 puts the normal in the horizontal plane
        let params = InclinedVeinParams {
            strike: Some(0.0),
            dip: Some(90.0),
            thickness_cells: Some(2.0),
        };
        let out = inclined_vein(&grid(), &MaterialTable::standard(), &params, Some(ModelSeed::new(4))).unwrap();

        let ore: Vec<&Block> = out.iter().filter(|b| b.rock_type == RockType::Ore).collect();
        assert!(!ore.is_empty());
        // A north-striking vertical vein occupies whole columns of constant i
        let columns: std::collections::HashSet<u32> = ore.iter().map(|b| b.i).collect();
        assert!(columns.len() <= 4, "slab spans {} columns", columns.len());
        assert_eq!(ore.len(), columns.len() * 20 * 10);
    }

    #[test]
    fn test_vein_grades_decay_to_half_at_edge() {
        let out = inclined_vein(&grid(), &MaterialTable::standard(), &InclinedVeinParams::default(), Some(ModelSeed::new(8))).unwrap();

        for b in out.iter().filter(|b| b.rock_type == RockType::Ore) {
            let cu = b.grade_cu.unwrap();
            let au = b.grade_au.unwrap();
            assert!(cu > 0.4 - 1e-9 && cu <= 0.8 + 1e-9);
            assert!((au / cu - 1.5).abs() < 1e-9);
            let expected = cu * 20.0 + au * 50.0 - 15.0;
            assert!((b.econ_value.unwrap() - expected).abs() < 1e-9);
        }
        assert!(out.iter().any(|b| b.rock_type == RockType::Ore));
        assert!(out.iter().any(|b| b.rock_type == RockType::Waste));
    }

    #[test]
    fn test_vein_rejects_flat_dip() {
        let params = InclinedVeinParams {
            dip: Some(0.0),
            ..InclinedVeinParams::default()
        };
        assert!(inclined_vein(&grid(), &MaterialTable::standard(), &params, None).is_err());
    }

    #[test]
    fn test_clusters_tiers_follow_noise_thresholds() {
        let blocks = grid();
        let table = MaterialTable::standard();
        let mut ctx = GenerationContext::from_blocks(&blocks, &table, Some(ModelSeed::new(21))).unwrap();
        let clusters = RandomClusters::prepare(&mut ctx, EconomicModel::default());

        for block in &blocks {
            let v = clusters.value_at(block);
            let out = clusters.classify(block);
            assert!((0.0..=1.0).contains(&v));
            match out.rock_type {
                RockType::Waste => assert!(v < 0.45),
                RockType::OreLow => assert!((0.45..0.55).contains(&v)),
                RockType::OreMed => assert!((0.55..0.7).contains(&v)),
                RockType::OreHigh => assert!(v >= 0.7),
                other => panic!("unexpected {other}"),
            }
            if out.rock_type.is_ore() {
                let nominal = table.definition(out.rock_type).grade_cu;
                assert!((out.grade_cu.unwrap() - nominal * (0.8 + 0.4 * v)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_clusters_reproducible() {
        let table = MaterialTable::standard();
        let a = random_clusters(&grid(), &table, Some(ModelSeed::new(3)));
        let b = random_clusters(&grid(), &table, Some(ModelSeed::new(3)));
        assert_eq!(a, b);
    }
}
