//! Depth- and distance-driven patterns: layered, ore horizon, gradient.

use orebody_core::{Block, MaterialTable, ModelBounds, ModelError, ModelResult, ModelSeed, RockType, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classifier::{run_classifier, BlockClassifier, GenerationContext, Palette};

/// Parameters of the layered pattern.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredParams {
    /// Normalized depths at which `Ore_Low`, `Ore_Med` and `Ore_High` begin.
    pub thresholds: [f64; 3],
    /// Largest tilt drawn on each horizontal axis, in degrees.
    pub max_tilt_deg: f64,
}

impl Default for LayeredParams {
    fn default() -> Self {
        Self {
            thresholds: [0.2, 0.4, 0.7],
            max_tilt_deg: 15.0,
        }
    }
}

impl LayeredParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for unordered thresholds
    /// outside [0, 1] or a tilt outside [0, 89] degrees.
    pub fn validate(&self) -> ModelResult<()> {
        let [a, b, c] = self.thresholds;
        if !(0.0 <= a && a <= b && b <= c && c <= 1.0) {
            return Err(ModelError::invalid(
                "thresholds",
                format!("must be ascending within [0, 1], got {:?}", self.thresholds),
            ));
        }
        if !(0.0..=89.0).contains(&self.max_tilt_deg) {
            return Err(ModelError::invalid("max_tilt_deg", format!("must be in [0, 89], got {}", self.max_tilt_deg)));
        }
        Ok(())
    }
}

/// Grade tiers by tilted normalized depth, shallow waste to deep high grade.
#[derive(Clone, Debug)]
pub struct Layered {
    bounds: ModelBounds,
    thresholds: [f64; 3],
    slope_x: f64,
    slope_y: f64,
    palette: Palette,
}

impl Layered {
    /// Draws the planar tilt for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid parameters.
    pub fn prepare(ctx: &mut GenerationContext<'_>, params: &LayeredParams) -> ModelResult<Self> {
        params.validate()?;
        let max = params.max_tilt_deg;
        let tilt_x: f64 = ctx.rng.gen_range(-max..=max);
        let tilt_y: f64 = ctx.rng.gen_range(-max..=max);
        tracing::debug!(tilt_x, tilt_y, "layered tilt drawn");

        Ok(Self {
            bounds: ctx.bounds,
            thresholds: params.thresholds,
            slope_x: tilt_x.to_radians().tan(),
            slope_y: tilt_y.to_radians().tan(),
            palette: ctx.palette(),
        })
    }

    /// Normalized depth below the tilted plane through the model centre.
    fn depth(&self, block: &Block) -> f64 {
        let center = self.bounds.center();
        let rise = (block.x - center.x) * self.slope_x + (block.y - center.y) * self.slope_y;
        self.bounds.normalized_depth(block.z - rise)
    }
}

impl BlockClassifier for Layered {
    fn classify(&self, block: &Block) -> Block {
        let depth = self.depth(block);
        let tier = self.thresholds.iter().filter(|t| depth >= **t).count();
        self.palette.paint(block, RockType::GRADE_TIERS[tier])
    }
}

/// Layered pattern over a slice.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for invalid parameters.
pub fn layered(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &LayeredParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(blocks, materials, seed, || params.validate(), |ctx| Layered::prepare(ctx, params))
}

/// Parameters of the ore horizon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreHorizonParams {
    /// Normalized depth of the band centre.
    pub center: f64,
    /// Band thickness in normalized depth.
    pub thickness: f64,
}

impl Default for OreHorizonParams {
    fn default() -> Self {
        Self {
            center: 0.5,
            thickness: 0.2,
        }
    }
}

impl OreHorizonParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] unless the centre lies in
    /// [0, 1] and the thickness in (0, 1].
    pub fn validate(&self) -> ModelResult<()> {
        if !(0.0..=1.0).contains(&self.center) {
            return Err(ModelError::invalid("center", format!("must be in [0, 1], got {}", self.center)));
        }
        if !(self.thickness > 0.0 && self.thickness <= 1.0) {
            return Err(ModelError::invalid("thickness", format!("must be in (0, 1], got {}", self.thickness)));
        }
        Ok(())
    }
}

/// `Ore` inside a horizontal band of normalized depth, `Waste` elsewhere.
#[derive(Clone, Debug)]
pub struct OreHorizon {
    bounds: ModelBounds,
    top: f64,
    bottom: f64,
    palette: Palette,
}

impl OreHorizon {
    /// Prepares the band.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid parameters.
    pub fn prepare(ctx: &GenerationContext<'_>, params: &OreHorizonParams) -> ModelResult<Self> {
        params.validate()?;
        let half = params.thickness * 0.5;
        Ok(Self {
            bounds: ctx.bounds,
            top: params.center - half,
            bottom: params.center + half,
            palette: ctx.palette(),
        })
    }
}

impl BlockClassifier for OreHorizon {
    fn classify(&self, block: &Block) -> Block {
        let depth = self.bounds.normalized_depth(block.z);
        let rock = if depth >= self.top && depth <= self.bottom {
            RockType::Ore
        } else {
            RockType::Waste
        };
        self.palette.paint(block, rock)
    }
}

/// Ore-horizon pattern over a slice.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for invalid parameters.
pub fn ore_horizon(blocks: &[Block], materials: &MaterialTable, params: &OreHorizonParams) -> ModelResult<Vec<Block>> {
    run_classifier(blocks, materials, None, || params.validate(), |ctx| OreHorizon::prepare(ctx, params))
}

/// Normalized distances at which the gradient drops to `Ore_Med`, `Ore_Low`
/// and `Waste`. These measure distance from the centre, not depth, so they are
/// independent of [`LayeredParams::thresholds`].
pub const GRADIENT_CUTOFFS: [f64; 3] = [0.3, 0.6, 0.8];

/// Grade tiers by weighted distance from a randomized centre.
#[derive(Clone, Debug)]
pub struct Gradient {
    center: Vec3,
    weights: Vec3,
    max_distance: f64,
    palette: Palette,
}

impl Gradient {
    /// Draws the centre and axis weights for one call.
    #[must_use]
    pub fn prepare(ctx: &mut GenerationContext<'_>) -> Self {
        let bounds = ctx.bounds;
        let extent = bounds.extent();
        let jitter = Vec3::new(
            ctx.rng.gen_range(-0.1..=0.1),
            ctx.rng.gen_range(-0.1..=0.1),
            ctx.rng.gen_range(-0.1..=0.1),
        );
        let center = bounds.center() + extent.mul_elements(jitter);
        let weights = Vec3::new(
            ctx.rng.gen_range(0.7..=1.3),
            ctx.rng.gen_range(0.7..=1.3),
            ctx.rng.gen_range(0.7..=1.3),
        );

        let mut max_distance: f64 = 0.0;
        for corner in 0..8u8 {
            let pick = |bit: u8, lo: f64, hi: f64| if corner & bit == 0 { lo } else { hi };
            let p = Vec3::new(
                pick(1, bounds.min.x, bounds.max.x),
                pick(2, bounds.min.y, bounds.max.y),
                pick(4, bounds.min.z, bounds.max.z),
            );
            max_distance = max_distance.max((p - center).mul_elements(weights).length());
        }
        tracing::debug!(?center, ?weights, max_distance, "gradient centre drawn");

        Self {
            center,
            weights,
            max_distance,
            palette: ctx.palette(),
        }
    }
}

impl BlockClassifier for Gradient {
    fn classify(&self, block: &Block) -> Block {
        let distance = (block.position() - self.center).mul_elements(self.weights).length();
        let normalized = if self.max_distance > 0.0 {
            distance / self.max_distance
        } else {
            0.0
        };
        let passed = GRADIENT_CUTOFFS.iter().filter(|c| normalized >= **c).count();
        self.palette.paint(block, RockType::GRADE_TIERS[GRADIENT_CUTOFFS.len() - passed])
    }
}

/// Gradient pattern over a slice.
#[must_use]
pub fn gradient(blocks: &[Block], materials: &MaterialTable, seed: Option<ModelSeed>) -> Vec<Block> {
    GenerationContext::from_blocks(blocks, materials, seed)
        .map(|mut ctx| Gradient::prepare(&mut ctx).apply(blocks))
        .unwrap_or_default()
}
