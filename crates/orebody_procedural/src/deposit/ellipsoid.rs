//! Plunging ellipsoidal ore body with Gaussian grade decay.

use orebody_core::{Block, MaterialTable, ModelResult, ModelSeed, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{check_finite, check_non_negative, check_positive, ellipsoid_distance, Orientation};
use crate::classifier::{run_classifier, BlockClassifier, GenerationContext};
use crate::grade::{EconomicModel, GradeThresholds, OreGrader};
use crate::noise::ValueNoise;

const JITTER_PURPOSE: u64 = 0x656C_6C69_7073_6F31;

/// Zone label of blocks inside the body.
pub const ZONE: &str = "Orebody";

/// Ellipsoid parameters. Every unset field is drawn per call, scaled to the
/// model bounds and cell size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsoidParams {
    /// Body centre `[x, y, z]`.
    pub center: Option<[f64; 3]>,
    /// Semi-axis along the plunge direction.
    pub major_axis: Option<f64>,
    /// Horizontal semi-axis across the plunge direction.
    pub intermediate_axis: Option<f64>,
    /// Semi-axis normal to the other two.
    pub minor_axis: Option<f64>,
    /// Azimuth of the long axis, degrees clockwise from north.
    pub azimuth: Option<f64>,
    /// Plunge of the long axis below horizontal, degrees.
    pub plunge: Option<f64>,
    /// Cu grade (%) at the centre.
    pub max_cu: Option<f64>,
    /// Au (g/t) per % Cu.
    pub au_ratio: Option<f64>,
    /// Cap on the Au grade.
    pub max_au: Option<f64>,
    /// Decay constant `k` of `exp(-k d²)`.
    pub decay: Option<f64>,
    /// Peak-to-peak relative noise on the grades.
    pub variation: Option<f64>,
}

impl EllipsoidParams {
    /// # Errors
    ///
    /// Returns [`orebody_core::ModelError::InvalidParameter`] for non-finite
    /// values, non-positive axes or negative grades and constants.
    pub fn validate(&self) -> ModelResult<()> {
        if let Some(center) = self.center {
            check_finite("center", &center)?;
        }
        check_positive("major_axis", self.major_axis)?;
        check_positive("intermediate_axis", self.intermediate_axis)?;
        check_positive("minor_axis", self.minor_axis)?;
        check_finite("azimuth", &[self.azimuth.unwrap_or(0.0), self.plunge.unwrap_or(0.0)])?;
        check_non_negative("max_cu", self.max_cu)?;
        check_non_negative("au_ratio", self.au_ratio)?;
        check_non_negative("max_au", self.max_au)?;
        check_non_negative("decay", self.decay)?;
        check_non_negative("variation", self.variation)
    }
}

/// Cu grade at normalized distance `d`: `max_cu · exp(−k d²)` inside the
/// body, zero on and beyond the surface.
#[inline]
#[must_use]
pub fn grade_at(distance: f64, max_cu: f64, decay: f64) -> f64 {
    if distance < 1.0 {
        max_cu * (-decay * distance * distance).exp()
    } else {
        0.0
    }
}

/// Prepared ellipsoid.
#[derive(Clone, Debug)]
pub struct Ellipsoid {
    center: Vec3,
    semi_axes: Vec3,
    orientation: Orientation,
    max_cu: f64,
    au_ratio: f64,
    max_au: f64,
    decay: f64,
    variation: f64,
    noise: ValueNoise,
    noise_scale: f64,
    grader: OreGrader,
}

impl Ellipsoid {
    /// Resolves the body for one call.
    ///
    /// # Errors
    ///
    /// Returns [`orebody_core::ModelError::InvalidParameter`] for invalid
    /// overrides.
    pub fn prepare(
        ctx: &mut GenerationContext<'_>,
        params: &EllipsoidParams,
        thresholds: GradeThresholds,
        economics: EconomicModel,
    ) -> ModelResult<Self> {
        params.validate()?;
        thresholds.validate()?;

        let bounds = ctx.bounds;
        let span = bounds.span();
        let cell = bounds.cell_size;
        let rng = &mut ctx.rng;

        let offset = Vec3::new(
            rng.gen_range(-0.15..=0.15),
            rng.gen_range(-0.15..=0.15),
            rng.gen_range(-0.1..=0.1),
        );
        let major_frac: f64 = rng.gen_range(0.25..=0.4);
        let intermediate_frac: f64 = rng.gen_range(0.45..=0.7);
        let minor_frac: f64 = rng.gen_range(0.2..=0.35);
        let azimuth: f64 = rng.gen_range(0.0..360.0);
        let plunge: f64 = rng.gen_range(0.0..=45.0);
        let max_cu: f64 = rng.gen_range(1.5..=2.5);
        let au_ratio: f64 = rng.gen_range(1.0..=2.0);
        let decay: f64 = rng.gen_range(1.5..=2.5);

        let major = params
            .major_axis
            .unwrap_or_else(|| (span.x.max(span.y) * major_frac).max(3.0 * bounds.horizontal_cell()));
        let intermediate = params
            .intermediate_axis
            .unwrap_or_else(|| (major * intermediate_frac).max(2.0 * bounds.horizontal_cell()));
        let minor = params
            .minor_axis
            .unwrap_or_else(|| (span.z * minor_frac).max(2.0 * cell.z));

        let center = params
            .center
            .map_or_else(|| bounds.center() + bounds.extent().mul_elements(offset), Vec3::from_array);

        let body = Self {
            center,
            semi_axes: Vec3::new(intermediate, major, minor),
            orientation: Orientation::new(params.azimuth.unwrap_or(azimuth), params.plunge.unwrap_or(plunge)),
            max_cu: params.max_cu.unwrap_or(max_cu),
            au_ratio: params.au_ratio.unwrap_or(au_ratio),
            max_au: params.max_au.unwrap_or(5.0),
            decay: params.decay.unwrap_or(decay),
            variation: params.variation.unwrap_or(0.2),
            noise: ctx.noise(JITTER_PURPOSE),
            noise_scale: 1.0 / (4.0 * bounds.mean_cell()),
            grader: OreGrader::new(thresholds, economics, ctx.palette()),
        };
        tracing::debug!(
            center = ?body.center,
            semi_axes = ?body.semi_axes,
            max_cu = body.max_cu,
            "ellipsoid body drawn"
        );
        Ok(body)
    }

    /// Normalized distance of a point from the body centre.
    #[must_use]
    pub fn distance(&self, p: Vec3) -> f64 {
        ellipsoid_distance(self.orientation.to_local(p - self.center), self.semi_axes)
    }
}

impl BlockClassifier for Ellipsoid {
    fn classify(&self, block: &Block) -> Block {
        let d = self.distance(block.position());
        let jitter = self
            .noise
            .jitter(block.x, block.y, block.z, self.noise_scale, self.variation);
        let cu = grade_at(d, self.max_cu, self.decay) * jitter;
        let au = (cu * self.au_ratio).min(self.max_au);
        let zone = (d < 1.0).then_some(ZONE);
        self.grader.finish(block, cu, au, zone)
    }
}

/// Ellipsoid ore body over a slice, with default cut-offs and economics.
///
/// # Errors
///
/// Returns [`orebody_core::ModelError::InvalidParameter`] for invalid
/// overrides.
pub fn ellipsoid(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &EllipsoidParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(
        blocks,
        materials,
        seed,
        || params.validate(),
        |ctx| Ellipsoid::prepare(ctx, params, GradeThresholds::default(), EconomicModel::default()),
    )
}
