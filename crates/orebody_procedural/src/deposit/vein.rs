//! Structurally controlled vein set: parallel tabular bodies with Gaussian
//! grade decay across their width.

use orebody_core::math::azimuth_direction;
use orebody_core::{Block, MaterialTable, ModelError, ModelResult, ModelSeed, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{check_finite, check_non_negative, check_positive};
use crate::classifier::{run_classifier, BlockClassifier, GenerationContext};
use crate::grade::{EconomicModel, GradeThresholds, OreGrader};
use crate::noise::ValueNoise;

const JITTER_PURPOSE: u64 = 0x7665_696E_7365_7431;

/// Zone label of blocks inside a vein.
pub const ZONE: &str = "Vein";

/// Vein-set parameters. Every unset field is drawn per call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeinParams {
    /// Point on the central vein `[x, y, z]`.
    pub center: Option<[f64; 3]>,
    /// Strike azimuth, degrees clockwise from north.
    pub strike: Option<f64>,
    /// Dip below horizontal, degrees.
    pub dip: Option<f64>,
    /// Azimuth the veins dip toward. Takes precedence over `strike`, which
    /// then becomes `dip_direction - 90`.
    pub dip_direction: Option<f64>,
    /// Number of parallel veins.
    pub count: Option<u32>,
    /// Horizontal spacing between veins along the dip direction.
    pub spacing: Option<f64>,
    /// Full vein width.
    pub width: Option<f64>,
    /// Extent along strike.
    pub strike_length: Option<f64>,
    /// Extent down dip.
    pub dip_length: Option<f64>,
    /// Cu grade (%) on the vein plane.
    pub max_cu: Option<f64>,
    /// Au (g/t) per % Cu.
    pub au_ratio: Option<f64>,
}

impl VeinParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for a zero count, a dip
    /// outside (0, 90] or non-positive sizes.
    pub fn validate(&self) -> ModelResult<()> {
        if let Some(center) = self.center {
            check_finite("center", &center)?;
        }
        check_finite(
            "strike",
            &[self.strike.unwrap_or(0.0), self.dip_direction.unwrap_or(0.0)],
        )?;
        if let Some(dip) = self.dip {
            if !(dip > 0.0 && dip <= 90.0) {
                return Err(ModelError::invalid("dip", format!("must be in (0, 90], got {dip}")));
            }
        }
        if self.count == Some(0) {
            return Err(ModelError::invalid("count", "must be at least 1"));
        }
        check_non_negative("spacing", self.spacing)?;
        check_positive("width", self.width)?;
        check_positive("strike_length", self.strike_length)?;
        check_positive("dip_length", self.dip_length)?;
        check_non_negative("max_cu", self.max_cu)?;
        check_non_negative("au_ratio", self.au_ratio)
    }
}

/// Prepared vein set.
#[derive(Clone, Debug)]
pub struct Vein {
    /// Vein centres, one per parallel vein.
    centers: Vec<Vec3>,
    strike_dir: Vec3,
    dip_dir: Vec3,
    normal: Vec3,
    half_width: f64,
    half_strike: f64,
    half_dip: f64,
    max_cu: f64,
    au_ratio: f64,
    noise: ValueNoise,
    noise_scale: f64,
    grader: OreGrader,
}

impl Vein {
    /// Resolves the vein set for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid overrides.
    pub fn prepare(
        ctx: &mut GenerationContext<'_>,
        params: &VeinParams,
        thresholds: GradeThresholds,
        economics: EconomicModel,
    ) -> ModelResult<Self> {
        params.validate()?;
        thresholds.validate()?;

        let bounds = ctx.bounds;
        let span = bounds.span();
        let cell = bounds.horizontal_cell();
        let rng = &mut ctx.rng;

        let drawn_strike: f64 = rng.gen_range(0.0..360.0);
        let drawn_dip: f64 = rng.gen_range(45.0..=85.0);
        let drawn_count: u32 = rng.gen_range(1..=3);
        let spacing_frac: f64 = rng.gen_range(0.1..=0.2);
        let width_cells: f64 = rng.gen_range(1.5..=3.0);
        let strike_frac: f64 = rng.gen_range(0.6..=0.9);
        let dip_frac: f64 = rng.gen_range(0.8..=1.2);
        let drawn_max_cu: f64 = rng.gen_range(1.5..=3.0);
        let drawn_ratio: f64 = rng.gen_range(0.8..=1.6);
        let offset = Vec3::new(rng.gen_range(-0.1..=0.1), rng.gen_range(-0.1..=0.1), 0.0);

        let dip_direction = params
            .dip_direction
            .unwrap_or_else(|| params.strike.unwrap_or(drawn_strike) + 90.0);
        let dip = params.dip.unwrap_or(drawn_dip).to_radians();
        let count = params.count.unwrap_or(drawn_count);
        let spacing = params.spacing.unwrap_or(span.x.min(span.y) * spacing_frac);
        let width = params.width.unwrap_or(width_cells * cell);

        let strike_dir = azimuth_direction(dip_direction - 90.0);
        let down = azimuth_direction(dip_direction);
        let dip_dir = Vec3::new(down.x * dip.cos(), down.y * dip.cos(), -dip.sin());
        let normal = strike_dir.cross(dip_dir).normalize_or_zero();

        let center = params
            .center
            .map_or_else(|| bounds.center() + bounds.extent().mul_elements(offset), Vec3::from_array);
        let middle = f64::from(count - 1) * 0.5;
        let centers = (0..count)
            .map(|v| center + down * ((f64::from(v) - middle) * spacing))
            .collect();

        tracing::debug!(
            dip_direction,
            dip = dip.to_degrees(),
            count,
            spacing,
            width,
            "vein set drawn"
        );

        Ok(Self {
            centers,
            strike_dir,
            dip_dir,
            normal,
            half_width: width * 0.5,
            half_strike: params.strike_length.unwrap_or(span.x.max(span.y) * strike_frac) * 0.5,
            half_dip: params.dip_length.unwrap_or(span.z * dip_frac) * 0.5,
            max_cu: params.max_cu.unwrap_or(drawn_max_cu),
            au_ratio: params.au_ratio.unwrap_or(drawn_ratio),
            noise: ctx.noise(JITTER_PURPOSE),
            noise_scale: 1.0 / (2.0 * bounds.mean_cell()),
            grader: OreGrader::new(thresholds, economics, ctx.palette()),
        })
    }

    /// Strongest vein contribution at a point, before jitter.
    #[must_use]
    pub fn grade_at(&self, p: Vec3) -> Option<f64> {
        // Gaussian with the width edge at two standard deviations
        let sigma = self.half_width * 0.5;
        self.centers
            .iter()
            .filter_map(|c| {
                let r = p - *c;
                let across = r.dot(self.normal).abs();
                let along = r.dot(self.strike_dir).abs();
                let down = r.dot(self.dip_dir).abs();
                (across < self.half_width && along <= self.half_strike && down <= self.half_dip)
                    .then(|| self.max_cu * (-0.5 * (across / sigma).powi(2)).exp())
            })
            .reduce(f64::max)
    }
}

impl BlockClassifier for Vein {
    fn classify(&self, block: &Block) -> Block {
        match self.grade_at(block.position()) {
            Some(grade) => {
                let jitter = self.noise.jitter(block.x, block.y, block.z, self.noise_scale, 0.2);
                let cu = grade * jitter;
                self.grader.finish(block, cu, cu * self.au_ratio, Some(ZONE))
            }
            None => self.grader.finish(block, 0.0, 0.0, None),
        }
    }
}

/// Vein set over a slice, with default cut-offs and economics.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for invalid overrides.
pub fn vein(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &VeinParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(
        blocks,
        materials,
        seed,
        || params.validate(),
        |ctx| Vein::prepare(ctx, params, GradeThresholds::default(), EconomicModel::default()),
    )
}
