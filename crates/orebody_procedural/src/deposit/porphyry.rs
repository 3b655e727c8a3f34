//! Porphyry-style zoning: nested core, shell and halo with grade modifiers.
//!
//! The zoning pass blends nominal zone grades across the nested ellipsoids.
//! Modifiers are then applied in order: horizontal falloff, vertical
//! gradient, supergene enrichment, optional fault boost, fine-scale jitter.

use orebody_core::math::azimuth_direction;
use orebody_core::{Block, MaterialTable, ModelError, ModelResult, ModelSeed, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{check_finite, check_non_negative, check_positive, ellipsoid_distance};
use crate::classifier::{run_classifier, BlockClassifier, GenerationContext};
use crate::grade::{EconomicModel, GradeThresholds, OreGrader};
use crate::noise::{lerp, smoothstep, ValueNoise};

const IRREGULARITY_PURPOSE: u64 = 0x706F_7270_6879_7231;
const JITTER_PURPOSE: u64 = 0x706F_7270_6879_7232;

/// Minimum core, shell and halo radii in horizontal cells.
const MIN_RADII_CELLS: [f64; 3] = [2.0, 4.0, 6.0];

/// Normalized halo distance over which grade fades to zero outside the halo.
const OUTER_FADE: f64 = 0.5;

/// Vertical fault trace in plan view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaultTrace {
    /// Easting of a point on the trace.
    pub x: f64,
    /// Northing of a point on the trace.
    pub y: f64,
    /// Azimuth of the trace, degrees clockwise from north.
    pub azimuth: f64,
    /// Lateral decay distance of the boost.
    pub width: f64,
    /// Peak fractional boost on the trace.
    pub boost: f64,
}

/// Porphyry parameters. Unset fields are drawn per call or take defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PorphyryParams {
    /// Intrusion centre `[x, y, z]`.
    pub center: Option<[f64; 3]>,
    /// Horizontal core radius.
    pub core_radius: Option<f64>,
    /// Horizontal shell radius.
    pub shell_radius: Option<f64>,
    /// Horizontal halo radius.
    pub halo_radius: Option<f64>,
    /// Vertical-to-horizontal radius ratio of every zone.
    pub vertical_scale: f64,
    /// Nominal core Cu grade (%).
    pub core_cu: Option<f64>,
    /// Nominal shell Cu grade (%).
    pub shell_cu: Option<f64>,
    /// Nominal halo Cu grade (%).
    pub halo_cu: Option<f64>,
    /// Au (g/t) per % Cu.
    pub au_ratio: Option<f64>,
    /// Amplitude of the noise that roughens zone boundaries.
    pub irregularity: f64,
    /// Fractional grade loss at the halo radius, horizontally.
    pub horizontal_falloff: f64,
    /// Fractional grade change per model height away from the centre.
    pub vertical_gradient: f64,
    /// Depth of the supergene band as a fraction of model height.
    pub supergene_depth: f64,
    /// Grade multiplier at the top of the supergene band.
    pub supergene_factor: f64,
    /// Optional structural control.
    pub fault: Option<FaultTrace>,
    /// Peak-to-peak relative fine-scale noise.
    pub jitter: f64,
}

impl Default for PorphyryParams {
    fn default() -> Self {
        Self {
            center: None,
            core_radius: None,
            shell_radius: None,
            halo_radius: None,
            vertical_scale: 1.5,
            core_cu: None,
            shell_cu: None,
            halo_cu: None,
            au_ratio: None,
            irregularity: 0.3,
            horizontal_falloff: 0.2,
            vertical_gradient: 0.3,
            supergene_depth: 0.15,
            supergene_factor: 1.5,
            fault: None,
            jitter: 0.1,
        }
    }
}

impl PorphyryParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for non-positive radii,
    /// radii that are not strictly nested, or out-of-range modifiers.
    pub fn validate(&self) -> ModelResult<()> {
        if let Some(center) = self.center {
            check_finite("center", &center)?;
        }
        check_positive("core_radius", self.core_radius)?;
        check_positive("shell_radius", self.shell_radius)?;
        check_positive("halo_radius", self.halo_radius)?;
        check_positive("vertical_scale", Some(self.vertical_scale))?;
        check_non_negative("core_cu", self.core_cu)?;
        check_non_negative("shell_cu", self.shell_cu)?;
        check_non_negative("halo_cu", self.halo_cu)?;
        check_non_negative("au_ratio", self.au_ratio)?;
        check_non_negative("supergene_depth", Some(self.supergene_depth))?;
        check_non_negative("supergene_factor", Some(self.supergene_factor))?;
        check_non_negative("vertical_gradient", Some(self.vertical_gradient))?;

        for (name, value) in [
            ("irregularity", self.irregularity),
            ("horizontal_falloff", self.horizontal_falloff),
            ("jitter", self.jitter),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ModelError::invalid(name, format!("must be in [0, 1), got {value}")));
            }
        }

        if let (Some(core), Some(shell)) = (self.core_radius, self.shell_radius) {
            if core >= shell {
                return Err(ModelError::invalid("core_radius", "must be smaller than shell_radius"));
            }
        }
        if let (Some(shell), Some(halo)) = (self.shell_radius, self.halo_radius) {
            if shell >= halo {
                return Err(ModelError::invalid("shell_radius", "must be smaller than halo_radius"));
            }
        }

        if let Some(fault) = self.fault {
            check_finite("fault", &[fault.x, fault.y, fault.azimuth])?;
            check_positive("fault.width", Some(fault.width))?;
            check_non_negative("fault.boost", Some(fault.boost))?;
        }
        Ok(())
    }
}

/// Zone of a block relative to the nested ellipsoids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PorphyryZone {
    /// Inside the core.
    Core,
    /// Between core and shell.
    Shell,
    /// Between shell and halo.
    Halo,
    /// Beyond the halo.
    Outside,
}

impl PorphyryZone {
    /// Label written to the block, if any.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Core => Some("Core"),
            Self::Shell => Some("Shell"),
            Self::Halo => Some("Halo"),
            Self::Outside => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Fault {
    origin: Vec3,
    direction: Vec3,
    width: f64,
    boost: f64,
}

impl Fault {
    fn factor(&self, p: Vec3) -> f64 {
        let r = p - self.origin;
        let lateral = (r.x * self.direction.y - r.y * self.direction.x).abs();
        1.0 + self.boost * (-(lateral / self.width).powi(2)).exp()
    }
}

/// Prepared porphyry system.
#[derive(Clone, Debug)]
pub struct Porphyry {
    center: Vec3,
    /// Core, shell and halo semi-axes.
    radii: [Vec3; 3],
    grades: [f64; 3],
    au_ratio: f64,
    irregularity: f64,
    horizontal_falloff: f64,
    vertical_gradient: f64,
    model_top: f64,
    model_height: f64,
    supergene_band: f64,
    supergene_factor: f64,
    fault: Option<Fault>,
    jitter: f64,
    shape_noise: ValueNoise,
    shape_scale: f64,
    jitter_noise: ValueNoise,
    jitter_scale: f64,
    grader: OreGrader,
}

impl Porphyry {
    /// Resolves the system for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid parameters, or
    /// if the radii are not strictly nested once minimum sizes apply.
    pub fn prepare(
        ctx: &mut GenerationContext<'_>,
        params: &PorphyryParams,
        thresholds: GradeThresholds,
        economics: EconomicModel,
    ) -> ModelResult<Self> {
        params.validate()?;
        thresholds.validate()?;

        let bounds = ctx.bounds;
        let span = bounds.span();
        let cell = bounds.horizontal_cell();
        let rng = &mut ctx.rng;

        let offset = Vec3::new(
            rng.gen_range(-0.03..=0.03),
            rng.gen_range(-0.03..=0.03),
            rng.gen_range(-0.03..=0.03),
        );
        let halo_frac: f64 = rng.gen_range(0.3..=0.4);
        let shell_frac: f64 = rng.gen_range(0.55..=0.65);
        let core_frac: f64 = rng.gen_range(0.45..=0.55);
        let core_cu: f64 = rng.gen_range(1.2..=1.6);
        let shell_cu: f64 = rng.gen_range(0.6..=0.8);
        let halo_cu: f64 = rng.gen_range(0.32..=0.4);
        let au_ratio: f64 = rng.gen_range(0.8..=1.2);

        let [min_core, min_shell, min_halo] = MIN_RADII_CELLS.map(|cells| cells * cell);
        let drawn_halo = span.x.min(span.y) * halo_frac;
        let explicit_core = params.core_radius.map(|r| r.max(min_core));

        // Unset outer radii grow to enclose an explicit inner one.
        let shell = match (params.shell_radius, params.halo_radius, explicit_core) {
            (Some(shell), _, _) => shell,
            (None, Some(halo), Some(core)) => 0.5 * (core + halo.max(min_halo)),
            (None, halo, core) => {
                let from_halo = halo.unwrap_or(drawn_halo).max(min_halo) * shell_frac;
                core.map_or(from_halo, |core| from_halo.max(core / core_frac))
            }
        }
        .max(min_shell);
        let halo = params
            .halo_radius
            .unwrap_or_else(|| drawn_halo.max(shell / shell_frac))
            .max(min_halo);
        let core = explicit_core.unwrap_or((shell * core_frac).max(min_core));

        if core >= shell {
            return Err(ModelError::invalid(
                "core_radius",
                format!("radii must nest strictly, got core {core}, shell {shell}, halo {halo}"),
            ));
        }
        if shell >= halo {
            return Err(ModelError::invalid(
                "shell_radius",
                format!("radii must nest strictly, got core {core}, shell {shell}, halo {halo}"),
            ));
        }

        let radii = [core, shell, halo].map(|r| Vec3::new(r, r, r * params.vertical_scale));
        let center = params
            .center
            .map_or_else(|| bounds.center() + bounds.extent().mul_elements(offset), Vec3::from_array);
        let model_top = bounds.max.z + bounds.cell_size.z * 0.5;

        let fault = params.fault.map(|f| Fault {
            origin: Vec3::new(f.x, f.y, 0.0),
            direction: azimuth_direction(f.azimuth),
            width: f.width,
            boost: f.boost,
        });

        tracing::debug!(?center, core, shell, halo, "porphyry zones drawn");

        Ok(Self {
            center,
            radii,
            grades: [
                params.core_cu.unwrap_or(core_cu),
                params.shell_cu.unwrap_or(shell_cu),
                params.halo_cu.unwrap_or(halo_cu),
            ],
            au_ratio: params.au_ratio.unwrap_or(au_ratio),
            irregularity: params.irregularity,
            horizontal_falloff: params.horizontal_falloff,
            vertical_gradient: params.vertical_gradient,
            model_top,
            model_height: span.z,
            supergene_band: params.supergene_depth * span.z,
            supergene_factor: params.supergene_factor,
            fault,
            jitter: params.jitter,
            shape_noise: ctx.noise(IRREGULARITY_PURPOSE),
            shape_scale: 1.5 / shell,
            jitter_noise: ctx.noise(JITTER_PURPOSE),
            jitter_scale: 1.0 / bounds.mean_cell(),
            grader: OreGrader::new(thresholds, economics, ctx.palette()),
        })
    }

    /// Zone and blended base grade at a point, before modifiers.
    #[must_use]
    pub fn zoning(&self, p: Vec3) -> (PorphyryZone, f64) {
        let offset = p - self.center;
        let roughness = 1.0
            + self.irregularity * (self.shape_noise.sample(p.x, p.y, p.z, self.shape_scale) - 0.5);
        let [dc, ds, dh] = self.radii.map(|r| ellipsoid_distance(offset, r) / roughness);
        let [core, shell, halo] = self.grades;

        // Along any ray dc/ds is the constant shell/core radius ratio, so
        // (dc - 1) / (dc/ds - 1) runs 0..1 from core to shell boundary.
        if dc < 1.0 {
            (PorphyryZone::Core, core)
        } else if ds < 1.0 {
            let t = (dc - 1.0) / (dc / ds - 1.0);
            (PorphyryZone::Shell, lerp(core, shell, smoothstep(t)))
        } else if dh < 1.0 {
            let t = (ds - 1.0) / (ds / dh - 1.0);
            (PorphyryZone::Halo, lerp(shell, halo, smoothstep(t)))
        } else {
            let t = (dh - 1.0) / OUTER_FADE;
            (PorphyryZone::Outside, halo * (1.0 - smoothstep(t)))
        }
    }

    /// Product of the position-dependent modifiers, before jitter.
    #[must_use]
    pub fn modifier(&self, p: Vec3) -> f64 {
        let offset = p - self.center;
        let halo = self.radii[2].x;

        let horizontal = 1.0 - self.horizontal_falloff * (offset.horizontal_length() / halo).min(1.0);
        let vertical = (1.0 + self.vertical_gradient * offset.z / self.model_height).max(0.0);

        let depth = self.model_top - p.z;
        let supergene = if self.supergene_band > 0.0 && depth < self.supergene_band {
            1.0 + (self.supergene_factor - 1.0) * (1.0 - depth / self.supergene_band)
        } else {
            1.0
        };

        let structural = self.fault.map_or(1.0, |f| f.factor(p));
        horizontal * vertical * supergene * structural
    }
}

impl BlockClassifier for Porphyry {
    fn classify(&self, block: &Block) -> Block {
        let p = block.position();
        let (zone, base) = self.zoning(p);
        let jitter = self
            .jitter_noise
            .jitter(p.x, p.y, p.z, self.jitter_scale, self.jitter);
        let cu = base * self.modifier(p) * jitter;
        self.grader.finish(block, cu, cu * self.au_ratio, zone.label())
    }
}

/// Porphyry system over a slice, with default cut-offs and economics.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for invalid parameters.
pub fn porphyry(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &PorphyryParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(
        blocks,
        materials,
        seed,
        || params.validate(),
        |ctx| Porphyry::prepare(ctx, params, GradeThresholds::default(), EconomicModel::default()),
    )
}
