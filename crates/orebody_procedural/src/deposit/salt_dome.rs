//! Salt-dome reservoir analogue.
//!
//! A parabolic salt diapir under a cap rock, with reservoir sands draped on
//! its flanks and interbedded with shale. Sands carry gas above the gas-oil
//! contact, oil above the oil-water contact and water below.
//!
//! Field reuse: `grade_cu` holds oil saturation (%), `grade_au` gas
//! saturation (%), and `density` porosity (fraction).

use orebody_core::{Block, MaterialTable, ModelError, ModelResult, ModelSeed, RockType, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{check_finite, check_non_negative, check_positive};
use crate::classifier::{run_classifier, BlockClassifier, GenerationContext, Palette};
use crate::noise::{hash_unit, lerp, ValueNoise};

const BEDDING_PURPOSE: u64 = 0x7361_6C74_6265_6431;
const PROPERTY_PURPOSE: u64 = 0x7361_6C74_7072_6F70;

/// Salt-dome parameters. Elevations are absolute z values; unset fields are
/// drawn per call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaltDomeParams {
    /// Dome axis `[x, y]`.
    pub center: Option<[f64; 2]>,
    /// Elevation of the salt crest on the axis.
    pub crest: Option<f64>,
    /// Elevation at which the salt reaches its full radius.
    pub base: Option<f64>,
    /// Salt radius at the base.
    pub radius: Option<f64>,
    /// Cap-rock thickness above the salt top.
    pub cap_thickness: Option<f64>,
    /// Horizontal width of the flank sand belt.
    pub flank_width: Option<f64>,
    /// Gas-oil contact elevation.
    pub gas_oil_contact: Option<f64>,
    /// Oil-water contact elevation.
    pub oil_water_contact: Option<f64>,
    /// Bedding-noise level above which a flank block is sand.
    pub sand_threshold: f64,
}

impl Default for SaltDomeParams {
    fn default() -> Self {
        Self {
            center: None,
            crest: None,
            base: None,
            radius: None,
            cap_thickness: None,
            flank_width: None,
            gas_oil_contact: None,
            oil_water_contact: None,
            sand_threshold: 0.35,
        }
    }
}

impl SaltDomeParams {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for non-finite elevations,
    /// a crest not above the base, a gas-oil contact below the oil-water
    /// contact, or non-positive sizes.
    pub fn validate(&self) -> ModelResult<()> {
        if let Some(center) = self.center {
            check_finite("center", &center)?;
        }
        let elevations = [self.crest, self.base, self.gas_oil_contact, self.oil_water_contact];
        check_finite("crest", &elevations.map(|e| e.unwrap_or(0.0)))?;
        check_positive("radius", self.radius)?;
        check_non_negative("cap_thickness", self.cap_thickness)?;
        check_positive("flank_width", self.flank_width)?;
        if !(0.0..=1.0).contains(&self.sand_threshold) {
            return Err(ModelError::invalid(
                "sand_threshold",
                format!("must be in [0, 1], got {}", self.sand_threshold),
            ));
        }
        if let (Some(crest), Some(base)) = (self.crest, self.base) {
            if crest <= base {
                return Err(ModelError::invalid("crest", "must be above base"));
            }
        }
        if let (Some(goc), Some(owc)) = (self.gas_oil_contact, self.oil_water_contact) {
            if goc < owc {
                return Err(ModelError::invalid("gas_oil_contact", "must not be below oil_water_contact"));
            }
        }
        Ok(())
    }
}

/// Prices and yields for reservoir blocks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirEconomics {
    /// Oil price per barrel.
    pub oil_price: f64,
    /// Gas price per thousand cubic feet.
    pub gas_price: f64,
    /// Barrels recovered per tonne of fully saturated pore volume.
    pub barrels_per_tonne: f64,
    /// MCF recovered per tonne of fully saturated pore volume.
    pub mcf_per_tonne: f64,
    /// Extraction cost charged to sand blocks.
    pub extraction_cost: f64,
    /// Cost charged to salt, cap rock and shale (value is its negation).
    pub non_reservoir_cost: f64,
}

impl Default for ReservoirEconomics {
    fn default() -> Self {
        Self {
            oil_price: 70.0,
            gas_price: 3.0,
            barrels_per_tonne: 7.33,
            mcf_per_tonne: 35.0,
            extraction_cost: 5.0,
            non_reservoir_cost: 2.0,
        }
    }
}

impl ReservoirEconomics {
    /// Value of a block from its porosity and saturations (%).
    #[must_use]
    pub fn value(&self, rock: RockType, porosity: f64, oil_sat: f64, gas_sat: f64) -> f64 {
        match rock {
            RockType::OilSand | RockType::GasSand | RockType::WaterSand => {
                let oil = porosity * oil_sat / 100.0 * self.barrels_per_tonne * self.oil_price;
                let gas = porosity * gas_sat / 100.0 * self.mcf_per_tonne * self.gas_price;
                oil + gas - self.extraction_cost
            }
            _ => -self.non_reservoir_cost,
        }
    }
}

/// Porosity and saturation ranges per rock: `(porosity, oil %, gas %)`.
fn property_ranges(rock: RockType) -> [(f64, f64); 3] {
    match rock {
        RockType::GasSand => [(0.18, 0.30), (0.0, 5.0), (60.0, 85.0)],
        RockType::OilSand => [(0.18, 0.30), (55.0, 80.0), (0.0, 8.0)],
        RockType::WaterSand => [(0.18, 0.30), (0.0, 10.0), (0.0, 0.0)],
        RockType::CapRock => [(0.02, 0.05), (0.0, 0.0), (0.0, 0.0)],
        RockType::Salt => [(0.005, 0.015), (0.0, 0.0), (0.0, 0.0)],
        _ => [(0.04, 0.10), (0.0, 0.0), (0.0, 0.0)],
    }
}

/// Prepared salt dome.
#[derive(Clone, Debug)]
pub struct SaltDome {
    axis: Vec3,
    crest: f64,
    base: f64,
    radius: f64,
    cap_thickness: f64,
    flank_width: f64,
    gas_oil_contact: f64,
    oil_water_contact: f64,
    sand_threshold: f64,
    bedding: ValueNoise,
    bedding_scale: Vec3,
    property_seed: u64,
    economics: ReservoirEconomics,
    palette: Palette,
}

impl SaltDome {
    /// Resolves the dome for one call.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid parameters or an
    /// inconsistent mix of explicit and drawn elevations.
    pub fn prepare(
        ctx: &mut GenerationContext<'_>,
        params: &SaltDomeParams,
        economics: ReservoirEconomics,
    ) -> ModelResult<Self> {
        params.validate()?;

        let bounds = ctx.bounds;
        let span = bounds.span();
        let cell = bounds.cell_size;
        let top = bounds.max.z + cell.z * 0.5;
        let bottom = bounds.min.z - cell.z * 0.5;
        let height = span.z;
        let rng = &mut ctx.rng;

        let offset = Vec3::new(rng.gen_range(-0.05..=0.05), rng.gen_range(-0.05..=0.05), 0.0);
        let crest_frac: f64 = rng.gen_range(0.15..=0.25);
        let radius_frac: f64 = rng.gen_range(0.25..=0.35);
        let cap_frac: f64 = rng.gen_range(0.04..=0.08);
        let flank_frac: f64 = rng.gen_range(0.4..=0.6);
        let goc_frac: f64 = rng.gen_range(0.1..=0.2);
        let owc_frac: f64 = rng.gen_range(0.15..=0.25);

        let axis = params.center.map_or_else(
            || bounds.center() + bounds.extent().mul_elements(offset),
            |[x, y]| Vec3::new(x, y, 0.0),
        );
        let crest = params.crest.unwrap_or(top - height * crest_frac);
        let base = params.base.unwrap_or(bottom);
        if crest <= base {
            return Err(ModelError::invalid(
                "crest",
                format!("crest {crest} must be above base {base}"),
            ));
        }
        let radius = params
            .radius
            .unwrap_or_else(|| (span.x.min(span.y) * radius_frac).max(2.0 * bounds.horizontal_cell()));
        // An unset contact keeps its drawn gap to an explicit one.
        let gas_oil_contact = params.gas_oil_contact.unwrap_or_else(|| {
            let drawn = crest - height * goc_frac;
            params
                .oil_water_contact
                .map_or(drawn, |owc| drawn.max(owc + height * owc_frac))
        });
        let oil_water_contact = params
            .oil_water_contact
            .unwrap_or(gas_oil_contact - height * owc_frac);
        if gas_oil_contact < oil_water_contact {
            return Err(ModelError::invalid(
                "gas_oil_contact",
                "must not be below oil_water_contact",
            ));
        }

        let dome = Self {
            axis,
            crest,
            base,
            radius,
            cap_thickness: params.cap_thickness.unwrap_or((height * cap_frac).max(cell.z)),
            flank_width: params
                .flank_width
                .unwrap_or_else(|| (radius * flank_frac).max(2.0 * bounds.horizontal_cell())),
            gas_oil_contact,
            oil_water_contact,
            sand_threshold: params.sand_threshold,
            bedding: ctx.noise(BEDDING_PURPOSE),
            bedding_scale: Vec3::new(
                1.0 / (6.0 * cell.x),
                1.0 / (6.0 * cell.y),
                1.0 / (1.5 * cell.z),
            ),
            property_seed: ctx.seed.derive(PROPERTY_PURPOSE).value(),
            economics,
            palette: ctx.palette(),
        };
        tracing::debug!(
            crest = dome.crest,
            radius = dome.radius,
            goc = dome.gas_oil_contact,
            owc = dome.oil_water_contact,
            "salt dome drawn"
        );
        Ok(dome)
    }

    /// Salt-top elevation at horizontal distance `r` from the axis.
    #[must_use]
    pub fn salt_top(&self, r: f64) -> Option<f64> {
        (r <= self.radius).then(|| self.crest - (self.crest - self.base) * (r / self.radius).powi(2))
    }

    /// Salt radius at elevation `z`, if the salt reaches that elevation.
    #[must_use]
    pub fn salt_radius(&self, z: f64) -> Option<f64> {
        (z <= self.crest).then(|| (self.radius * ((self.crest - z) / (self.crest - self.base)).sqrt()).min(self.radius))
    }

    /// Rock type at a point.
    #[must_use]
    pub fn rock_at(&self, p: Vec3) -> RockType {
        let r = (p - self.axis).horizontal_length();

        if let Some(salt_top) = self.salt_top(r) {
            if p.z <= salt_top {
                return RockType::Salt;
            }
            if p.z <= salt_top + self.cap_thickness {
                return RockType::CapRock;
            }
        }

        let on_flank = self
            .salt_radius(p.z)
            .is_some_and(|wall| r - wall > 0.0 && r - wall <= self.flank_width);
        if !on_flank {
            return RockType::Shale;
        }

        let s = self.bedding_scale;
        let bedding = self.bedding.sample(p.x * s.x, p.y * s.y, p.z * s.z, 1.0);
        if bedding <= self.sand_threshold {
            RockType::Shale
        } else if p.z > self.gas_oil_contact {
            RockType::GasSand
        } else if p.z > self.oil_water_contact {
            RockType::OilSand
        } else {
            RockType::WaterSand
        }
    }
}

impl BlockClassifier for SaltDome {
    fn classify(&self, block: &Block) -> Block {
        let rock = self.rock_at(block.position());
        let [porosity_range, oil_range, gas_range] = property_ranges(rock);
        let draw = |channel: u32, (lo, hi): (f64, f64)| {
            lerp(lo, hi, hash_unit(self.property_seed, block.i, block.j, block.k, channel))
        };
        let porosity = draw(1, porosity_range);
        let oil = draw(2, oil_range);
        let gas = draw(3, gas_range);

        Block {
            rock_type: rock,
            density: porosity,
            zone: self.palette.get(rock).zone.clone(),
            grade_cu: Some(oil),
            grade_au: Some(gas),
            econ_value: Some(self.economics.value(rock, porosity, oil, gas)),
            ..block.clone()
        }
    }
}

/// Salt-dome analogue over a slice, with default reservoir economics.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] for invalid parameters.
pub fn salt_dome(
    blocks: &[Block],
    materials: &MaterialTable,
    params: &SaltDomeParams,
    seed: Option<ModelSeed>,
) -> ModelResult<Vec<Block>> {
    run_classifier(
        blocks,
        materials,
        seed,
        || params.validate(),
        |ctx| SaltDome::prepare(ctx, params, ReservoirEconomics::default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use orebody_core::{build_grid, GridParams};

    fn grid() -> Vec<Block> {
        // 400 x 400 x 200 m, top at z = 0
        build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(10.0), [40, 40, 20])).unwrap()
    }

    fn fixed() -> SaltDomeParams {
        SaltDomeParams {
            center: Some([200.0, 200.0]),
            crest: Some(-40.0),
            base: Some(-200.0),
            radius: Some(120.0),
            cap_thickness: Some(10.0),
            flank_width: Some(60.0),
            gas_oil_contact: Some(-80.0),
            oil_water_contact: Some(-130.0),
            sand_threshold: 0.0,
        }
    }

    fn at(out: &[Block], ijk: (u32, u32, u32)) -> &Block {
        out.iter().find(|b| (b.i, b.j, b.k) == ijk).unwrap()
    }

    #[test]
    fn test_axis_column_salt_cap_overburden() {
        let out = salt_dome(&grid(), &MaterialTable::standard(), &fixed(), Some(ModelSeed::new(1))).unwrap();

        assert_eq!(at(&out, (20, 20, 4)).rock_type, RockType::Salt);
        assert_eq!(at(&out, (20, 20, 3)).rock_type, RockType::CapRock);
        assert_eq!(at(&out, (20, 20, 2)).rock_type, RockType::Shale);
        assert_eq!(at(&out, (20, 20, 4)).zone.as_deref(), Some("Diapir"));
        assert_eq!(at(&out, (20, 20, 3)).zone.as_deref(), Some("Seal"));
    }

    #[test]
    fn test_flank_fluids_follow_contacts() {
        let out = salt_dome(&grid(), &MaterialTable::standard(), &fixed(), Some(ModelSeed::new(1))).unwrap();

        assert_eq!(at(&out, (29, 19, 6)).rock_type, RockType::GasSand);
        assert_eq!(at(&out, (29, 19, 10)).rock_type, RockType::OilSand);
        assert_eq!(at(&out, (31, 19, 15)).rock_type, RockType::WaterSand);

        for b in &out {
            match b.rock_type {
                RockType::GasSand => assert!(b.z > -80.0),
                RockType::OilSand => assert!(b.z <= -80.0 && b.z > -130.0),
                RockType::WaterSand => assert!(b.z <= -130.0),
                _ => {}
            }
        }
    }

    #[test]
    fn test_saturations_porosity_and_value() {
        let economics = ReservoirEconomics::default();
        let out = salt_dome(&grid(), &MaterialTable::standard(), &fixed(), Some(ModelSeed::new(1))).unwrap();

        for b in &out {
            let (oil, gas) = (b.grade_cu.unwrap(), b.grade_au.unwrap());
            assert!(b.density > 0.0 && b.density < 0.31, "porosity {}", b.density);
            let expected = economics.value(b.rock_type, b.density, oil, gas);
            assert!((b.econ_value.unwrap() - expected).abs() < 1e-9);
            match b.rock_type {
                RockType::OilSand => assert!(oil >= 55.0 && gas <= 8.0),
                RockType::GasSand => assert!(gas >= 60.0 && oil <= 5.0),
                RockType::Salt | RockType::CapRock | RockType::Shale => {
                    assert_eq!((oil, gas), (0.0, 0.0));
                    assert_eq!(b.econ_value, Some(-2.0));
                }
                _ => {}
            }
        }
        let oil_value = out
            .iter()
            .filter(|b| b.rock_type == RockType::OilSand)
            .map(|b| b.econ_value.unwrap())
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(oil_value > 50.0);
    }

    #[test]
    fn test_default_dome_has_every_unit() {
        let out = salt_dome(&grid(), &MaterialTable::standard(), &SaltDomeParams::default(), Some(ModelSeed::new(12))).unwrap();
        for rock in [RockType::Salt, RockType::CapRock, RockType::Shale] {
            assert!(out.iter().any(|b| b.rock_type == rock), "no {rock}");
        }
        assert!(out
            .iter()
            .any(|b| matches!(b.rock_type, RockType::OilSand | RockType::GasSand | RockType::WaterSand)));
    }

    #[test]
    fn test_single_explicit_contact_keeps_order_for_any_seed() {
        let blocks = grid();
        let table = MaterialTable::standard();
        for (goc, owc) in [(None, Some(-40.0)), (Some(-150.0), None), (None, Some(-190.0))] {
            let params = SaltDomeParams {
                gas_oil_contact: goc,
                oil_water_contact: owc,
                ..SaltDomeParams::default()
            };
            for seed in 0..20 {
                let mut ctx = GenerationContext::from_blocks(&blocks, &table, Some(ModelSeed::new(seed))).unwrap();
                let dome = SaltDome::prepare(&mut ctx, &params, ReservoirEconomics::default())
                    .unwrap_or_else(|e| panic!("goc {goc:?} owc {owc:?} seed {seed}: {e}"));
                assert!(dome.gas_oil_contact >= dome.oil_water_contact, "seed {seed}");
                if let Some(owc) = owc {
                    assert!((dome.oil_water_contact - owc).abs() < 1e-9);
                }
                if let Some(goc) = goc {
                    assert!((dome.gas_oil_contact - goc).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_rejects_inverted_contacts() {
        let params = SaltDomeParams {
            gas_oil_contact: Some(-150.0),
            oil_water_contact: Some(-100.0),
            ..SaltDomeParams::default()
        };
        assert!(salt_dome(&grid(), &MaterialTable::standard(), &params, None).is_err());
    }
}
