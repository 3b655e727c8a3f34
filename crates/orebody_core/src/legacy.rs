//! Compatibility shim for block records that use the older field names
//! (`material`, `grade`, `value`) or camelCase keys.

use serde::Deserialize;

use crate::block::{Block, DEFAULT_DENSITY};
use crate::error::ModelError;
use crate::material::RockType;

/// A block record in the legacy schema.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LegacyBlock {
    /// Centroid easting.
    pub x: f64,
    /// Centroid northing.
    pub y: f64,
    /// Centroid elevation.
    pub z: f64,
    /// Lattice index along X.
    pub i: u32,
    /// Lattice index along Y.
    pub j: u32,
    /// Lattice index along Z.
    pub k: u32,
    /// Standard rock label.
    #[serde(alias = "rockType")]
    pub rock_type: Option<String>,
    /// Legacy rock label, used when `rock_type` is absent.
    pub material: Option<String>,
    /// Density; defaults to 2.5.
    pub density: Option<f64>,
    /// Zone label.
    pub zone: Option<String>,
    /// Copper grade.
    #[serde(alias = "gradeCu")]
    pub grade_cu: Option<f64>,
    /// Gold grade.
    #[serde(alias = "gradeAu")]
    pub grade_au: Option<f64>,
    /// Legacy single grade, used as copper grade when `grade_cu` is absent.
    pub grade: Option<f64>,
    /// Economic value.
    #[serde(alias = "econValue")]
    pub econ_value: Option<f64>,
    /// Legacy value, used when `econ_value` is absent.
    pub value: Option<f64>,
}

impl TryFrom<LegacyBlock> for Block {
    type Error = ModelError;

    fn try_from(legacy: LegacyBlock) -> Result<Self, Self::Error> {
        let rock_type = match legacy.rock_type.or(legacy.material) {
            Some(label) => label.parse()?,
            None => RockType::Waste,
        };

        Ok(Self {
            x: legacy.x,
            y: legacy.y,
            z: legacy.z,
            i: legacy.i,
            j: legacy.j,
            k: legacy.k,
            rock_type,
            density: legacy.density.unwrap_or(DEFAULT_DENSITY),
            zone: legacy.zone,
            grade_cu: legacy.grade_cu.or(legacy.grade),
            grade_au: legacy.grade_au,
            econ_value: legacy.econ_value.or(legacy.value),
        })
    }
}
