//! # Blocks
//!
//! One block per lattice cell. Generators never edit blocks in place: they
//! read a slice and return new blocks.

use serde::{Deserialize, Serialize};

use crate::material::{MaterialDefinition, RockType};
use crate::math::Vec3;

/// Density assigned by the grid builder (t/m³).
pub const DEFAULT_DENSITY: f64 = 2.5;

/// A single block of the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Centroid easting.
    pub x: f64,
    /// Centroid northing.
    pub y: f64,
    /// Centroid elevation (decreases with `k`).
    pub z: f64,
    /// Lattice index along X.
    pub i: u32,
    /// Lattice index along Y.
    pub j: u32,
    /// Lattice index along Z (0 is shallowest).
    pub k: u32,
    /// Rock classification.
    pub rock_type: RockType,
    /// Density (t/m³). The reservoir analogue stores porosity here.
    pub density: f64,
    /// Optional zone label.
    pub zone: Option<String>,
    /// Copper grade (%), or oil saturation (%) in the reservoir analogue.
    pub grade_cu: Option<f64>,
    /// Gold grade (g/t), or gas saturation (%) in the reservoir analogue.
    pub grade_au: Option<f64>,
    /// Economic value per block.
    pub econ_value: Option<f64>,
}

impl Block {
    /// Creates a waste block at the given lattice position and centroid.
    #[must_use]
    pub const fn new(i: u32, j: u32, k: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            i,
            j,
            k,
            rock_type: RockType::Waste,
            density: DEFAULT_DENSITY,
            zone: None,
            grade_cu: None,
            grade_au: None,
            econ_value: None,
        }
    }

    /// Centroid as a vector.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Returns true if this block is air (density <= 0).
    #[inline]
    #[must_use]
    pub fn is_air(&self) -> bool {
        self.density <= 0.0
    }

    /// Returns a copy carrying `rock` and every field of `material`.
    #[must_use]
    pub fn with_material(&self, rock: RockType, material: &MaterialDefinition) -> Self {
        Self {
            rock_type: rock,
            density: material.density,
            zone: material.zone.clone(),
            grade_cu: Some(material.grade_cu),
            grade_au: Some(material.grade_au),
            econ_value: Some(material.econ_value),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialTable;

    #[test]
    fn test_new_block_defaults() {
        let block = Block::new(1, 2, 3, 10.0, 20.0, -30.0);
        assert_eq!(block.rock_type, RockType::Waste);
        assert_eq!(block.density, DEFAULT_DENSITY);
        assert!(block.zone.is_none());
        assert!(block.grade_cu.is_none());
        assert!(block.grade_au.is_none());
        assert!(block.econ_value.is_none());
    }

    #[test]
    fn test_with_material_keeps_position() {
        let table = MaterialTable::standard();
        let block = Block::new(4, 5, 6, 1.0, 2.0, 3.0);
        let ore = block.with_material(RockType::OreHigh, &table.definition(RockType::OreHigh));

        assert_eq!((ore.i, ore.j, ore.k), (4, 5, 6));
        assert_eq!(ore.position(), block.position());
        assert_eq!(ore.rock_type, RockType::OreHigh);
        assert_eq!(ore.grade_cu, Some(1.2));
        assert_eq!(ore.econ_value, Some(159.0));
    }

    #[test]
    fn test_air_detection() {
        let mut block = Block::new(0, 0, 0, 0.0, 0.0, 0.0);
        assert!(!block.is_air());
        block.density = 0.0;
        assert!(block.is_air());
        block.density = -1.0;
        assert!(block.is_air());
    }
}
