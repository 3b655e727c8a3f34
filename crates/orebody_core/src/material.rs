//! # Rock Types and Material Table
//!
//! The categorical vocabulary assigned to blocks, and the fixed properties
//! each category carries.
//!
//! The table is an ordinary value, not process-wide state. Generators take it
//! by reference so tests can swap in alternate tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Rock classification of a block.
///
/// The metal vocabulary (`Waste` .. `Ore`) is used by the material patterns
/// and ore-body generators; the reservoir vocabulary (`Salt` .. `Shale`) is
/// used by the salt-dome analogue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RockType {
    /// Barren rock.
    #[default]
    Waste,
    /// Low-grade ore.
    #[serde(rename = "Ore_Low")]
    OreLow,
    /// Medium-grade ore.
    #[serde(rename = "Ore_Med")]
    OreMed,
    /// High-grade ore.
    #[serde(rename = "Ore_High")]
    OreHigh,
    /// Generic ore (horizon and vein patterns).
    Ore,
    /// Empty space above topography.
    Air,
    /// Evaporite diapir.
    Salt,
    /// Anhydrite/calcite cap over the diapir.
    CapRock,
    /// Oil-bearing sand.
    OilSand,
    /// Gas-bearing sand.
    GasSand,
    /// Water-bearing sand.
    WaterSand,
    /// Sealing shale.
    Shale,
}

impl RockType {
    /// Every rock type, in label order of the material table.
    pub const ALL: [Self; 12] = [
        Self::Waste,
        Self::OreLow,
        Self::OreMed,
        Self::OreHigh,
        Self::Ore,
        Self::Air,
        Self::Salt,
        Self::CapRock,
        Self::OilSand,
        Self::GasSand,
        Self::WaterSand,
        Self::Shale,
    ];

    /// The four grade tiers used by the layered, gradient, random and
    /// cluster patterns, from barren to richest.
    pub const GRADE_TIERS: [Self; 4] = [Self::Waste, Self::OreLow, Self::OreMed, Self::OreHigh];

    /// Canonical label, as written to exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Waste => "Waste",
            Self::OreLow => "Ore_Low",
            Self::OreMed => "Ore_Med",
            Self::OreHigh => "Ore_High",
            Self::Ore => "Ore",
            Self::Air => "Air",
            Self::Salt => "Salt",
            Self::CapRock => "CapRock",
            Self::OilSand => "OilSand",
            Self::GasSand => "GasSand",
            Self::WaterSand => "WaterSand",
            Self::Shale => "Shale",
        }
    }

    /// Returns true for the metal ore categories.
    #[must_use]
    pub const fn is_ore(self) -> bool {
        matches!(self, Self::OreLow | Self::OreMed | Self::OreHigh | Self::Ore)
    }

    /// Position of this rock type in [`RockType::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RockType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rock| rock.label() == s)
            .ok_or_else(|| ModelError::UnknownRockType(s.to_string()))
    }
}

/// Fixed properties of one rock type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    /// Density in t/m³.
    pub density: f64,
    /// Nominal copper grade (%).
    #[serde(default)]
    pub grade_cu: f64,
    /// Nominal gold grade (g/t).
    #[serde(default)]
    pub grade_au: f64,
    /// Nominal economic value per block.
    #[serde(default)]
    pub econ_value: f64,
    /// Zone label, if the material carries one.
    #[serde(default)]
    pub zone: Option<String>,
}

impl MaterialDefinition {
    /// Neutral definition used for rock types absent from a table.
    pub const NEUTRAL: Self = Self {
        density: crate::block::DEFAULT_DENSITY,
        grade_cu: 0.0,
        grade_au: 0.0,
        econ_value: 0.0,
        zone: None,
    };

    const fn plain(density: f64, grade_cu: f64, grade_au: f64, econ_value: f64) -> Self {
        Self {
            density,
            grade_cu,
            grade_au,
            econ_value,
            zone: None,
        }
    }

    fn zoned(density: f64, econ_value: f64, zone: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
            ..Self::plain(density, 0.0, 0.0, econ_value)
        }
    }
}

/// Mapping from rock type to its material definition.
///
/// TOML form is one table per rock label:
///
/// ```toml
/// [Ore_High]
/// density = 2.9
/// grade_cu = 1.5
/// grade_au = 3.2
/// econ_value = 175.0
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, MaterialDefinition>",
    into = "BTreeMap<String, MaterialDefinition>"
)]
pub struct MaterialTable {
    entries: BTreeMap<RockType, MaterialDefinition>,
}

impl TryFrom<BTreeMap<String, MaterialDefinition>> for MaterialTable {
    type Error = ModelError;

    fn try_from(raw: BTreeMap<String, MaterialDefinition>) -> Result<Self, Self::Error> {
        let entries = raw
            .into_iter()
            .map(|(label, def)| Ok((label.parse::<RockType>()?, def)))
            .collect::<ModelResult<_>>()?;
        Ok(Self { entries })
    }
}

impl From<MaterialTable> for BTreeMap<String, MaterialDefinition> {
    fn from(table: MaterialTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(rock, def)| (rock.label().to_string(), def))
            .collect()
    }
}

impl MaterialTable {
    /// Creates an empty table. Every lookup falls back to
    /// [`MaterialDefinition::NEUTRAL`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in material table.
    #[must_use]
    pub fn standard() -> Self {
        let entries = BTreeMap::from([
            (RockType::Waste, MaterialDefinition::plain(2.5, 0.0, 0.0, -5.0)),
            (RockType::OreLow, MaterialDefinition::plain(2.6, 0.4, 0.6, 23.0)),
            (RockType::OreMed, MaterialDefinition::plain(2.7, 0.7, 1.5, 74.0)),
            (RockType::OreHigh, MaterialDefinition::plain(2.8, 1.2, 3.0, 159.0)),
            (RockType::Ore, MaterialDefinition::plain(2.7, 0.8, 1.2, 61.0)),
            (RockType::Air, MaterialDefinition::plain(0.0, 0.0, 0.0, 0.0)),
            (RockType::Salt, MaterialDefinition::zoned(2.16, -2.0, "Diapir")),
            (RockType::CapRock, MaterialDefinition::zoned(2.4, -2.0, "Seal")),
            (RockType::OilSand, MaterialDefinition::zoned(2.3, 0.0, "Reservoir")),
            (RockType::GasSand, MaterialDefinition::zoned(2.2, 0.0, "Reservoir")),
            (RockType::WaterSand, MaterialDefinition::zoned(2.3, -5.0, "Aquifer")),
            (RockType::Shale, MaterialDefinition::plain(2.5, 0.0, 0.0, -2.0)),
        ]);
        Self { entries }
    }

    /// Parses a table from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] on malformed TOML, unknown rock
    /// labels or non-positive densities (Air excepted).
    pub fn from_toml_str(text: &str) -> ModelResult<Self> {
        let table: Self =
            toml::from_str(text).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Checks that every non-air material has a usable density.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] naming the offending rock type.
    pub fn validate(&self) -> ModelResult<()> {
        for (rock, def) in &self.entries {
            if *rock != RockType::Air && !(def.density.is_finite() && def.density > 0.0) {
                return Err(ModelError::InvalidConfig(format!(
                    "material {rock} has non-positive density {}",
                    def.density
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy of this table with `overrides` replacing matching entries.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (rock, def) in &overrides.entries {
            entries.insert(*rock, def.clone());
        }
        Self { entries }
    }

    /// Inserts or replaces one definition.
    pub fn insert(&mut self, rock: RockType, definition: MaterialDefinition) {
        self.entries.insert(rock, definition);
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, rock: RockType) -> Option<&MaterialDefinition> {
        self.entries.get(&rock)
    }

    /// Looks up a definition, falling back to [`MaterialDefinition::NEUTRAL`].
    #[must_use]
    pub fn definition(&self, rock: RockType) -> MaterialDefinition {
        self.entries
            .get(&rock)
            .cloned()
            .unwrap_or(MaterialDefinition::NEUTRAL)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for rock in RockType::ALL {
            assert_eq!(rock.label().parse::<RockType>().unwrap(), rock);
        }
        assert!("Granite".parse::<RockType>().is_err());
    }

    #[test]
    fn test_standard_table_covers_vocabulary() {
        let table = MaterialTable::standard();
        for rock in RockType::ALL {
            assert!(table.get(rock).is_some(), "missing {rock}");
        }
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_standard_ore_values_follow_economics() {
        // value = cu * 20 + au * 50 - 15 for every graded ore material
        let table = MaterialTable::standard();
        for rock in [RockType::OreLow, RockType::OreMed, RockType::OreHigh, RockType::Ore] {
            let def = table.definition(rock);
            let expected = def.grade_cu * 20.0 + def.grade_au * 50.0 - 15.0;
            assert!((def.econ_value - expected).abs() < 1e-9, "{rock}");
        }
    }

    #[test]
    fn test_from_toml_and_merge() {
        let text = r#"
            [Ore_High]
            density = 3.1
            grade_cu = 2.0
            grade_au = 4.0
            econ_value = 225.0

            [Salt]
            density = 2.2
            zone = "Diapir"
        "#;
        let overrides = MaterialTable::from_toml_str(text).unwrap();
        assert_eq!(overrides.len(), 2);

        let merged = MaterialTable::standard().merged(&overrides);
        assert_eq!(merged.definition(RockType::OreHigh).density, 3.1);
        assert_eq!(merged.definition(RockType::Salt).grade_cu, 0.0);
        assert_eq!(merged.definition(RockType::OreLow).density, 2.6);
    }

    #[test]
    fn test_rejects_bad_density() {
        let text = "[Waste]\ndensity = -1.0\n";
        assert!(matches!(
            MaterialTable::from_toml_str(text),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_entry_falls_back_to_neutral() {
        let table = MaterialTable::empty();
        assert_eq!(table.definition(RockType::OreMed), MaterialDefinition::NEUTRAL);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (position, rock) in RockType::ALL.into_iter().enumerate() {
            assert_eq!(rock.index(), position);
        }
    }
}
