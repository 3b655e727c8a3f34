//! # Grade Classification and Economics
//!
//! Shared tail of every ore-body generator: continuous Cu/Au grades become a
//! rock tier, a density and a block value.

use orebody_core::{Block, ModelError, ModelResult, RockType};
use serde::{Deserialize, Serialize};

use crate::classifier::Palette;

/// Cu (%) and Au (g/t) cut-offs for the three ore tiers.
///
/// A block reaches a tier if either metal meets that tier's cut-off.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    /// Cu cut-off for `Ore_High`.
    pub high_cu: f64,
    /// Au cut-off for `Ore_High`.
    pub high_au: f64,
    /// Cu cut-off for `Ore_Med`.
    pub med_cu: f64,
    /// Au cut-off for `Ore_Med`.
    pub med_au: f64,
    /// Cu cut-off for `Ore_Low`.
    pub low_cu: f64,
    /// Au cut-off for `Ore_Low`.
    pub low_au: f64,
    /// Factor applied to the grades of blocks below every cut-off.
    pub waste_attenuation: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            high_cu: 1.0,
            high_au: 2.5,
            med_cu: 0.5,
            med_au: 1.0,
            low_cu: 0.3,
            low_au: 0.5,
            waste_attenuation: 0.1,
        }
    }
}

impl GradeThresholds {
    /// Tier for a pair of grades.
    #[must_use]
    pub fn classify(&self, cu: f64, au: f64) -> RockType {
        if cu >= self.high_cu || au >= self.high_au {
            RockType::OreHigh
        } else if cu >= self.med_cu || au >= self.med_au {
            RockType::OreMed
        } else if cu >= self.low_cu || au >= self.low_au {
            RockType::OreLow
        } else {
            RockType::Waste
        }
    }

    /// Checks that the cut-offs are ordered low <= med <= high.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for unordered, negative or
    /// non-finite cut-offs.
    pub fn validate(&self) -> ModelResult<()> {
        let values = [
            self.low_cu,
            self.med_cu,
            self.high_cu,
            self.low_au,
            self.med_au,
            self.high_au,
            self.waste_attenuation,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ModelError::invalid("thresholds", "cut-offs must be finite and non-negative"));
        }
        if self.low_cu > self.med_cu || self.med_cu > self.high_cu || self.low_au > self.med_au || self.med_au > self.high_au {
            return Err(ModelError::invalid("thresholds", "cut-offs must satisfy low <= med <= high"));
        }
        Ok(())
    }
}

/// Metal prices and costs, in value units per block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicModel {
    /// Value per % Cu.
    pub cu_price: f64,
    /// Value per g/t Au.
    pub au_price: f64,
    /// Processing cost charged to ore.
    pub processing_cost: f64,
    /// Mining cost charged to waste (value is its negation).
    pub waste_cost: f64,
}

impl Default for EconomicModel {
    fn default() -> Self {
        Self {
            cu_price: 20.0,
            au_price: 50.0,
            processing_cost: 15.0,
            waste_cost: 5.0,
        }
    }
}

impl EconomicModel {
    /// Value of ore at the given grades.
    #[inline]
    #[must_use]
    pub fn ore_value(&self, cu: f64, au: f64) -> f64 {
        cu * self.cu_price + au * self.au_price - self.processing_cost
    }

    /// Value of a classified block.
    #[inline]
    #[must_use]
    pub fn value(&self, rock: RockType, cu: f64, au: f64) -> f64 {
        if rock.is_ore() {
            self.ore_value(cu, au)
        } else {
            -self.waste_cost
        }
    }
}

/// Grade-to-block finisher used by the ore-body generators.
#[derive(Clone, Debug)]
pub struct OreGrader {
    thresholds: GradeThresholds,
    economics: EconomicModel,
    palette: Palette,
}

impl OreGrader {
    /// Creates a grader.
    #[must_use]
    pub const fn new(thresholds: GradeThresholds, economics: EconomicModel, palette: Palette) -> Self {
        Self {
            thresholds,
            economics,
            palette,
        }
    }

    /// Builds the graded copy of `block`.
    ///
    /// Grades are clamped at zero. Blocks below every cut-off become waste
    /// with their grades attenuated. Density comes from the palette.
    #[must_use]
    pub fn finish(&self, block: &Block, cu: f64, au: f64, zone: Option<&str>) -> Block {
        let (mut cu, mut au) = (cu.max(0.0), au.max(0.0));
        let rock = self.thresholds.classify(cu, au);
        if rock == RockType::Waste {
            cu *= self.thresholds.waste_attenuation;
            au *= self.thresholds.waste_attenuation;
        }

        Block {
            rock_type: rock,
            density: self.palette.get(rock).density,
            zone: zone.map(str::to_string),
            grade_cu: Some(cu),
            grade_au: Some(au),
            econ_value: Some(self.economics.value(rock, cu, au)),
            ..block.clone()
        }
    }

    /// The economic model in use.
    #[must_use]
    pub const fn economics(&self) -> &EconomicModel {
        &self.economics
    }
}
