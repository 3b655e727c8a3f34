//! # Model Configuration
//!
//! One TOML document describes a whole run:
//!
//! ```toml
//! generator = "porphyry"
//! seed = 42
//! batch_size = 50000
//!
//! [grid]
//! x0 = 0.0
//! y0 = 0.0
//! z0 = 0.0
//! dx = 30.0
//! dy = 30.0
//! dz = 30.0
//! nx = 20
//! ny = 20
//! nz = 10
//!
//! [options.porphyry]
//! core_cu = 1.2
//!
//! [export]
//! include_zone = true
//!
//! [materials.Ore_High]
//! density = 2.9
//! grade_cu = 1.5
//! grade_au = 3.2
//! econ_value = 175.0
//! ```

use std::path::Path;

use orebody_core::{GridParams, MaterialTable, ModelError, ModelResult, ModelSeed};
use orebody_export::ExportOptions;
use orebody_procedural::{GeneratorKind, GeneratorOptions};
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

/// Default generator batch size.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Full description of one model run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Block lattice.
    pub grid: GridParams,
    /// Generator to run.
    pub generator: GeneratorKind,
    /// Explicit seed. Unset draws a fresh one per run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Blocks per batch on the batched path.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Per-generator parameters.
    #[serde(default)]
    pub options: GeneratorOptions,
    /// CSV export options.
    #[serde(default)]
    pub export: ExportOptions,
    /// Entries replacing the standard material table.
    #[serde(default)]
    pub materials: Option<MaterialTable>,
}

impl ModelConfig {
    /// Config for `generator` on `grid` with every other setting at its default.
    #[must_use]
    pub fn new(grid: GridParams, generator: GeneratorKind) -> Self {
        Self {
            grid,
            generator,
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
            options: GeneratorOptions::default(),
            export: ExportOptions::default(),
            materials: None,
        }
    }

    /// Parses and validates a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] on malformed TOML or unknown
    /// generator and rock names, and [`ModelError::InvalidParameter`] for
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> ModelResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// As [`ModelConfig::from_toml_str`], plus any error reading the file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), generator = %config.generator, "config loaded");
        Ok(config)
    }

    /// Checks the grid, the options the generator reads, the batch size and
    /// the material overrides.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ModelResult<()> {
        self.grid.validate()?;
        self.options.validate(self.generator)?;
        if self.batch_size == 0 {
            return Err(ModelError::invalid("batch_size", "must be > 0"));
        }
        if let Some(materials) = &self.materials {
            materials.validate()?;
        }
        Ok(())
    }

    /// Standard material table with the configured overrides applied.
    #[must_use]
    pub fn material_table(&self) -> MaterialTable {
        let standard = MaterialTable::standard();
        match &self.materials {
            Some(overrides) => standard.merged(overrides),
            None => standard,
        }
    }

    /// Seed for the run: the configured one or a fresh draw.
    #[must_use]
    pub fn resolve_seed(&self) -> ModelSeed {
        self.seed.map_or_else(ModelSeed::fresh, ModelSeed::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orebody_core::RockType;

    const MINIMAL: &str = r#"
generator = "ellipsoid"

[grid]
x0 = 0.0
y0 = 0.0
z0 = 0.0
dx = 30.0
dy = 30.0
dz = 30.0
nx = 20
ny = 20
nz = 10
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = ModelConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.generator, GeneratorKind::Ellipsoid);
        assert_eq!(config.seed, None);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.grid.block_count(), 4000);
        assert_eq!(config.export, ExportOptions::default());
        assert_eq!(config.material_table(), MaterialTable::standard());
    }

    #[test]
    fn test_material_overrides_merge() {
        let text = format!("{MINIMAL}\n[materials.Ore_High]\ndensity = 2.95\ngrade_cu = 1.5\ngrade_au = 3.2\necon_value = 175.0\n");
        let config = ModelConfig::from_toml_str(&text).unwrap();
        let table = config.material_table();
        assert!((table.definition(RockType::OreHigh).density - 2.95).abs() < 1e-12);
        assert!((table.definition(RockType::OreMed).density - 2.7).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_generator_rejected() {
        let text = MINIMAL.replace("ellipsoid", "kimberlite");
        assert!(matches!(ModelConfig::from_toml_str(&text), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let text = MINIMAL.replace("nx = 20", "nx = 0");
        assert!(matches!(
            ModelConfig::from_toml_str(&text),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let text = format!("batch_size = 0\n{MINIMAL}");
        assert!(ModelConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_explicit_seed_resolves_to_itself() {
        let text = format!("seed = 42\n{MINIMAL}");
        let config = ModelConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.resolve_seed(), ModelSeed::new(42));
    }
}
