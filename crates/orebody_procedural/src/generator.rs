//! # Generator Registry
//!
//! Name-based dispatch over every pattern and ore body. A [`GeneratorKind`]
//! selects a builder from the [`GeneratorRegistry`] table; the builder draws
//! the per-call parameters and returns a boxed [`BlockClassifier`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use orebody_core::{Block, MaterialTable, ModelError, ModelResult, ModelSeed};
use serde::{Deserialize, Serialize};

use crate::chunked::ChunkedPass;
use crate::classifier::{BlockClassifier, GenerationContext};
use crate::deposit::{
    Ellipsoid, EllipsoidParams, Porphyry, PorphyryParams, ReservoirEconomics, SaltDome, SaltDomeParams, Vein,
    VeinParams,
};
use crate::grade::{EconomicModel, GradeThresholds};
use crate::pattern::{
    Checkerboard, Gradient, InclinedVein, InclinedVeinParams, Layered, LayeredParams, OreHorizon, OreHorizonParams,
    RandomClusters, RandomParams, RandomTiers, Uniform, UniformParams,
};

/// Every generator the engine knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// One rock type everywhere.
    Uniform,
    /// Tilted depth layers.
    Layered,
    /// Radial grade gradient.
    Gradient,
    /// Parity checkerboard.
    Checkerboard,
    /// Random tiers.
    Random,
    /// Ore band at mid depth.
    OreHorizon,
    /// One dipping vein.
    InclinedVein,
    /// Noise clusters.
    RandomClusters,
    /// Plunging ellipsoid.
    Ellipsoid,
    /// Vein set.
    Vein,
    /// Porphyry zoning.
    Porphyry,
    /// Salt-dome reservoir analogue.
    SaltDome,
}

impl GeneratorKind {
    /// Every kind, patterns first.
    pub const ALL: [Self; 12] = [
        Self::Uniform,
        Self::Layered,
        Self::Gradient,
        Self::Checkerboard,
        Self::Random,
        Self::OreHorizon,
        Self::InclinedVein,
        Self::RandomClusters,
        Self::Ellipsoid,
        Self::Vein,
        Self::Porphyry,
        Self::SaltDome,
    ];

    /// Snake-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Layered => "layered",
            Self::Gradient => "gradient",
            Self::Checkerboard => "checkerboard",
            Self::Random => "random",
            Self::OreHorizon => "ore_horizon",
            Self::InclinedVein => "inclined_vein",
            Self::RandomClusters => "random_clusters",
            Self::Ellipsoid => "ellipsoid",
            Self::Vein => "vein",
            Self::Porphyry => "porphyry",
            Self::SaltDome => "salt_dome",
        }
    }

    /// Returns true for the continuous ore-body generators.
    #[must_use]
    pub const fn is_deposit(self) -> bool {
        matches!(self, Self::Ellipsoid | Self::Vein | Self::Porphyry | Self::SaltDome)
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ModelError::UnknownGenerator(s.to_string()))
    }
}

/// Per-generator parameters plus shared grade and economic settings.
///
/// Each generator reads only its own table, so one options value can drive
/// any kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Uniform pattern.
    pub uniform: UniformParams,
    /// Layered pattern.
    pub layered: LayeredParams,
    /// Random pattern.
    pub random: RandomParams,
    /// Ore horizon.
    pub ore_horizon: OreHorizonParams,
    /// Inclined vein.
    pub inclined_vein: InclinedVeinParams,
    /// Ellipsoid body.
    pub ellipsoid: EllipsoidParams,
    /// Vein set.
    pub vein: VeinParams,
    /// Porphyry system.
    pub porphyry: PorphyryParams,
    /// Salt dome.
    pub salt_dome: SaltDomeParams,
    /// Grade cut-offs for the metal ore bodies.
    pub thresholds: GradeThresholds,
    /// Prices and costs for the metal generators.
    pub economics: EconomicModel,
    /// Prices and yields for the salt dome.
    pub reservoir: ReservoirEconomics,
}

impl GeneratorOptions {
    /// Validates the parameters `kind` reads.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for the first invalid value.
    pub fn validate(&self, kind: GeneratorKind) -> ModelResult<()> {
        match kind {
            GeneratorKind::Uniform | GeneratorKind::Gradient | GeneratorKind::Checkerboard => Ok(()),
            GeneratorKind::RandomClusters => Ok(()),
            GeneratorKind::Layered => self.layered.validate(),
            GeneratorKind::Random => self.random.validate(),
            GeneratorKind::OreHorizon => self.ore_horizon.validate(),
            GeneratorKind::InclinedVein => self.inclined_vein.validate(),
            GeneratorKind::Ellipsoid => self.thresholds.validate().and(self.ellipsoid.validate()),
            GeneratorKind::Vein => self.thresholds.validate().and(self.vein.validate()),
            GeneratorKind::Porphyry => self.thresholds.validate().and(self.porphyry.validate()),
            GeneratorKind::SaltDome => self.salt_dome.validate(),
        }
    }
}

/// Builds the classifier for one call.
pub type ClassifierBuilder =
    fn(&mut GenerationContext<'_>, &GeneratorOptions) -> ModelResult<Box<dyn BlockClassifier>>;

/// Table from generator kind to builder.
#[derive(Clone)]
pub struct GeneratorRegistry {
    builders: HashMap<GeneratorKind, ClassifierBuilder>,
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.builders.keys().collect();
        kinds.sort();
        f.debug_struct("GeneratorRegistry").field("kinds", &kinds).finish()
    }
}

fn boxed<C: BlockClassifier + 'static>(classifier: C) -> ModelResult<Box<dyn BlockClassifier>> {
    Ok(Box::new(classifier))
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registry with every built-in generator.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(GeneratorKind::Uniform, |ctx, o| boxed(Uniform::new(&o.uniform, ctx.materials)));
        registry.register(GeneratorKind::Layered, |ctx, o| boxed(Layered::prepare(ctx, &o.layered)?));
        registry.register(GeneratorKind::Gradient, |ctx, _| boxed(Gradient::prepare(ctx)));
        registry.register(GeneratorKind::Checkerboard, |ctx, _| boxed(Checkerboard::new(ctx.materials)));
        registry.register(GeneratorKind::Random, |ctx, o| boxed(RandomTiers::prepare(ctx, &o.random)?));
        registry.register(GeneratorKind::OreHorizon, |ctx, o| boxed(OreHorizon::prepare(ctx, &o.ore_horizon)?));
        registry.register(GeneratorKind::InclinedVein, |ctx, o| {
            boxed(InclinedVein::prepare(ctx, &o.inclined_vein, o.economics)?)
        });
        registry.register(GeneratorKind::RandomClusters, |ctx, o| boxed(RandomClusters::prepare(ctx, o.economics)));
        registry.register(GeneratorKind::Ellipsoid, |ctx, o| {
            boxed(Ellipsoid::prepare(ctx, &o.ellipsoid, o.thresholds, o.economics)?)
        });
        registry.register(GeneratorKind::Vein, |ctx, o| {
            boxed(Vein::prepare(ctx, &o.vein, o.thresholds, o.economics)?)
        });
        registry.register(GeneratorKind::Porphyry, |ctx, o| {
            boxed(Porphyry::prepare(ctx, &o.porphyry, o.thresholds, o.economics)?)
        });
        registry.register(GeneratorKind::SaltDome, |ctx, o| {
            boxed(SaltDome::prepare(ctx, &o.salt_dome, o.reservoir)?)
        });
        registry
    }

    /// Adds or replaces the builder for `kind`.
    pub fn register(&mut self, kind: GeneratorKind, builder: ClassifierBuilder) {
        self.builders.insert(kind, builder);
    }

    /// Returns true if `kind` has a builder.
    #[must_use]
    pub fn contains(&self, kind: GeneratorKind) -> bool {
        self.builders.contains_key(&kind)
    }

    /// Prepares the classifier for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownGenerator`] if `kind` is not registered,
    /// or the builder's own error.
    pub fn prepare(
        &self,
        kind: GeneratorKind,
        ctx: &mut GenerationContext<'_>,
        options: &GeneratorOptions,
    ) -> ModelResult<Box<dyn BlockClassifier>> {
        let builder = self
            .builders
            .get(&kind)
            .ok_or_else(|| ModelError::UnknownGenerator(kind.name().to_string()))?;
        builder(ctx, options)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Runs generators by kind against one material table and options set.
///
/// # Example
///
/// ```rust,ignore
/// let generator = ModelGenerator::new(MaterialTable::standard(), GeneratorOptions::default());
/// let blocks = build_grid(&params)?;
/// let model = generator.apply(GeneratorKind::Porphyry, &blocks, Some(ModelSeed::new(7)))?;
/// ```
#[derive(Clone, Debug)]
pub struct ModelGenerator {
    materials: MaterialTable,
    options: GeneratorOptions,
    registry: GeneratorRegistry,
}

impl ModelGenerator {
    /// Creates a generator with the standard registry.
    #[must_use]
    pub fn new(materials: MaterialTable, options: GeneratorOptions) -> Self {
        Self::with_registry(materials, options, GeneratorRegistry::standard())
    }

    /// Creates a generator with a custom registry.
    #[must_use]
    pub const fn with_registry(materials: MaterialTable, options: GeneratorOptions, registry: GeneratorRegistry) -> Self {
        Self {
            materials,
            options,
            registry,
        }
    }

    /// Material table in use.
    #[must_use]
    pub const fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Options in use.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn classifier(
        &self,
        kind: GeneratorKind,
        blocks: &[Block],
        seed: Option<ModelSeed>,
    ) -> ModelResult<Option<Box<dyn BlockClassifier>>> {
        self.options.validate(kind)?;
        if !self.registry.contains(kind) {
            return Err(ModelError::UnknownGenerator(kind.name().to_string()));
        }
        let Some(mut ctx) = GenerationContext::from_blocks(blocks, &self.materials, seed) else {
            return Ok(None);
        };
        tracing::debug!(%kind, blocks = blocks.len(), seed = ctx.seed.value(), "preparing generator");
        self.registry.prepare(kind, &mut ctx, &self.options).map(Some)
    }

    /// Runs `kind` over the whole slice.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for invalid options or
    /// [`ModelError::UnknownGenerator`] for an unregistered kind. An empty
    /// slice is not an error.
    pub fn apply(&self, kind: GeneratorKind, blocks: &[Block], seed: Option<ModelSeed>) -> ModelResult<Vec<Block>> {
        Ok(self
            .classifier(kind, blocks, seed)?
            .map(|classifier| classifier.apply(blocks))
            .unwrap_or_default())
    }

    /// Runs `kind` over the slice in batches of at most `chunk_size`.
    ///
    /// Parameters are drawn once from the whole slice, so the concatenated
    /// batches equal [`ModelGenerator::apply`] with the same seed.
    ///
    /// # Errors
    ///
    /// As [`ModelGenerator::apply`], plus [`ModelError::InvalidParameter`]
    /// for a zero `chunk_size`.
    pub fn apply_chunked<'b>(
        &self,
        kind: GeneratorKind,
        blocks: &'b [Block],
        seed: Option<ModelSeed>,
        chunk_size: usize,
    ) -> ModelResult<ChunkedPass<'b>> {
        let classifier: Box<dyn BlockClassifier> = match self.classifier(kind, blocks, seed)? {
            Some(classifier) => classifier,
            None => Box::new(Passthrough),
        };
        ChunkedPass::new(classifier, blocks, chunk_size)
    }
}

/// Stand-in for an empty slice, which has no bounds to prepare against.
struct Passthrough;

impl BlockClassifier for Passthrough {
    fn classify(&self, block: &Block) -> Block {
        block.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orebody_core::{build_grid, collect_batches, GridParams, RockType, Vec3};

    #[test]
    fn test_names_round_trip() {
        for kind in GeneratorKind::ALL {
            assert_eq!(kind.name().parse::<GeneratorKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!(matches!(
            "kriging".parse::<GeneratorKind>(),
            Err(ModelError::UnknownGenerator(name)) if name == "kriging"
        ));
    }

    #[test]
    fn test_standard_registry_is_complete() {
        let registry = GeneratorRegistry::standard();
        assert!(GeneratorKind::ALL.iter().all(|kind| registry.contains(*kind)));
    }

    #[test]
    fn test_unregistered_kind_is_reported() {
        let generator = ModelGenerator::with_registry(
            MaterialTable::standard(),
            GeneratorOptions::default(),
            GeneratorRegistry::empty(),
        );
        let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::ONE, [2, 2, 2])).unwrap();
        assert!(matches!(
            generator.apply(GeneratorKind::Porphyry, &blocks, None),
            Err(ModelError::UnknownGenerator(_))
        ));
    }

    #[test]
    fn test_apply_dispatches_uniform() {
        let generator = ModelGenerator::new(MaterialTable::standard(), GeneratorOptions::default());
        let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::ONE, [3, 3, 3])).unwrap();
        let out = generator.apply(GeneratorKind::Uniform, &blocks, None).unwrap();
        assert!(out.iter().all(|b| b.rock_type == RockType::OreMed));
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let generator = ModelGenerator::new(MaterialTable::standard(), GeneratorOptions::default());
        for kind in GeneratorKind::ALL {
            assert!(generator.apply(kind, &[], None).unwrap().is_empty());
            assert_eq!(generator.apply_chunked(kind, &[], None, 10).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_invalid_options_fail_before_output() {
        let options = GeneratorOptions {
            ore_horizon: OreHorizonParams {
                thickness: -1.0,
                ..OreHorizonParams::default()
            },
            ..GeneratorOptions::default()
        };
        let generator = ModelGenerator::new(MaterialTable::standard(), options);
        assert!(generator.apply(GeneratorKind::OreHorizon, &[], None).is_err());
        // Other kinds ignore the ore-horizon table
        assert!(generator.apply(GeneratorKind::Checkerboard, &[], None).is_ok());
    }

    #[test]
    fn test_chunked_matches_whole_for_porphyry() {
        let generator = ModelGenerator::new(MaterialTable::standard(), GeneratorOptions::default());
        let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(10.0), [12, 12, 6])).unwrap();
        let seed = Some(ModelSeed::new(99));

        let whole = generator.apply(GeneratorKind::Porphyry, &blocks, seed).unwrap();
        let pass = generator.apply_chunked(GeneratorKind::Porphyry, &blocks, seed, 100).unwrap();
        assert_eq!(collect_batches(pass, |_| {}), whole);
    }

    #[test]
    fn test_options_from_toml() {
        let options: GeneratorOptions = toml::from_str(
            r#"
            [uniform]
            rock_type = "Ore_High"

            [porphyry]
            core_radius = 30.0
            irregularity = 0.0

            [economics]
            processing_cost = 20.0
            "#,
        )
        .unwrap();

        assert_eq!(options.uniform.rock_type, RockType::OreHigh);
        assert_eq!(options.porphyry.core_radius, Some(30.0));
        assert_eq!(options.porphyry.vertical_scale, 1.5);
        assert_eq!(options.economics.processing_cost, 20.0);
        assert_eq!(options.economics.cu_price, 20.0);
    }
}
