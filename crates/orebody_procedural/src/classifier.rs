//! # Block Classifiers
//!
//! Every pattern and ore body is prepared once per call into a
//! [`BlockClassifier`]: a value holding the parameters drawn for this model.
//! Classifying a block is then a pure function of that block, so a slice
//! can be processed whole or in chunks with identical results.

use orebody_core::{Block, MaterialDefinition, MaterialTable, ModelBounds, ModelResult, ModelSeed, RockType};
use rand_chacha::ChaCha8Rng;

use crate::noise::ValueNoise;

/// Per-block classification with parameters fixed at preparation time.
pub trait BlockClassifier {
    /// Returns the classified copy of one block.
    fn classify(&self, block: &Block) -> Block;

    /// Classifies a slice, preserving order.
    fn apply(&self, blocks: &[Block]) -> Vec<Block> {
        blocks.iter().map(|block| self.classify(block)).collect()
    }
}

impl<C: BlockClassifier + ?Sized> BlockClassifier for Box<C> {
    fn classify(&self, block: &Block) -> Block {
        (**self).classify(block)
    }
}

/// Everything a generator may read while drawing its parameters.
///
/// The RNG is consumed in a fixed order by each generator, so two contexts
/// built from the same seed and bounds yield the same model.
pub struct GenerationContext<'a> {
    /// Bounds of the whole model (not of a chunk).
    pub bounds: ModelBounds,
    /// Resolved seed for this call.
    pub seed: ModelSeed,
    /// Parameter stream.
    pub rng: ChaCha8Rng,
    /// Material table in effect.
    pub materials: &'a MaterialTable,
}

impl<'a> GenerationContext<'a> {
    /// Creates a context for a model with known bounds.
    #[must_use]
    pub fn new(bounds: ModelBounds, materials: &'a MaterialTable, seed: Option<ModelSeed>) -> Self {
        let seed = ModelSeed::for_model(seed, &bounds);
        Self {
            bounds,
            seed,
            rng: seed.rng(),
            materials,
        }
    }

    /// Creates a context from a block slice. Returns `None` for an empty slice.
    #[must_use]
    pub fn from_blocks(blocks: &[Block], materials: &'a MaterialTable, seed: Option<ModelSeed>) -> Option<Self> {
        ModelBounds::from_blocks(blocks).map(|bounds| Self::new(bounds, materials, seed))
    }

    /// Noise field on an independent sub-stream of this call's seed.
    #[must_use]
    pub fn noise(&self, purpose: u64) -> ValueNoise {
        ValueNoise::new(self.seed.derive(purpose))
    }

    /// Snapshot of the material table.
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::from_table(self.materials)
    }
}

/// Material definitions resolved for every rock type.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    definitions: Vec<MaterialDefinition>,
}

impl Palette {
    /// Resolves every rock type against `table` (absent types are neutral).
    #[must_use]
    pub fn from_table(table: &MaterialTable) -> Self {
        Self {
            definitions: RockType::ALL.iter().map(|rock| table.definition(*rock)).collect(),
        }
    }

    /// Definition for `rock`.
    #[inline]
    #[must_use]
    pub fn get(&self, rock: RockType) -> &MaterialDefinition {
        &self.definitions[rock.index()]
    }

    /// Copy of `block` carrying `rock` and its material fields.
    #[inline]
    #[must_use]
    pub fn paint(&self, block: &Block, rock: RockType) -> Block {
        block.with_material(rock, self.get(rock))
    }
}

/// Runs a classifier over a slice: validate, resolve the context, prepare, apply.
///
/// An empty slice yields an empty vector once `validate` has passed.
///
/// # Errors
///
/// Returns whatever `validate` or `prepare` return.
pub fn run_classifier<C, V, P>(
    blocks: &[Block],
    materials: &MaterialTable,
    seed: Option<ModelSeed>,
    validate: V,
    prepare: P,
) -> ModelResult<Vec<Block>>
where
    C: BlockClassifier,
    V: FnOnce() -> ModelResult<()>,
    P: FnOnce(&mut GenerationContext<'_>) -> ModelResult<C>,
{
    validate()?;
    let Some(mut ctx) = GenerationContext::from_blocks(blocks, materials, seed) else {
        return Ok(Vec::new());
    };
    let classifier = prepare(&mut ctx)?;
    Ok(classifier.apply(blocks))
}
