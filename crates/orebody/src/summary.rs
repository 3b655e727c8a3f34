//! # Model Summary
//!
//! Per-rock counts, tonnage and mean grades of a finished model.

use std::collections::BTreeMap;

use orebody_core::{Block, RockType};

/// Accumulated statistics for one rock type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RockSummary {
    /// Number of blocks.
    pub blocks: usize,
    /// Sum of density × block volume.
    pub tonnage: f64,
    /// Sum of block values.
    pub econ_value: f64,
    cu_sum: f64,
    cu_count: usize,
    au_sum: f64,
    au_count: usize,
}

impl RockSummary {
    fn record(&mut self, block: &Block, block_volume: f64) {
        self.blocks += 1;
        self.tonnage += block.density.max(0.0) * block_volume;
        self.econ_value += block.econ_value.filter(|v| v.is_finite()).unwrap_or(0.0);
        if let Some(cu) = block.grade_cu.filter(|v| v.is_finite()) {
            self.cu_sum += cu;
            self.cu_count += 1;
        }
        if let Some(au) = block.grade_au.filter(|v| v.is_finite()) {
            self.au_sum += au;
            self.au_count += 1;
        }
    }

    /// Mean Cu over blocks that carry a grade.
    #[must_use]
    pub fn mean_cu(&self) -> Option<f64> {
        (self.cu_count > 0).then(|| self.cu_sum / self.cu_count as f64)
    }

    /// Mean Au over blocks that carry a grade.
    #[must_use]
    pub fn mean_au(&self) -> Option<f64> {
        (self.au_count > 0).then(|| self.au_sum / self.au_count as f64)
    }
}

/// Statistics for a whole model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelSummary {
    /// Volume of one block.
    pub block_volume: f64,
    /// Per-rock statistics, in vocabulary order.
    pub rocks: BTreeMap<RockType, RockSummary>,
}

impl ModelSummary {
    /// Summarizes `blocks` with the given block volume.
    #[must_use]
    pub fn from_blocks(blocks: &[Block], block_volume: f64) -> Self {
        let mut summary = Self {
            block_volume,
            rocks: BTreeMap::new(),
        };
        for block in blocks {
            summary.record(block);
        }
        summary
    }

    /// Adds one block.
    pub fn record(&mut self, block: &Block) {
        self.rocks
            .entry(block.rock_type)
            .or_default()
            .record(block, self.block_volume);
    }

    /// Total block count.
    #[must_use]
    pub fn total_blocks(&self) -> usize {
        self.rocks.values().map(|r| r.blocks).sum()
    }

    /// Total tonnage.
    #[must_use]
    pub fn total_tonnage(&self) -> f64 {
        self.rocks.values().map(|r| r.tonnage).sum()
    }

    /// Tonnage of the metal ore classes.
    #[must_use]
    pub fn ore_tonnage(&self) -> f64 {
        self.rocks
            .iter()
            .filter(|(rock, _)| rock.is_ore())
            .map(|(_, r)| r.tonnage)
            .sum()
    }

    /// Sum of every block's value.
    #[must_use]
    pub fn total_econ_value(&self) -> f64 {
        self.rocks.values().map(|r| r.econ_value).sum()
    }

    /// Statistics for one rock type, if present.
    #[must_use]
    pub fn rock(&self, rock: RockType) -> Option<&RockSummary> {
        self.rocks.get(&rock)
    }
}
