//! # Model Pipeline
//!
//! Grid → generator → summary, with CSV export on request.
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌───────────┐    ┌──────────┐
//! │  Grid    │───>│  Generator   │───>│  Summary  │    │  Export  │
//! │ (batched │    │  (chunked    │    │           │    │ (chunked │
//! │  if big) │    │   if big)    │    │           │    │  rows)   │
//! └──────────┘    └──────┬───────┘    └───────────┘    └────▲─────┘
//!                        └──────────────────────────────────┘
//! ```
//!
//! Above [`BATCH_THRESHOLD`] blocks the grid and generator stages run in
//! batches of `batch_size` and report [`Progress`] after each one. Both paths
//! produce the same model.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use orebody_core::{build_grid, collect_batches, Block, ModelSeed, Progress};
use orebody_export::CsvExporter;
use orebody_procedural::ModelGenerator;

use crate::config::ModelConfig;
use crate::error::PipelineResult;
use crate::summary::ModelSummary;

/// Block count above which the batched paths are used.
pub const BATCH_THRESHOLD: usize = 500_000;

/// A pipeline stage, as reported with progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Building the block lattice.
    Grid,
    /// Running the generator.
    Generate,
    /// Writing CSV rows.
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grid => "grid",
            Self::Generate => "generate",
            Self::Export => "export",
        })
    }
}

/// Wall-clock time per stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTimings {
    /// Grid building.
    pub grid: Duration,
    /// Generator pass.
    pub generate: Duration,
    /// Summary accumulation.
    pub summary: Duration,
}

impl StageTimings {
    /// Sum of all stages.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.grid + self.generate + self.summary
    }
}

/// Output of one run.
#[derive(Clone, Debug)]
pub struct ModelRun {
    /// Seed the generator ran with. Feeding it back reproduces the model.
    pub seed: ModelSeed,
    /// Whether the batched paths were used.
    pub batched: bool,
    /// The classified model.
    pub blocks: Vec<Block>,
    /// Statistics over `blocks`.
    pub summary: ModelSummary,
    /// Stage timings.
    pub timings: StageTimings,
}

/// Runs a [`ModelConfig`] end to end.
#[derive(Clone, Debug)]
pub struct ModelPipeline {
    config: ModelConfig,
    generator: ModelGenerator,
    batch_threshold: usize,
}

impl ModelPipeline {
    /// Creates a pipeline for a validated config.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure of `config`.
    pub fn new(config: ModelConfig) -> PipelineResult<Self> {
        config.validate()?;
        let generator = ModelGenerator::new(config.material_table(), config.options.clone());
        Ok(Self {
            config,
            generator,
            batch_threshold: BATCH_THRESHOLD,
        })
    }

    /// Overrides the block count above which batching starts.
    #[must_use]
    pub const fn with_batch_threshold(mut self, threshold: usize) -> Self {
        self.batch_threshold = threshold;
        self
    }

    /// The config being run.
    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Runs grid, generator and summary without progress reporting.
    ///
    /// # Errors
    ///
    /// See [`ModelPipeline::run_with_progress`].
    pub fn run(&self) -> PipelineResult<ModelRun> {
        self.run_with_progress(|_, _| {})
    }

    /// Runs grid, generator and summary, reporting batch progress.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PipelineError::Model`] if the grid or the generator
    /// rejects its parameters.
    pub fn run_with_progress(&self, mut on_progress: impl FnMut(Stage, Progress)) -> PipelineResult<ModelRun> {
        let grid = &self.config.grid;
        let kind = self.config.generator;
        let batch_size = self.config.batch_size;
        let seed = self.config.resolve_seed();
        let batched = grid.block_count() > self.batch_threshold;

        tracing::info!(
            generator = %kind,
            blocks = grid.block_count(),
            seed = seed.value(),
            batched,
            "model run started"
        );

        let start = Instant::now();
        let blocks = if batched {
            collect_batches(grid.batches(batch_size)?, |p| on_progress(Stage::Grid, p))
        } else {
            build_grid(grid)?
        };
        let grid_time = start.elapsed();
        tracing::info!(blocks = blocks.len(), elapsed_ms = grid_time.as_millis(), "grid built");

        let start = Instant::now();
        let model = if batched {
            let pass = self.generator.apply_chunked(kind, &blocks, Some(seed), batch_size)?;
            collect_batches(pass, |p| on_progress(Stage::Generate, p))
        } else {
            self.generator.apply(kind, &blocks, Some(seed))?
        };
        let generate_time = start.elapsed();
        tracing::info!(generator = %kind, elapsed_ms = generate_time.as_millis(), "generator finished");
        drop(blocks);

        let start = Instant::now();
        let summary = ModelSummary::from_blocks(&model, grid.block_volume());
        let summary_time = start.elapsed();
        tracing::info!(
            ore_tonnage = summary.ore_tonnage(),
            econ_value = summary.total_econ_value(),
            "summary computed"
        );

        Ok(ModelRun {
            seed,
            batched,
            blocks: model,
            summary,
            timings: StageTimings {
                grid: grid_time,
                generate: generate_time,
                summary: summary_time,
            },
        })
    }

    /// Writes `blocks` as CSV with the configured export options, reporting
    /// row progress after each chunk. Returns the number of data rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PipelineError::Io`] if writing fails.
    pub fn export<W: Write>(
        &self,
        blocks: &[Block],
        mut writer: W,
        mut on_progress: impl FnMut(Stage, Progress),
    ) -> PipelineResult<usize> {
        let exporter = CsvExporter::new(blocks, &self.config.export);
        let total = exporter.row_count();
        let rows_per_chunk = self.config.batch_size;

        let mut processed = 0;
        for chunk in exporter.chunks(rows_per_chunk) {
            writer.write_all(chunk.as_bytes())?;
            processed = (processed + rows_per_chunk).min(total);
            on_progress(Stage::Export, Progress { processed, total });
        }
        writer.flush()?;
        tracing::info!(rows = total, "export finished");
        Ok(total)
    }

    /// Writes `blocks` to a CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PipelineError::Io`] if the file cannot be created or
    /// written.
    pub fn export_to_file(&self, blocks: &[Block], path: impl AsRef<Path>) -> PipelineResult<usize> {
        let file = std::fs::File::create(path.as_ref())?;
        self.export(blocks, std::io::BufWriter::new(file), |_, _| {})
    }
}
