//! # Pipeline Errors

use orebody_core::ModelError;
use thiserror::Error;

/// Errors from loading a config or running a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid grid, generator options or config document.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Reading the config or writing the export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
