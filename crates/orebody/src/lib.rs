//! # OREBODY
//!
//! Synthetic geological block models, from config to CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        OREBODY                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌───────────────┐   ┌────────────────────┐   ┌───────────┐  │
//! │  │ orebody_core  │──>│ orebody_procedural │──>│ orebody_  │  │
//! │  │               │   │                    │   │ export    │  │
//! │  │ • Grid        │   │ • Noise            │   │           │  │
//! │  │ • Blocks      │   │ • Patterns         │   │ • CSV     │  │
//! │  │ • Materials   │   │ • Ore bodies       │   │           │  │
//! │  │ • Seeds       │   │ • Registry         │   │           │  │
//! │  └───────────────┘   └────────────────────┘   └───────────┘  │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML run description
//! - `pipeline`: Stage orchestration and timing
//! - `summary`: Tonnage and grade statistics

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod summary;

// Re-export the units
pub use orebody_core as core;
pub use orebody_export as export;
pub use orebody_procedural as procedural;

pub use config::{ModelConfig, DEFAULT_BATCH_SIZE};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{ModelPipeline, ModelRun, Stage, StageTimings, BATCH_THRESHOLD};
pub use summary::{ModelSummary, RockSummary};
