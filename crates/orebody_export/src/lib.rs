//! # OREBODY Export
//!
//! Serializes block models to comma-delimited text.
//!
//! Column order is fixed:
//!
//! ```text
//! X,Y,Z,[I,J,K],[DX,DY,DZ],ROCKTYPE,DENSITY,[ZONE],[GRADE_CU],[GRADE_AU],[ECON_VALUE]
//! ```
//!
//! Optional columns appear only when enabled in [`ExportOptions`] and, for
//! zone, grades and value, when at least one exported block carries the
//! field.
//!
//! ## Example
//!
//! ```rust,ignore
//! use orebody_export::{CsvExporter, ExportOptions};
//!
//! let exporter = CsvExporter::new(&model, &ExportOptions::default());
//! for chunk in exporter.chunks(10_000) {
//!     sink.push_str(&chunk);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod csv;

pub use csv::{format_blocks, write_csv_file, Column, CsvChunks, CsvExporter, ExportOptions};
