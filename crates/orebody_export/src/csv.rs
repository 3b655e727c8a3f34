//! # CSV Formatter
//!
//! Header plus one row per exported block. Every row, the last included,
//! ends with `'\n'`. Every number, lattice indices included, uses 4 decimals.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use orebody_core::Block;
use serde::{Deserialize, Serialize};

/// Value written for a missing or non-finite number.
const MISSING: &str = "0.0000";

/// Which optional columns to emit and which blocks to skip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Emit `I,J,K`.
    pub include_indices: bool,
    /// Emit `ZONE` if any exported block has a zone.
    pub include_zone: bool,
    /// Emit `GRADE_CU` / `GRADE_AU` if any exported block has the grade.
    pub include_grades: bool,
    /// Emit `ECON_VALUE` if any exported block has a value.
    pub include_econ_value: bool,
    /// Drop blocks with density ≤ 0.
    pub filter_air_blocks: bool,
    /// Constant `DX,DY,DZ` columns.
    pub cell_size: Option<[f64; 3]>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_indices: true,
            include_zone: true,
            include_grades: true,
            include_econ_value: true,
            filter_air_blocks: true,
            cell_size: None,
        }
    }
}

/// One output column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    /// Centroid easting.
    X,
    /// Centroid northing.
    Y,
    /// Centroid elevation.
    Z,
    /// Lattice index along X.
    I,
    /// Lattice index along Y.
    J,
    /// Lattice index along Z.
    K,
    /// Constant cell size along X.
    Dx,
    /// Constant cell size along Y.
    Dy,
    /// Constant cell size along Z.
    Dz,
    /// Rock label.
    RockType,
    /// Density.
    Density,
    /// Zone label.
    Zone,
    /// Copper grade.
    GradeCu,
    /// Gold grade.
    GradeAu,
    /// Economic value.
    EconValue,
}

impl Column {
    /// Header text.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::I => "I",
            Self::J => "J",
            Self::K => "K",
            Self::Dx => "DX",
            Self::Dy => "DY",
            Self::Dz => "DZ",
            Self::RockType => "ROCKTYPE",
            Self::Density => "DENSITY",
            Self::Zone => "ZONE",
            Self::GradeCu => "GRADE_CU",
            Self::GradeAu => "GRADE_AU",
            Self::EconValue => "ECON_VALUE",
        }
    }
}

/// Formats a block slice, one bounded chunk at a time.
#[derive(Clone, Debug)]
pub struct CsvExporter<'a> {
    blocks: &'a [Block],
    filter_air: bool,
    cell_size: [f64; 3],
    columns: Vec<Column>,
    rows: usize,
}

impl<'a> CsvExporter<'a> {
    /// Resolves the column layout for `blocks` under `options`.
    #[must_use]
    pub fn new(blocks: &'a [Block], options: &ExportOptions) -> Self {
        let filter_air = options.filter_air_blocks;
        let kept = || blocks.iter().filter(move |b| !filter_air || b.density > 0.0);

        let mut columns = vec![Column::X, Column::Y, Column::Z];
        if options.include_indices {
            columns.extend([Column::I, Column::J, Column::K]);
        }
        if options.cell_size.is_some() {
            columns.extend([Column::Dx, Column::Dy, Column::Dz]);
        }
        columns.extend([Column::RockType, Column::Density]);
        if options.include_zone && kept().any(|b| b.zone.is_some()) {
            columns.push(Column::Zone);
        }
        if options.include_grades && kept().any(|b| b.grade_cu.is_some()) {
            columns.push(Column::GradeCu);
        }
        if options.include_grades && kept().any(|b| b.grade_au.is_some()) {
            columns.push(Column::GradeAu);
        }
        if options.include_econ_value && kept().any(|b| b.econ_value.is_some()) {
            columns.push(Column::EconValue);
        }

        let rows = kept().count();
        tracing::debug!(blocks = blocks.len(), rows, columns = columns.len(), "export layout resolved");

        Self {
            blocks,
            filter_air,
            cell_size: options.cell_size.unwrap_or([0.0; 3]),
            columns,
            rows,
        }
    }

    /// Columns in output order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of data rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows
    }

    /// Header line, terminated.
    #[must_use]
    pub fn header(&self) -> String {
        let mut line = self.columns.iter().map(|c| c.header()).collect::<Vec<_>>().join(",");
        line.push('\n');
        line
    }

    fn keeps(&self, block: &Block) -> bool {
        !self.filter_air || block.density > 0.0
    }

    fn push_row(&self, out: &mut String, block: &Block) {
        for (n, column) in self.columns.iter().enumerate() {
            if n > 0 {
                out.push(',');
            }
            match column {
                Column::X => push_number(out, Some(block.x)),
                Column::Y => push_number(out, Some(block.y)),
                Column::Z => push_number(out, Some(block.z)),
                Column::I => push_number(out, Some(f64::from(block.i))),
                Column::J => push_number(out, Some(f64::from(block.j))),
                Column::K => push_number(out, Some(f64::from(block.k))),
                Column::Dx => push_number(out, Some(self.cell_size[0])),
                Column::Dy => push_number(out, Some(self.cell_size[1])),
                Column::Dz => push_number(out, Some(self.cell_size[2])),
                Column::RockType => push_text(out, block.rock_type.label()),
                Column::Density => push_number(out, Some(block.density)),
                Column::Zone => push_text(out, block.zone.as_deref().unwrap_or("")),
                Column::GradeCu => push_number(out, block.grade_cu),
                Column::GradeAu => push_number(out, block.grade_au),
                Column::EconValue => push_number(out, block.econ_value),
            }
        }
        out.push('\n');
    }

    /// Output in chunks of at most `rows_per_chunk` rows (minimum 1). The
    /// first chunk starts with the header. Yields nothing when no block
    /// survives filtering.
    #[must_use]
    pub fn chunks(&self, rows_per_chunk: usize) -> CsvChunks<'_, 'a> {
        CsvChunks {
            exporter: self,
            rows: self.blocks.iter(),
            rows_per_chunk: rows_per_chunk.max(1),
            header_pending: true,
        }
    }

    /// Streams the whole export to `writer`, returning the number of data
    /// rows written.
    ///
    /// # Errors
    ///
    /// Propagates any error from `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W, rows_per_chunk: usize) -> io::Result<usize> {
        for chunk in self.chunks(rows_per_chunk) {
            writer.write_all(chunk.as_bytes())?;
        }
        writer.flush()?;
        Ok(self.rows)
    }
}

/// Iterator over export chunks. See [`CsvExporter::chunks`].
pub struct CsvChunks<'e, 'a> {
    exporter: &'e CsvExporter<'a>,
    rows: std::slice::Iter<'a, Block>,
    rows_per_chunk: usize,
    header_pending: bool,
}

impl Iterator for CsvChunks<'_, '_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exporter.rows == 0 {
            return None;
        }
        let mut out = String::new();
        if self.header_pending {
            self.header_pending = false;
            out.push_str(&self.exporter.header());
        }
        let exporter = self.exporter;
        let mut written = 0;
        for block in self.rows.by_ref().filter(|b| exporter.keeps(b)).take(self.rows_per_chunk) {
            exporter.push_row(&mut out, block);
            written += 1;
        }
        (written > 0).then_some(out)
    }
}

fn push_number(out: &mut String, value: Option<f64>) {
    match value {
        Some(v) if v.is_finite() => write!(out, "{v:.4}").expect("writing to String cannot fail"),
        _ => out.push_str(MISSING),
    }
}

fn push_text(out: &mut String, text: &str) {
    if text.contains([',', '"', '\n']) {
        out.push('"');
        out.push_str(&text.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(text);
    }
}

/// Formats `blocks` into one string. Empty when no block survives filtering.
#[must_use]
pub fn format_blocks(blocks: &[Block], options: &ExportOptions) -> String {
    CsvExporter::new(blocks, options).chunks(usize::MAX).collect()
}

/// Writes `blocks` to a file at `path`, returning the number of data rows.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the file.
pub fn write_csv_file(path: impl AsRef<Path>, blocks: &[Block], options: &ExportOptions) -> io::Result<usize> {
    let exporter = CsvExporter::new(blocks, options);
    let writer = BufWriter::new(File::create(path.as_ref())?);
    let rows = exporter.write_to(writer, 10_000)?;
    tracing::info!(path = %path.as_ref().display(), rows, "model exported");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orebody_core::{MaterialTable, RockType};

    fn block(i: u32, density: f64) -> Block {
        let mut b = Block::new(i, 0, 0, f64::from(i) + 0.5, 0.5, -0.5);
        b.density = density;
        b
    }

    #[test]
    fn test_empty_input_is_empty_text() {
        assert_eq!(format_blocks(&[], &ExportOptions::default()), "");
    }

    #[test]
    fn test_fully_filtered_is_empty_text() {
        let blocks = [block(0, 0.0), block(1, -1.0)];
        assert_eq!(format_blocks(&blocks, &ExportOptions::default()), "");
    }

    #[test]
    fn test_minimal_layout() {
        let text = format_blocks(&[block(2, 2.5)], &ExportOptions::default());
        assert_eq!(text, "X,Y,Z,I,J,K,ROCKTYPE,DENSITY\n2.5000,0.5000,-0.5000,2.0000,0.0000,0.0000,Waste,2.5000\n");
    }

    #[test]
    fn test_indices_use_four_decimals() {
        let b = Block::new(1_000_000, 7, 12, 0.5, 0.5, -0.5);
        let text = format_blocks(&[b], &ExportOptions::default());
        let row = text.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields[3..6], ["1000000.0000", "7.0000", "12.0000"]);
    }

    #[test]
    fn test_optional_columns_need_data() {
        let table = MaterialTable::standard();
        let ore = block(0, 2.7).with_material(RockType::OreMed, &table.definition(RockType::OreMed));
        let plain = block(1, 2.5);

        let plain_only = [plain.clone()];
        let exporter = CsvExporter::new(&plain_only, &ExportOptions::default());
        assert!(!exporter.columns().contains(&Column::GradeCu));

        let blocks = [ore, plain];
        let exporter = CsvExporter::new(&blocks, &ExportOptions::default());
        assert!(exporter.columns().contains(&Column::GradeCu));
        assert!(exporter.columns().contains(&Column::EconValue));

        let options = ExportOptions {
            include_grades: false,
            ..ExportOptions::default()
        };
        let exporter = CsvExporter::new(&blocks, &options);
        assert!(!exporter.columns().contains(&Column::GradeCu));
        assert!(!exporter.columns().contains(&Column::GradeAu));
    }

    #[test]
    fn test_missing_and_non_finite_numbers() {
        let mut with_grade = block(0, 2.5);
        with_grade.grade_cu = Some(f64::NAN);
        let without = block(1, 2.5);
        let text = format_blocks(&[with_grade, without], &ExportOptions::default());
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], "X,Y,Z,I,J,K,ROCKTYPE,DENSITY,GRADE_CU");
        assert!(rows[1].ends_with(",0.0000"));
        assert!(rows[2].ends_with(",0.0000"));
    }

    #[test]
    fn test_zone_quoting_and_absent_zone() {
        let mut a = block(0, 2.5);
        a.zone = Some("North, \"upper\"".to_string());
        let b = block(1, 2.5);
        let text = format_blocks(&[a, b], &ExportOptions::default());
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].ends_with(",\"North, \"\"upper\"\"\""));
        assert!(rows[2].ends_with("Waste,2.5000,"));
    }

    #[test]
    fn test_cell_size_columns() {
        let options = ExportOptions {
            include_indices: false,
            cell_size: Some([30.0, 30.0, 15.0]),
            ..ExportOptions::default()
        };
        let text = format_blocks(&[block(0, 2.5)], &options);
        assert_eq!(
            text,
            "X,Y,Z,DX,DY,DZ,ROCKTYPE,DENSITY\n0.5000,0.5000,-0.5000,30.0000,30.0000,15.0000,Waste,2.5000\n"
        );
    }

    #[test]
    fn test_chunks_are_bounded() {
        let blocks: Vec<Block> = (0..10).map(|i| block(i, 2.5)).collect();
        let exporter = CsvExporter::new(&blocks, &ExportOptions::default());
        let chunks: Vec<String> = exporter.chunks(4).collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].lines().count(), 5);
        assert_eq!(chunks[1].lines().count(), 4);
        assert_eq!(chunks[2].lines().count(), 2);
        assert_eq!(chunks.concat(), format_blocks(&blocks, &ExportOptions::default()));
    }

    #[test]
    fn test_write_to_matches_format() {
        let blocks: Vec<Block> = (0..5).map(|i| block(i, 2.5)).collect();
        let exporter = CsvExporter::new(&blocks, &ExportOptions::default());
        let mut buffer = Vec::new();
        let rows = exporter.write_to(&mut buffer, 2).unwrap();
        assert_eq!(rows, 5);
        assert_eq!(String::from_utf8(buffer).unwrap(), format_blocks(&blocks, &ExportOptions::default()));
    }

    #[test]
    fn test_options_from_toml() {
        let options: ExportOptions = toml::from_str("include_zone = false\ncell_size = [10.0, 10.0, 5.0]").unwrap();
        assert!(!options.include_zone);
        assert!(options.filter_air_blocks);
        assert_eq!(options.cell_size, Some([10.0, 10.0, 5.0]));
    }
}
