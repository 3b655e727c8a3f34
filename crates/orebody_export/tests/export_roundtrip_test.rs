//! Export round-trip tests.
//!
//! Parses emitted text back into columns and checks that every displayed
//! field survives at 4-decimal precision.

use std::collections::HashMap;

use orebody_core::{build_grid, Block, GridParams, MaterialTable, ModelSeed, RockType, Vec3};
use orebody_export::{format_blocks, CsvExporter, ExportOptions};
use orebody_procedural::{GeneratorKind, GeneratorOptions, ModelGenerator};

fn parse(text: &str) -> Vec<HashMap<String, String>> {
    let mut lines = text.lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').collect();
    lines
        .map(|line| {
            columns
                .iter()
                .zip(line.split(','))
                .map(|(c, v)| ((*c).to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

fn close(field: &str, expected: f64) -> bool {
    field.parse::<f64>().is_ok_and(|v| (v - expected).abs() <= 5e-5)
}

/// Test: Air filtering keeps exactly the dense block
#[test]
fn test_air_filter_two_blocks() {
    let mut air = Block::new(0, 0, 0, 0.5, 0.5, -0.5);
    air.density = 0.0;
    let mut rock = Block::new(1, 0, 0, 1.5, 0.5, -0.5);
    rock.density = 3.0;

    let options = ExportOptions {
        filter_air_blocks: true,
        ..ExportOptions::default()
    };
    let text = format_blocks(&[air, rock], &options);
    let rows = parse(&text);

    println!("{text}");
    assert_eq!(rows.len(), 1, "expected exactly one data row");
    assert_eq!(rows[0]["I"], "1.0000");
    assert_eq!(rows[0]["DENSITY"], "3.0000");
    assert!(text.ends_with('\n'));
}

/// Test: Air filtering removes exactly the blocks with density ≤ 0
#[test]
fn test_air_filter_counts() {
    let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(10.0), [6, 5, 4])).unwrap();
    let air = MaterialTable::standard().definition(RockType::Air);
    let mixed: Vec<Block> = blocks
        .iter()
        .map(|b| if (b.i + b.j + b.k) % 3 == 0 { b.with_material(RockType::Air, &air) } else { b.clone() })
        .collect();
    let dense = mixed.iter().filter(|b| b.density > 0.0).count();

    let exporter = CsvExporter::new(&mixed, &ExportOptions::default());
    assert_eq!(exporter.row_count(), dense);
    assert_eq!(parse(&format_blocks(&mixed, &ExportOptions::default())).len(), dense);

    let keep_all = ExportOptions {
        filter_air_blocks: false,
        ..ExportOptions::default()
    };
    assert_eq!(parse(&format_blocks(&mixed, &keep_all)).len(), mixed.len());
}

/// Test: Generated model round-trips through the text
#[test]
fn test_generated_model_round_trip() {
    let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(30.0), [20, 20, 10])).unwrap();
    let model = ModelGenerator::new(MaterialTable::standard(), GeneratorOptions::default())
        .apply(GeneratorKind::Porphyry, &blocks, Some(ModelSeed::new(42)))
        .unwrap();

    let options = ExportOptions {
        cell_size: Some([30.0, 30.0, 30.0]),
        ..ExportOptions::default()
    };
    let text = format_blocks(&model, &options);
    let rows = parse(&text);
    assert_eq!(rows.len(), model.len());

    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "X,Y,Z,I,J,K,DX,DY,DZ,ROCKTYPE,DENSITY,ZONE,GRADE_CU,GRADE_AU,ECON_VALUE"
    );

    for (block, row) in model.iter().zip(&rows) {
        assert!(close(&row["X"], block.x) && close(&row["Y"], block.y) && close(&row["Z"], block.z));
        assert_eq!(row["I"], format!("{:.4}", f64::from(block.i)));
        assert_eq!(row["K"], format!("{:.4}", f64::from(block.k)));
        assert_eq!(row["DZ"], "30.0000");
        assert_eq!(row["ROCKTYPE"].parse::<RockType>().unwrap(), block.rock_type);
        assert!(close(&row["DENSITY"], block.density));
        assert_eq!(row["ZONE"], block.zone.clone().unwrap_or_default());
        assert!(close(&row["GRADE_CU"], block.grade_cu.unwrap_or(0.0)));
        assert!(close(&row["GRADE_AU"], block.grade_au.unwrap_or(0.0)));
        assert!(close(&row["ECON_VALUE"], block.econ_value.unwrap_or(0.0)));
    }
}

/// Test: Streaming in small chunks equals one-shot formatting
#[test]
fn test_streamed_equals_formatted() {
    let blocks = build_grid(&GridParams::new(Vec3::ZERO, Vec3::splat(5.0), [10, 10, 10])).unwrap();
    let options = ExportOptions::default();

    let mut streamed = Vec::new();
    let rows = CsvExporter::new(&blocks, &options).write_to(&mut streamed, 37).unwrap();

    assert_eq!(rows, 1000);
    assert_eq!(String::from_utf8(streamed).unwrap(), format_blocks(&blocks, &options));
}
