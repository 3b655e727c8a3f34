//! # Generate Model
//!
//! Command-line tool: runs a model config and optionally writes the CSV.
//! An output path of `-` streams the CSV to stdout and suppresses the report.

use std::process::ExitCode;

use orebody::core::RockType;
use orebody::{ModelConfig, ModelPipeline, Stage};

const USAGE: &str = "Usage: generate_model <config.toml> [output.csv | -] [--seed <n>]";

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    config_path: String,
    output_path: Option<String>,
    seed: Option<u64>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut seed = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--seed" {
            let value = rest.next().ok_or("--seed needs a value")?;
            let parsed = value
                .parse::<u64>()
                .map_err(|_| format!("--seed expects an unsigned integer, got {value:?}"))?;
            seed = Some(parsed);
        } else if arg.starts_with("--") {
            return Err(format!("unknown option {arg}"));
        } else {
            positional.push(arg.clone());
        }
    }

    let mut positional = positional.into_iter();
    let config_path = positional.next().ok_or("missing config path")?;
    let output_path = positional.next();
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument {extra:?}"));
    }
    Ok(CliArgs {
        config_path,
        output_path,
        seed,
    })
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --seed <n>     Override the config seed");
            return ExitCode::FAILURE;
        }
    };
    let config_path = &cli.config_path;
    let output_path = cli.output_path.as_deref();
    let seed_override = cli.seed;
    if output_path == Some("-") {
        return stream_to_stdout(config_path, seed_override);
    }

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         OREBODY MODEL GENERATOR                                  ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    println!("Loading config: {config_path}");
    let mut config = match ModelConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if seed_override.is_some() {
        config.seed = seed_override;
    }

    let pipeline = match ModelPipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            println!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut last_percent = None;
    let report = |stage: Stage, progress: orebody::core::Progress| {
        let percent = (progress.fraction() * 100.0) as u32 / 10 * 10;
        if last_percent != Some((stage, percent)) {
            last_percent = Some((stage, percent));
            println!("  {stage:<9} {percent:>3}%");
        }
    };

    let run = match pipeline.run_with_progress(report) {
        Ok(r) => r,
        Err(e) => {
            println!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = pipeline.config();
    let summary = &run.summary;
    println!();
    println!("┌─ RUN ────────────────────────────────────────────────────────────┐");
    println!("│ Generator:          {}", config.generator);
    println!("│ Seed:               {}", run.seed.value());
    println!(
        "│ Grid:               {} x {} x {} ({} blocks)",
        config.grid.nx,
        config.grid.ny,
        config.grid.nz,
        summary.total_blocks()
    );
    println!("│ Batched:            {}", if run.batched { "yes" } else { "no" });
    println!("│ Grid build:         {:.1} ms", run.timings.grid.as_secs_f64() * 1000.0);
    println!("│ Generation:         {:.1} ms", run.timings.generate.as_secs_f64() * 1000.0);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ SUMMARY ────────────────────────────────────────────────────────┐");
    println!("│ {:<10} {:>9} {:>14} {:>8} {:>8} {:>12}", "ROCK", "BLOCKS", "TONNES", "CU", "AU", "VALUE");
    for rock in RockType::ALL {
        let Some(r) = summary.rock(rock) else {
            continue;
        };
        println!(
            "│ {:<10} {:>9} {:>14.0} {:>8.3} {:>8.3} {:>12.0}",
            rock.label(),
            r.blocks,
            r.tonnage,
            r.mean_cu().unwrap_or(0.0),
            r.mean_au().unwrap_or(0.0),
            r.econ_value
        );
    }
    println!("│");
    println!("│ Ore tonnage:        {:.0} t", summary.ore_tonnage());
    println!("│ Total value:        {:.0}", summary.total_econ_value());
    println!("└──────────────────────────────────────────────────────────────────┘");

    if let Some(path) = output_path {
        println!();
        println!("Writing {path}...");
        match pipeline.export_to_file(&run.blocks, path) {
            Ok(rows) => println!("✓ {rows} rows written"),
            Err(e) => {
                println!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn stream_to_stdout(config_path: &str, seed_override: Option<u64>) -> ExitCode {
    let result = ModelConfig::load(config_path).and_then(|mut config| {
        if seed_override.is_some() {
            config.seed = seed_override;
        }
        let pipeline = ModelPipeline::new(config)?;
        let run = pipeline.run()?;
        pipeline.export(&run.blocks, std::io::stdout().lock(), |_, _| {})
    });
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("generate_model").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_output_path_after_seed() {
        let cli = parse_args(&args(&["model.toml", "--seed", "7", "out.csv"])).unwrap();
        assert_eq!(cli.config_path, "model.toml");
        assert_eq!(cli.output_path.as_deref(), Some("out.csv"));
        assert_eq!(cli.seed, Some(7));

        let cli = parse_args(&args(&["--seed", "7", "model.toml", "-"])).unwrap();
        assert_eq!(cli.config_path, "model.toml");
        assert_eq!(cli.output_path.as_deref(), Some("-"));
    }

    #[test]
    fn test_config_only() {
        let cli = parse_args(&args(&["model.toml"])).unwrap();
        assert_eq!(cli.output_path, None);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_bad_seed_is_an_error() {
        assert!(parse_args(&args(&["model.toml", "--seed", "abc"])).is_err());
        assert!(parse_args(&args(&["model.toml", "--seed", "-1"])).is_err());
        assert!(parse_args(&args(&["model.toml", "--seed"])).is_err());
    }

    #[test]
    fn test_missing_config_and_extra_arguments() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["model.toml", "a.csv", "b.csv"])).is_err());
        assert!(parse_args(&args(&["model.toml", "--verbose"])).is_err());
    }
}
