mod aggregate;
mod classify;
mod config;
mod errors;
mod image_io;
mod output;
mod pipeline;
mod recommend;
mod status;
mod zones;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use rayon::prelude::*;

use config::{Config, MetricsStrategy};
use errors::Result;
use image_io::{get_image_files_in_dir, load_image};
use output::{write_report_json, write_zones_csv};
use pipeline::{analyze, AnalysisResult, AnalyzeOptions};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "FieldVisionR - Field Health Analysis")]
struct Args {
    /// Path to input image file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Metrics strategy (overwrites config)
    #[clap(short = 's', long)]
    strategy: Option<StrategyArg>,

    /// Grid size for zone analysis (overwrites config)
    #[clap(short, long)]
    grid_size: Option<u32>,

    /// Skip the per-zone grid analysis
    #[clap(long)]
    no_zones: bool,

    /// Write a default config.toml template and exit
    #[clap(long)]
    write_config: bool,

    /// Enable debug mode (print per-zone detail)
    #[clap(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Fine,
    Coarse,
}

fn print_summary(filename: &str, result: &AnalysisResult, debug: bool) {
    println!(
        "{}: {}x{} pixels, status {:?}",
        filename, result.image_width, result.image_height, result.status.level
    );
    println!(
        "  vigor {:.3}, coverage {:.1}%, water stress {:.3}, nitrogen {:.3}",
        result.overall.vigor_index,
        result.overall.vegetation_coverage,
        result.overall.water_stress_index,
        result.overall.nitrogen_level
    );
    if let Some(health) = result.health_index {
        println!("  composite health index {:.3}", health);
    }
    println!("  {}", result.status.summary);

    for rec in &result.recommendations {
        println!("  [{}] {}", rec.category, rec.message);
    }

    if debug {
        if let (Some(best), Some(worst)) = (&result.best_zone, &result.worst_zone) {
            println!(
                "  best zone {} (vigor {:.3}), worst zone {} (vigor {:.3})",
                best.zone.label,
                best.metrics.vigor_index,
                worst.zone.label,
                worst.metrics.vigor_index
            );
        }
        for zone in &result.zones {
            println!(
                "    {}: vigor {:.3}, coverage {:.1}%",
                zone.zone.label, zone.metrics.vigor_index, zone.metrics.vegetation_coverage
            );
        }
    }
}

fn process_file(path: &PathBuf, config: &Config, debug: bool) -> Result<()> {
    let input = load_image(path)?;
    let options = AnalyzeOptions::from_config(config);

    let mut result = analyze(&input.image, &options)?;
    result.source = Some(input.source);

    write_report_json(&result, &config.output_base_dir, &input.filename)?;
    if !result.zones.is_empty() {
        write_zones_csv(&result, &config.output_base_dir, &input.filename)?;
    }

    print_summary(&input.filename, &result, debug);

    Ok(())
}

/// Main function
fn main() -> Result<()> {
    let args = Args::parse();

    if args.write_config {
        let config = Config::default();
        config.save_to_file(&args.config)?;
        println!("Wrote default configuration to {}", args.config);
        return Ok(());
    }

    let mut config = if PathBuf::from(&args.config).is_file() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };

    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(strategy) = args.strategy {
        config.strategy = match strategy {
            StrategyArg::Fine => MetricsStrategy::Fine,
            StrategyArg::Coarse => MetricsStrategy::Coarse,
        };
    }

    if let Some(grid_size) = args.grid_size {
        config.grid_size = Some(grid_size);
    }

    if args.no_zones {
        config.include_zones = false;
    }

    config.validate()?;

    let start_time = Instant::now();

    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        println!("Processing single file: {}", input_path.display());
        process_file(&input_path, &config, args.debug)?;
    } else if input_path.is_dir() {
        println!("Processing directory: {}", input_path.display());
        let files = get_image_files_in_dir(&input_path)?;

        println!("Found {} image files", files.len());

        if config.use_parallel {
            files
                .par_iter()
                .for_each(|path| {
                    if let Err(e) = process_file(path, &config, args.debug) {
                        eprintln!("Error processing {}: {}", path.display(), e);
                    }
                });
        } else {
            for path in &files {
                process_file(path, &config, args.debug)?;
            }
        }
    } else {
        return Err(errors::FieldVisionError::InvalidPath(input_path));
    }

    let elapsed = start_time.elapsed();
    println!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
