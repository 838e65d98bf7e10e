#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI tool for generating demand samples and candidate location distances
//! from a crime incident CSV.
//!
//! Writes the category cost table, candidate locations, their distances
//! from the dataset centroid, and one set of sample files per demand round
//! into the output directory.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use crime_samples_cli_utils::IndicatifProgress;
use crime_samples_generate::{
    DEFAULT_DEMAND_SIZE, DEFAULT_INPUT, DEFAULT_LOCATIONS, DEFAULT_MONTH, DEFAULT_OUTPUT_DIR,
    DEFAULT_POPULATION_SIZE, DEFAULT_SAMPLES, DEFAULT_SEED, DEFAULT_TOP_CATEGORIES, GenerateConfig,
    GenerateProgress,
};

#[derive(Parser)]
#[command(name = "crime_samples_generate", about = "Demand sample generation tool")]
struct Cli {
    /// Incident CSV to read
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory to write the generated CSV files to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Seed for every random draw
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Rows kept from the filtered population
    #[arg(long, default_value_t = DEFAULT_POPULATION_SIZE)]
    population_size: usize,

    /// Number of candidate facility locations
    #[arg(long, default_value_t = DEFAULT_LOCATIONS)]
    locations: usize,

    /// Demand rounds are numbered 0 through this value
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Rows in each demand sample
    #[arg(long, default_value_t = DEFAULT_DEMAND_SIZE)]
    demand_size: usize,

    /// Number of most frequent categories to keep
    #[arg(long, default_value_t = DEFAULT_TOP_CATEGORIES)]
    top_categories: usize,

    /// Calendar month (1-12) to keep incidents from
    #[arg(long, default_value_t = DEFAULT_MONTH)]
    month: u32,
}

impl From<Cli> for GenerateConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output_dir: cli.output_dir,
            seed: cli.seed,
            population_size: cli.population_size,
            locations: cli.locations,
            samples: cli.samples,
            demand_size: cli.demand_size,
            top_categories: cli.top_categories,
            month: cli.month,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_samples_cli_utils::init_logger();
    let config = GenerateConfig::from(Cli::parse());
    config.validate()?;

    let progress = GenerateProgress {
        load: IndicatifProgress::records_bar(&multi, "Loading incidents"),
        rounds: IndicatifProgress::steps_bar(&multi, "Demand rounds", config.rounds() as u64),
    };

    let start = Instant::now();
    let summary = crime_samples_generate::run(&config, &progress)?;

    log::info!(
        "Generated {} files from {} incidents in {:.1}s",
        summary.files.len(),
        summary.population,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
