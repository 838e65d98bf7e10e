#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generates demand samples and candidate facility distances from
//! historical crime incidents.
//!
//! One run loads the incident CSV, keeps the non-arrest incidents of one
//! month within the most frequent categories, draws a fixed set of
//! candidate facility locations, and then repeatedly draws demand samples
//! weighted by category frequency. Every sample is written together with
//! its distance to each candidate location. All randomness comes from one
//! seeded generator, so a run is reproducible from its [`GenerateConfig`].

pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crime_samples_incident_models::{Cell, Column, Coordinates};
use crime_samples_sample::{
    CategoryIndex, CostTable, Frame, Selection, SelectionError, derive_features, draw_candidates,
    draw_demand, rank_categories,
};
use crime_samples_source::progress::{ProgressCallback, null_progress};
use crime_samples_source::{LoadStats, SourceError, load_incidents};
use crime_samples_spatial::{DistanceMatrix, SpatialError, centroid, distances_from};
use rand::Rng;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

use crate::output::{
    COST_TABLE_FILE, DIST_FROM_CENTER_FILE, LOCATIONS_FILE, round_files, write_combined_sample,
    write_cost_table, write_dist_from_center, write_distance_matrix, write_locations,
    write_reduced_sample,
};

pub const DEFAULT_INPUT: &str = "data/raw/Chicago_Crimes_2012_to_2017.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "data/cooked";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_POPULATION_SIZE: usize = 10_000;
pub const DEFAULT_LOCATIONS: usize = 50;
pub const DEFAULT_SAMPLES: usize = 4;
pub const DEFAULT_DEMAND_SIZE: usize = 1_000;
pub const DEFAULT_TOP_CATEGORIES: usize = 5;
pub const DEFAULT_MONTH: u32 = 7;

/// Category codes are `u8`.
const MAX_TOP_CATEGORIES: usize = 256;

/// Errors that abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An output file being read back does not have the expected shape.
    #[error("malformed file {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    /// Distance rows do not line up with the rows they belong to.
    #[error("distance rows do not match the sampled rows for {}", path.display())]
    Misaligned { path: PathBuf },
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Incident CSV to read.
    pub input: PathBuf,
    /// Directory the CSV outputs are written to. Created if missing.
    pub output_dir: PathBuf,
    /// Seed of the single random generator used for every draw.
    pub seed: u64,
    /// Rows kept from the filtered population.
    pub population_size: usize,
    /// Number of candidate facility locations (L).
    pub locations: usize,
    /// Demand rounds run are `0..=samples`.
    pub samples: usize,
    /// Rows per demand sample (N).
    pub demand_size: usize,
    /// Number of most frequent categories retained.
    pub top_categories: usize,
    /// Calendar month (1-12) incidents are kept from.
    pub month: u32,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: DEFAULT_SEED,
            population_size: DEFAULT_POPULATION_SIZE,
            locations: DEFAULT_LOCATIONS,
            samples: DEFAULT_SAMPLES,
            demand_size: DEFAULT_DEMAND_SIZE,
            top_categories: DEFAULT_TOP_CATEGORIES,
            month: DEFAULT_MONTH,
        }
    }
}

impl GenerateConfig {
    /// Checks every value before anything is read or written.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidConfig`] naming the first value out
    /// of range.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let invalid = |message: String| Err(GenerateError::InvalidConfig { message });

        if !(1..=12).contains(&self.month) {
            return invalid(format!("month must be within 1..=12, got {}", self.month));
        }
        for (name, value) in [
            ("population size", self.population_size),
            ("location count", self.locations),
            ("demand size", self.demand_size),
            ("top category count", self.top_categories),
        ] {
            if value == 0 {
                return invalid(format!("{name} must be positive"));
            }
        }
        if self.samples == usize::MAX {
            return invalid(format!("sample count must be below {}", usize::MAX));
        }
        if self.top_categories > MAX_TOP_CATEGORIES {
            return invalid(format!(
                "at most {MAX_TOP_CATEGORIES} categories can be retained, got {}",
                self.top_categories
            ));
        }
        if self.locations > self.population_size {
            return invalid(format!(
                "cannot draw {} locations from a population of {}",
                self.locations, self.population_size
            ));
        }
        if self.demand_size > self.population_size {
            return invalid(format!(
                "cannot draw {} demand rows from a population of {}",
                self.demand_size, self.population_size
            ));
        }

        Ok(())
    }

    /// Number of demand rounds a run writes. Saturates for a `samples`
    /// value that [`Self::validate`] rejects.
    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.samples.saturating_add(1)
    }
}

/// Progress sinks for the two slow stages of a run.
pub struct GenerateProgress {
    /// Rows read from the input CSV.
    pub load: Arc<dyn ProgressCallback>,
    /// Demand rounds written.
    pub rounds: Arc<dyn ProgressCallback>,
}

impl Default for GenerateProgress {
    fn default() -> Self {
        Self {
            load: null_progress(),
            rounds: null_progress(),
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateSummary {
    /// Loader counters, when the run started from a file.
    pub load: Option<LoadStats>,
    /// Incidents in the loaded population.
    pub population: usize,
    /// Rows kept after filtering and down-sampling.
    pub filtered: usize,
    /// Retained categories in code order.
    pub categories: Vec<String>,
    pub candidates: Vec<Coordinates>,
    pub centroid: Coordinates,
    pub rounds: usize,
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

/// Loads the input CSV and runs the whole pipeline with a generator
/// seeded from `config.seed`.
///
/// # Errors
///
/// Returns [`GenerateError`] if the configuration is invalid, the input
/// cannot be loaded, a draw cannot be satisfied, or an output cannot be
/// written.
pub fn run(config: &GenerateConfig, progress: &GenerateProgress) -> Result<GenerateSummary, GenerateError> {
    config.validate()?;

    let loaded = load_incidents(&config.input, &progress.load)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    log::debug!("Seeded generator with {}", config.seed);

    let mut summary = generate(
        Frame::from_incidents(loaded.incidents),
        config,
        &mut rng,
        &progress.rounds,
    )?;
    summary.load = Some(loaded.stats);
    Ok(summary)
}

/// Selection keeping non-arrest incidents of `month` whose category is in
/// `index`.
#[must_use]
pub fn demand_population(index: &CategoryIndex, month: u32) -> Selection {
    let categories = index.names();
    Selection::new()
        .filter(Column::Arrest, |cell| cell.as_bool() == Some(false))
        .filter(Column::MonthOfYear, move |cell| {
            matches!(cell, Cell::Integer(m) if *m == i64::from(month))
        })
        .filter(Column::PrimaryType, move |cell| {
            cell.as_text()
                .is_some_and(|name| categories.iter().any(|c| c == name))
        })
}

/// Runs the pipeline over an already loaded population.
///
/// # Errors
///
/// Returns [`GenerateError`] if the configuration is invalid, the
/// population is empty or too small for the requested draws, or an output
/// cannot be written.
#[allow(clippy::cast_precision_loss)]
pub fn generate<R: Rng + ?Sized>(
    population: Frame,
    config: &GenerateConfig,
    rng: &mut R,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<GenerateSummary, GenerateError> {
    config.validate()?;
    let dir = config.output_dir.as_path();
    std::fs::create_dir_all(dir)?;
    let mut files = Vec::new();

    let center = centroid(
        population
            .incidents()
            .map(|i| Coordinates::new(i.latitude, i.longitude)),
    )?;

    let index = CategoryIndex::top(rank_categories(population.incidents()), config.top_categories);
    for share in index.shares() {
        log::info!(
            "{:>8} {:<20} cumulative {:.2}%",
            share.count,
            share.name,
            share.cumulative_share * 100.0
        );
    }

    let selection = demand_population(&index, config.month)
        .columns(Column::SAMPLED)
        .sample(config.population_size);
    let mut filtered = population.select(&selection, rng)?;
    log::info!(
        "Keeping {} ({:.1}%) records",
        filtered.len(),
        filtered.len() as f64 / population.len() as f64 * 100.0
    );
    derive_features(&mut filtered, &index)?;

    let costs = CostTable::default();
    let retained = index.names();
    let uncosted = costs.missing(&retained);
    if !uncosted.is_empty() {
        log::warn!("No resource cost for categories: {}", uncosted.join(", "));
    }
    let path = dir.join(COST_TABLE_FILE);
    write_cost_table(&path, &costs)?;
    files.push(path);

    let candidates = draw_candidates(&filtered, config.locations, rng)?;
    let sites: Vec<Coordinates> = candidates.iter().map(|c| c.coordinates).collect();
    let path = dir.join(LOCATIONS_FILE);
    write_locations(&path, &candidates)?;
    files.push(path);

    let path = dir.join(DIST_FROM_CENTER_FILE);
    write_dist_from_center(&path, &candidates, &distances_from(center, &sites))?;
    files.push(path);

    progress.set_total(config.rounds() as u64);
    for round in 0..config.rounds() {
        progress.set_message(format!("Round {round}"));
        let demand = draw_demand(&filtered, config.demand_size, rng)?;
        let distances = DistanceMatrix::compute(
            demand.rows().iter().map(|row| (row.label, row.incident.location)),
            &sites,
        );
        files.extend(write_round(dir, round, &demand, &distances)?);
        progress.inc(1);
    }
    progress.finish(format!("Wrote {} demand rounds", config.rounds()));
    log::info!("Wrote {} files to {}", files.len(), dir.display());

    Ok(GenerateSummary {
        load: None,
        population: population.len(),
        filtered: filtered.len(),
        categories: index.names(),
        candidates: sites,
        centroid: center,
        rounds: config.rounds(),
        files,
    })
}

fn write_round(
    dir: &Path,
    round: usize,
    demand: &Frame,
    distances: &DistanceMatrix,
) -> Result<[PathBuf; 3], GenerateError> {
    let files = round_files(dir, round);
    let [combined, reduced, matrix] = &files;
    write_combined_sample(combined, demand, distances)?;
    write_reduced_sample(reduced, demand)?;
    write_distance_matrix(matrix, distances)?;
    log::info!("Wrote demand round {round} ({} rows)", demand.len());
    Ok(files)
}
