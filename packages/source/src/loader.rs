//! Chicago crime CSV loader.
//!
//! Columns are located by header name, so exports with extra or reordered
//! columns load the same way. A row is kept only when every required column
//! holds a parseable value; everything else is counted and dropped.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crime_samples_incident_models::{Coordinates, Incident};

use crate::SourceError;
use crate::parsing::{non_empty, parse_flag, parse_float, parse_incident_date};
use crate::progress::ProgressCallback;

/// Rows between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

const DATE: &str = "Date";
const PRIMARY_TYPE: &str = "Primary Type";
const LOCATION_DESCRIPTION: &str = "Location Description";
const ARREST: &str = "Arrest";
const LATITUDE: &str = "Latitude";
const LONGITUDE: &str = "Longitude";
const LOCATION: &str = "Location";

/// Row counts from a single load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read (excluding the header).
    pub total_rows: u64,
    /// Rows that became incidents.
    pub kept: u64,
    /// Rows dropped because a required value was empty.
    pub missing: u64,
    /// Rows dropped because a required value did not parse.
    pub malformed: u64,
}

impl LoadStats {
    /// Rows dropped for any reason.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.missing + self.malformed
    }
}

/// Output of [`load_incidents`] / [`read_incidents`].
#[derive(Debug, Clone)]
pub struct LoadedIncidents {
    pub incidents: Vec<Incident>,
    pub stats: LoadStats,
}

/// Header positions of the required columns.
struct RequiredColumns {
    date: usize,
    primary_type: usize,
    location_description: usize,
    arrest: usize,
    latitude: usize,
    longitude: usize,
    location: usize,
}

impl RequiredColumns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, SourceError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or(SourceError::MissingColumn { column })
        };

        Ok(Self {
            date: find(DATE)?,
            primary_type: find(PRIMARY_TYPE)?,
            location_description: find(LOCATION_DESCRIPTION)?,
            arrest: find(ARREST)?,
            latitude: find(LATITUDE)?,
            longitude: find(LONGITUDE)?,
            location: find(LOCATION)?,
        })
    }
}

/// Why a row was dropped.
#[derive(Debug)]
enum Rejection {
    Missing { column: &'static str },
    Malformed { column: &'static str, value: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { column } => write!(f, "missing '{column}'"),
            Self::Malformed { column, value } => {
                write!(f, "unparseable '{column}' value '{value}'")
            }
        }
    }
}

/// Loads incidents from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened, the CSV cannot be
/// decoded, or a required column is absent from the header.
pub fn load_incidents(
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedIncidents, SourceError> {
    log::info!("Loading incidents from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_incidents(file, progress)
}

/// Loads incidents from any CSV reader.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV cannot be decoded or a required
/// column is absent from the header.
pub fn read_incidents<R: Read>(
    reader: R,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedIncidents, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = RequiredColumns::locate(reader.headers()?)?;

    let mut incidents = Vec::new();
    let mut stats = LoadStats::default();
    let mut pending: u64 = 0;

    for result in reader.records() {
        let record = result?;
        stats.total_rows += 1;

        match parse_row(&record, &columns) {
            Ok(incident) => {
                incidents.push(incident);
                stats.kept += 1;
            }
            Err(rejection) => {
                log::debug!("Dropping row {}: {rejection}", stats.total_rows);
                match rejection {
                    Rejection::Missing { .. } => stats.missing += 1,
                    Rejection::Malformed { .. } => stats.malformed += 1,
                }
            }
        }

        pending += 1;
        if pending == PROGRESS_BATCH {
            progress.inc(pending);
            pending = 0;
        }
    }
    progress.inc(pending);

    if stats.malformed > 0 {
        log::warn!(
            "Dropped {} rows with unparseable values (run with RUST_LOG=debug for details)",
            stats.malformed
        );
    }
    log::info!(
        "Loaded {} incidents from {} rows ({} missing values, {} malformed)",
        stats.kept,
        stats.total_rows,
        stats.missing,
        stats.malformed
    );
    progress.finish(format!("Loaded {} incidents", stats.kept));

    Ok(LoadedIncidents { incidents, stats })
}

fn parse_row(record: &csv::StringRecord, columns: &RequiredColumns) -> Result<Incident, Rejection> {
    let field = |idx: usize, column: &'static str| {
        record
            .get(idx)
            .and_then(non_empty)
            .ok_or(Rejection::Missing { column })
    };
    let malformed = |column: &'static str, value: &str| Rejection::Malformed {
        column,
        value: value.to_string(),
    };

    let date_raw = field(columns.date, DATE)?;
    let primary_type = field(columns.primary_type, PRIMARY_TYPE)?;
    let location_description = field(columns.location_description, LOCATION_DESCRIPTION)?;
    let arrest_raw = field(columns.arrest, ARREST)?;
    let latitude_raw = field(columns.latitude, LATITUDE)?;
    let longitude_raw = field(columns.longitude, LONGITUDE)?;
    let location_raw = field(columns.location, LOCATION)?;

    let parsed_date = parse_incident_date(date_raw).ok_or_else(|| malformed(DATE, date_raw))?;
    let arrest = parse_flag(arrest_raw).ok_or_else(|| malformed(ARREST, arrest_raw))?;
    let latitude = parse_float(latitude_raw).ok_or_else(|| malformed(LATITUDE, latitude_raw))?;
    let longitude =
        parse_float(longitude_raw).ok_or_else(|| malformed(LONGITUDE, longitude_raw))?;
    let location = location_raw
        .parse::<Coordinates>()
        .map_err(|_| malformed(LOCATION, location_raw))?;

    Ok(Incident::new(
        parsed_date,
        primary_type.to_string(),
        location_description.to_string(),
        arrest,
        latitude,
        longitude,
        location,
    ))
}
