#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading of the raw crime incident CSV.
//!
//! The loader reads a Chicago-format export, drops rows that are missing a
//! required value or fail to parse, and produces [`Incident`] records with
//! their calendar fields derived.
//!
//! [`Incident`]: crime_samples_incident_models::Incident

pub mod loader;
pub mod parsing;
pub mod progress;

pub use loader::{LoadStats, LoadedIncidents, load_incidents, read_incidents};

/// Errors that can occur while loading source data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a required column.
    #[error("Input is missing required column '{column}'")]
    MissingColumn {
        /// Header name that was expected.
        column: &'static str,
    },
}
