#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar distances between incident coordinates.
//!
//! Distances treat latitude/longitude degrees as a flat grid and scale by
//! 10,000 km per 90 degrees (pole to equator). There is no great-circle or
//! antimeridian correction; inputs are expected to come from a single city.

use crime_samples_incident_models::Coordinates;
use geo::{Centroid as _, MultiPoint, Point};

/// Kilometres per degree of latitude, from the original definition of the
/// metre (10,000 km from pole to equator).
pub const KM_PER_DEGREE: f64 = 10_000.0 / 90.0;

/// Errors raised by spatial computations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpatialError {
    /// A centroid was requested over no points.
    #[error("cannot compute a centroid of an empty population")]
    EmptyPopulation,

    /// Matrix rows did not all have the same width.
    #[error("distance row {row} has {found} values, expected {expected}")]
    RaggedMatrix {
        /// Zero-based row position.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// Row labels and rows differ in count.
    #[error("{labels} row labels for {rows} distance rows")]
    LabelMismatch {
        /// Number of labels given.
        labels: usize,
        /// Number of rows given.
        rows: usize,
    },
}

fn to_point(c: Coordinates) -> Point<f64> {
    Point::new(c.longitude, c.latitude)
}

/// Approximate distance in kilometres between two coordinates.
///
/// Symmetric, and exactly zero for identical inputs.
#[must_use]
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    let delta = to_point(a) - to_point(b);
    delta.x().hypot(delta.y()) * KM_PER_DEGREE
}

/// Distances from `origin` to every site, in site order.
#[must_use]
pub fn distances_from(origin: Coordinates, sites: &[Coordinates]) -> Vec<f64> {
    sites.iter().map(|site| distance(origin, *site)).collect()
}

/// Arithmetic mean of latitude and of longitude.
///
/// # Errors
///
/// Returns [`SpatialError::EmptyPopulation`] when `points` is empty.
pub fn centroid(points: impl IntoIterator<Item = Coordinates>) -> Result<Coordinates, SpatialError> {
    let multi: MultiPoint<f64> = points.into_iter().map(to_point).collect();
    let center = multi.centroid().ok_or(SpatialError::EmptyPopulation)?;
    log::debug!(
        "Centroid of {} points: ({}, {})",
        multi.0.len(),
        center.y(),
        center.x()
    );
    Ok(Coordinates::new(center.y(), center.x()))
}

/// Distances from labelled origins (rows) to a fixed list of sites
/// (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    labels: Vec<usize>,
    width: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Computes the matrix for `origins` against `sites`.
    #[must_use]
    pub fn compute(
        origins: impl IntoIterator<Item = (usize, Coordinates)>,
        sites: &[Coordinates],
    ) -> Self {
        let mut labels = Vec::new();
        let mut values = Vec::new();
        for (label, origin) in origins {
            labels.push(label);
            values.extend(sites.iter().map(|site| distance(origin, *site)));
        }
        Self {
            labels,
            width: sites.len(),
            values,
        }
    }

    /// Rebuilds a matrix from labelled rows, e.g. after reading it back
    /// from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::LabelMismatch`] or
    /// [`SpatialError::RaggedMatrix`] if the rows do not form a rectangle.
    pub fn from_rows(labels: Vec<usize>, rows: Vec<Vec<f64>>) -> Result<Self, SpatialError> {
        if labels.len() != rows.len() {
            return Err(SpatialError::LabelMismatch {
                labels: labels.len(),
                rows: rows.len(),
            });
        }

        let width = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(width * rows.len());
        for (row, distances) in rows.into_iter().enumerate() {
            if distances.len() != width {
                return Err(SpatialError::RaggedMatrix {
                    row,
                    expected: width,
                    found: distances.len(),
                });
            }
            values.extend(distances);
        }

        Ok(Self {
            labels,
            width,
            values,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of sites (columns).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Distances of the row at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.width..(i + 1) * self.width]
    }

    /// `(label, distances)` for every row, in order.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[f64])> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (*label, self.row(i)))
    }
}
