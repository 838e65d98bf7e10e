//! Candidate facility locations and weighted demand draws.

use crime_samples_incident_models::{Column, Coordinates};
use rand::Rng;

use crate::SelectionError;
use crate::frame::Frame;

/// A potential facility site, taken from one incident's `Location`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateLocation {
    /// Label of the population row the site was drawn from.
    pub label: usize,
    pub coordinates: Coordinates,
}

/// Draws `count` candidate sites uniformly without replacement.
///
/// # Errors
///
/// Returns [`SelectionError::UnknownColumn`] if the frame has no `Location`
/// column and [`SelectionError::InsufficientRows`] if `count` exceeds the
/// population.
pub fn draw_candidates<R: Rng + ?Sized>(
    frame: &Frame,
    count: usize,
    rng: &mut R,
) -> Result<Vec<CandidateLocation>, SelectionError> {
    frame.require_column(Column::Location)?;
    let drawn = frame.sample(count, rng)?;

    Ok(drawn
        .rows()
        .iter()
        .map(|row| CandidateLocation {
            label: row.label,
            coordinates: row.incident.location,
        })
        .collect())
}

/// Draws `amount` demand rows without replacement, weighting each row by
/// how many rows of its category the frame holds.
///
/// # Errors
///
/// Returns [`SelectionError::UnknownColumn`] if the frame has no
/// `Primary Type` column and [`SelectionError::InsufficientRows`] if
/// `amount` exceeds the population.
#[allow(clippy::cast_precision_loss)]
pub fn draw_demand<R: Rng + ?Sized>(
    frame: &Frame,
    amount: usize,
    rng: &mut R,
) -> Result<Frame, SelectionError> {
    frame.require_column(Column::PrimaryType)?;
    let counts = frame.category_counts();

    frame.sample_weighted(
        amount,
        |row| {
            counts
                .get(row.incident.primary_type.as_str())
                .copied()
                .unwrap_or(0) as f64
        },
        rng,
    )
}
