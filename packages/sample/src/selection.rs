//! Row selection by column predicates.
//!
//! A [`Selection`] keeps the rows for which every column predicate holds,
//! restricts the visible columns, relabels the survivors `0..n` and can
//! finish with a uniform down-sample.

use std::collections::BTreeMap;
use std::fmt;

use crime_samples_incident_models::{Cell, Column};
use rand::Rng;

use crate::SelectionError;
use crate::frame::{Frame, relabel};

/// Test applied to the value of a single column.
pub type Predicate = Box<dyn Fn(&Cell) -> bool + Send + Sync>;

/// Filter, projection and down-sampling applied by [`Frame::select`].
#[derive(Default)]
pub struct Selection {
    filters: BTreeMap<Column, Predicate>,
    columns: Option<Vec<Column>>,
    sample: Option<usize>,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("columns", &self.columns)
            .field("sample", &self.sample)
            .finish()
    }
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only rows whose `column` value satisfies `predicate`. A second
    /// filter on the same column replaces the first.
    #[must_use]
    pub fn filter<F>(mut self, column: Column, predicate: F) -> Self
    where
        F: Fn(&Cell) -> bool + Send + Sync + 'static,
    {
        self.filters.insert(column, Box::new(predicate));
        self
    }

    /// Restricts the resulting frame to `columns`, in the given order.
    #[must_use]
    pub fn columns(mut self, columns: &[Column]) -> Self {
        self.columns = Some(columns.to_vec());
        self
    }

    /// Down-samples the filtered rows to exactly `amount`.
    #[must_use]
    pub const fn sample(mut self, amount: usize) -> Self {
        self.sample = Some(amount);
        self
    }
}

impl Frame {
    /// Applies `selection` and returns the resulting frame.
    ///
    /// Survivors of the predicates are relabelled `0..n` before the optional
    /// down-sample, which then keeps those labels.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownColumn`] when a predicate or the
    /// projection names a column this frame lacks, and
    /// [`SelectionError::InsufficientRows`] when the down-sample asks for
    /// more rows than survived filtering.
    pub fn select<R: Rng + ?Sized>(
        &self,
        selection: &Selection,
        rng: &mut R,
    ) -> Result<Self, SelectionError> {
        for column in selection.filters.keys() {
            self.require_column(*column)?;
        }

        let columns = match &selection.columns {
            Some(columns) => {
                for column in columns {
                    self.require_column(*column)?;
                }
                columns.clone()
            }
            None => self.columns.clone(),
        };

        let kept = self
            .rows
            .iter()
            .filter(|row| {
                selection
                    .filters
                    .iter()
                    .all(|(column, predicate)| predicate(&row.incident.cell(*column)))
            })
            .map(|row| row.incident.clone());

        let selected = Self {
            columns,
            rows: relabel(kept),
        };

        log::debug!(
            "Selection kept {} of {} rows",
            selected.len(),
            self.len()
        );

        match selection.sample {
            Some(amount) => selected.sample(amount, rng),
            None => Ok(selected),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike as _;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;
    use crate::frame::tests::incident;

    fn mixed_frame() -> Frame {
        Frame::from_incidents(vec![
            incident("THEFT", 7, 1, false),
            incident("THEFT", 7, 2, true),
            incident("BATTERY", 6, 3, false),
            incident("NARCOTICS", 7, 4, false),
            incident("THEFT", 7, 9, false),
        ])
    }

    fn july_without_arrest() -> Selection {
        Selection::new()
            .filter(Column::Arrest, |c| c.as_bool() == Some(false))
            .filter(Column::ParsedDate, |c| {
                c.as_timestamp().is_some_and(|ts| ts.month() == 7)
            })
    }

    #[test]
    fn keeps_rows_matching_every_predicate() {
        let mut rng = StdRng::seed_from_u64(42);
        let selected = mixed_frame()
            .select(&july_without_arrest(), &mut rng)
            .unwrap();

        assert_eq!(selected.len(), 3);
        for incident in selected.incidents() {
            assert!(!incident.arrest);
            assert_eq!(incident.month_of_year, 7);
        }
    }

    #[test]
    fn relabels_survivors_contiguously() {
        let mut rng = StdRng::seed_from_u64(42);
        let selected = mixed_frame()
            .select(&july_without_arrest(), &mut rng)
            .unwrap();
        let labels: Vec<usize> = selected.rows().iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn projects_columns() {
        let mut rng = StdRng::seed_from_u64(42);
        let selection = july_without_arrest().columns(&[Column::PrimaryType, Column::Location]);
        let selected = mixed_frame().select(&selection, &mut rng).unwrap();

        assert_eq!(selected.columns(), &[Column::PrimaryType, Column::Location]);
        assert!(!selected.has_column(Column::WeekOfYear));
    }

    #[test]
    fn down_sample_keeps_post_filter_labels() {
        let mut rng = StdRng::seed_from_u64(42);
        let selected = mixed_frame()
            .select(&july_without_arrest().sample(2), &mut rng)
            .unwrap();

        assert_eq!(selected.len(), 2);
        for row in selected.rows() {
            assert!(row.label < 3);
        }
    }

    #[test]
    fn unknown_filter_column_is_an_error() {
        let mut rng = StdRng::seed_from_u64(42);
        let selection = Selection::new().filter(Column::Shift, |c| !c.is_null());
        let err = mixed_frame().select(&selection, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::UnknownColumn {
                column: Column::Shift
            }
        ));
    }

    #[test]
    fn unknown_projection_column_is_an_error() {
        let mut rng = StdRng::seed_from_u64(42);
        let selection = Selection::new().columns(&[Column::CategoryCode]);
        assert!(matches!(
            mixed_frame().select(&selection, &mut rng),
            Err(SelectionError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn oversized_down_sample_is_an_error() {
        let mut rng = StdRng::seed_from_u64(42);
        let err = mixed_frame()
            .select(&july_without_arrest().sample(4), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            SelectionError::InsufficientRows {
                requested: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn empty_result_without_sample_is_fine() {
        let mut rng = StdRng::seed_from_u64(42);
        let selection = Selection::new().filter(Column::PrimaryType, |c| c.as_text() == Some("ARSON"));
        let selected = mixed_frame().select(&selection, &mut rng).unwrap();
        assert!(selected.is_empty());
    }
}
