//! Labelled incident rows with a column list.

use std::collections::BTreeMap;

use crime_samples_incident_models::{Column, Incident};
use rand::Rng;
use rand::seq::index;

use crate::SelectionError;

/// An incident together with its row label.
///
/// Labels behave like a dataframe index: assigned contiguously when a frame
/// is built or selected, carried unchanged through random draws so outputs
/// can be traced back to the population row they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: usize,
    pub incident: Incident,
}

/// An ordered set of rows plus the columns visible on them.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<Row>,
}

impl Frame {
    /// Builds a frame over freshly loaded incidents, labelled `0..n`.
    #[must_use]
    pub fn from_incidents(incidents: Vec<Incident>) -> Self {
        Self {
            columns: Column::LOADED.to_vec(),
            rows: relabel(incidents),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn incidents(&self) -> impl Iterator<Item = &Incident> {
        self.rows.iter().map(|row| &row.incident)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fails with [`SelectionError::UnknownColumn`] unless `column` is
    /// visible on this frame.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn require_column(&self, column: Column) -> Result<(), SelectionError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(SelectionError::UnknownColumn { column })
        }
    }

    /// Number of rows per `Primary Type`.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for incident in self.incidents() {
            *counts.entry(incident.primary_type.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Draws `amount` rows uniformly without replacement. The result keeps
    /// this frame's columns and row labels, in draw order.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InsufficientRows`] if `amount` exceeds the
    /// number of rows.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        amount: usize,
        rng: &mut R,
    ) -> Result<Self, SelectionError> {
        self.ensure_population(amount)?;
        let picked = index::sample(rng, self.rows.len(), amount);
        Ok(self.take(picked.iter()))
    }

    /// Draws `amount` rows without replacement, each row's chance
    /// proportional to `weight(row)`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InsufficientRows`] if `amount` exceeds the
    /// number of rows, or [`SelectionError::InvalidWeights`] if a weight is
    /// negative or not finite.
    pub fn sample_weighted<R, F>(
        &self,
        amount: usize,
        weight: F,
        rng: &mut R,
    ) -> Result<Self, SelectionError>
    where
        R: Rng + ?Sized,
        F: Fn(&Row) -> f64,
    {
        self.ensure_population(amount)?;
        let picked =
            index::sample_weighted(rng, self.rows.len(), |i| weight(&self.rows[i]), amount)?;
        Ok(self.take(picked.iter()))
    }

    fn ensure_population(&self, amount: usize) -> Result<(), SelectionError> {
        if amount > self.rows.len() {
            return Err(SelectionError::InsufficientRows {
                requested: amount,
                available: self.rows.len(),
            });
        }
        Ok(())
    }

    fn take(&self, positions: impl Iterator<Item = usize>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: positions.map(|i| self.rows[i].clone()).collect(),
        }
    }
}

/// Assigns contiguous labels `0..n` in iteration order.
pub(crate) fn relabel(incidents: impl IntoIterator<Item = Incident>) -> Vec<Row> {
    incidents
        .into_iter()
        .enumerate()
        .map(|(label, incident)| Row { label, incident })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use crime_samples_incident_models::Coordinates;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    /// Incident on the 10th of `month` 2016 at `hour`:00.
    pub fn incident(category: &str, month: u32, hour: u32, arrest: bool) -> Incident {
        let date = NaiveDate::from_ymd_opt(2016, month, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        let lat = 41.8 + f64::from(hour) / 100.0;
        let lng = -87.7 + f64::from(month) / 100.0;
        Incident::new(
            date,
            category.to_string(),
            "STREET".to_string(),
            arrest,
            lat,
            lng,
            Coordinates::new(lat, lng),
        )
    }

    pub fn frame_of(categories: &[&str]) -> Frame {
        Frame::from_incidents(
            categories
                .iter()
                .enumerate()
                .map(|(i, c)| incident(c, 7, u32::try_from(i % 24).unwrap(), false))
                .collect(),
        )
    }

    #[test]
    fn labels_are_contiguous_on_build() {
        let frame = frame_of(&["THEFT", "BATTERY", "THEFT"]);
        let labels: Vec<usize> = frame.rows().iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![0, 1, 2]);
        assert_eq!(frame.columns(), Column::LOADED);
    }

    #[test]
    fn counts_categories() {
        let frame = frame_of(&["THEFT", "BATTERY", "THEFT"]);
        let counts = frame.category_counts();
        assert_eq!(counts.get("THEFT"), Some(&2));
        assert_eq!(counts.get("BATTERY"), Some(&1));
    }

    #[test]
    fn uniform_sample_is_a_subset_with_distinct_labels() {
        let frame = frame_of(&["THEFT"; 40]);
        let mut rng = StdRng::seed_from_u64(42);
        let sampled = frame.sample(15, &mut rng).unwrap();

        assert_eq!(sampled.len(), 15);
        let labels: BTreeSet<usize> = sampled.rows().iter().map(|r| r.label).collect();
        assert_eq!(labels.len(), 15);
        for row in sampled.rows() {
            assert_eq!(&frame.rows()[row.label], row);
        }
    }

    #[test]
    fn sample_is_reproducible_for_a_seed() {
        let frame = frame_of(&["THEFT"; 40]);
        let a = frame.sample(10, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = frame.sample(10, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_sample_is_an_error() {
        let frame = frame_of(&["THEFT"; 3]);
        let err = frame
            .sample(4, &mut StdRng::seed_from_u64(1))
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
    fn zero_weight_rows_are_never_drawn() {
        let mut categories = vec!["THEFT"; 10];
        categories.extend(["ASSAULT"; 10]);
        let frame = frame_of(&categories);

        let sampled = frame
            .sample_weighted(
                10,
                |row| {
                    if row.incident.primary_type == "THEFT" {
                        1.0
                    } else {
                        0.0
                    }
                },
                &mut StdRng::seed_from_u64(3),
            )
            .unwrap();

        assert_eq!(sampled.len(), 10);
        assert!(sampled.incidents().all(|i| i.primary_type == "THEFT"));
    }

    #[test]
    fn negative_weights_are_rejected() {
        let frame = frame_of(&["THEFT"; 3]);
        let err = frame
            .sample_weighted(1, |_| -1.0, &mut StdRng::seed_from_u64(3))
            .unwrap_err();
        assert!(matches!(err, SelectionError::InvalidWeights(_)));
    }
}
