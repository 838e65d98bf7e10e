//! Derived `shift` and `type_` columns.

use crime_samples_incident_models::Column;

use crate::SelectionError;
use crate::categories::CategoryIndex;
use crate::frame::Frame;

/// Assigns the shift bucket and category code of every row and makes both
/// columns visible on the frame.
///
/// # Errors
///
/// Returns [`SelectionError::UnknownCategory`] if a row's category is not in
/// `index`. The frame is left untouched in that case.
pub fn derive_features(frame: &mut Frame, index: &CategoryIndex) -> Result<(), SelectionError> {
    let codes = frame
        .rows
        .iter()
        .map(|row| {
            index
                .code(&row.incident.primary_type)
                .ok_or_else(|| SelectionError::UnknownCategory {
                    category: row.incident.primary_type.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (row, code) in frame.rows.iter_mut().zip(codes) {
        row.incident.shift = Some(row.incident.derived_shift());
        row.incident.category_code = Some(code);
    }

    for column in Column::DERIVED {
        if !frame.columns.contains(column) {
            frame.columns.push(*column);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crime_samples_incident_models::{CategoryCode, Shift};

    use super::*;
    use crate::categories::rank_categories;
    use crate::frame::tests::incident;

    #[test]
    fn assigns_shift_and_code() {
        let mut frame = Frame::from_incidents(vec![
            incident("THEFT", 7, 3, false),
            incident("THEFT", 7, 9, false),
            incident("BATTERY", 7, 20, false),
        ]);
        let index = CategoryIndex::top(rank_categories(frame.incidents()), 5);

        derive_features(&mut frame, &index).unwrap();

        let derived: Vec<(Option<Shift>, Option<CategoryCode>)> = frame
            .incidents()
            .map(|i| (i.shift, i.category_code))
            .collect();
        assert_eq!(
            derived,
            vec![
                (Some(Shift::Night), Some(CategoryCode(0))),
                (Some(Shift::Day), Some(CategoryCode(0))),
                (Some(Shift::Evening), Some(CategoryCode(1))),
            ]
        );
        assert!(frame.has_column(Column::Shift));
        assert!(frame.has_column(Column::CategoryCode));
    }

    #[test]
    fn unknown_category_leaves_frame_untouched() {
        let mut frame = Frame::from_incidents(vec![
            incident("THEFT", 7, 3, false),
            incident("THEFT", 7, 4, false),
            incident("ARSON", 7, 9, false),
        ]);
        let index = CategoryIndex::top(rank_categories(frame.incidents()), 1);
        let before = frame.clone();

        let err = derive_features(&mut frame, &index).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::UnknownCategory { ref category } if category == "ARSON"
        ));
        assert_eq!(frame, before);
    }
}
