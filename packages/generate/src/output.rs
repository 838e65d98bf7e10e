//! CSV files written under the output directory, and readers for the ones
//! downstream tools consume.
//!
//! Labelled files start with an unnamed label column, the way a dataframe
//! index is written. Distance columns are named by candidate position
//! `0..L`.

use std::path::{Path, PathBuf};

use crime_samples_incident_models::{Column, Coordinates};
use crime_samples_sample::{CandidateLocation, CostEntry, CostTable, Frame};
use crime_samples_spatial::DistanceMatrix;
use serde::{Deserialize, Serialize};

use crate::GenerateError;

pub const COST_TABLE_FILE: &str = "resource_cost.csv";
pub const LOCATIONS_FILE: &str = "locations.csv";
pub const DIST_FROM_CENTER_FILE: &str = "dist_from_center.csv";

/// Columns of the reduced per-round sample.
pub const REDUCED_COLUMNS: &[Column] = &[Column::CategoryCode, Column::Shift];

/// `col_sample_{round}.csv`
#[must_use]
pub fn combined_sample_file(round: usize) -> String {
    format!("col_sample_{round}.csv")
}

/// `sample_{round}.csv`
#[must_use]
pub fn reduced_sample_file(round: usize) -> String {
    format!("sample_{round}.csv")
}

/// `distances_{round}.csv`
#[must_use]
pub fn distance_matrix_file(round: usize) -> String {
    format!("distances_{round}.csv")
}

#[derive(Debug, Serialize, Deserialize)]
struct LocationRecord {
    #[serde(rename = "Location")]
    location: Coordinates,
}

fn malformed(path: &Path, message: impl Into<String>) -> GenerateError {
    GenerateError::Malformed {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn parse_label(path: &Path, value: &str) -> Result<usize, GenerateError> {
    value
        .trim()
        .parse()
        .map_err(|_| malformed(path, format!("invalid row label '{value}'")))
}

fn parse_distance(path: &Path, value: &str) -> Result<f64, GenerateError> {
    value
        .trim()
        .parse()
        .map_err(|_| malformed(path, format!("invalid distance '{value}'")))
}

fn site_headers(width: usize) -> impl Iterator<Item = String> {
    (0..width).map(|site| site.to_string())
}

/// Writes the category cost table with header `category,cost`.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be written.
pub fn write_cost_table(path: &Path, table: &CostTable) -> Result<(), GenerateError> {
    let mut writer = csv::Writer::from_path(path)?;
    for entry in table.entries() {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    log::info!("Wrote {} category costs to {}", table.entries().len(), path.display());
    Ok(())
}

/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be read or decoded.
pub fn read_cost_table(path: &Path) -> Result<CostTable, GenerateError> {
    let mut reader = csv::Reader::from_path(path)?;
    let entries = reader
        .deserialize::<CostEntry>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CostTable::from_entries(entries))
}

/// Writes one `(lat, lon)` per candidate under the header `Location`.
///
/// Locations are written in their parsed form, not the source text, so
/// `( 41.80 , -87.60 )` in the input comes out as `(41.8, -87.6)`.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be written.
pub fn write_locations(path: &Path, candidates: &[CandidateLocation]) -> Result<(), GenerateError> {
    let mut writer = csv::Writer::from_path(path)?;
    for candidate in candidates {
        writer.serialize(LocationRecord {
            location: candidate.coordinates,
        })?;
    }
    writer.flush()?;
    log::info!("Wrote {} candidate locations to {}", candidates.len(), path.display());
    Ok(())
}

/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be read or a location does
/// not parse.
pub fn read_locations(path: &Path) -> Result<Vec<Coordinates>, GenerateError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut locations = Vec::new();
    for record in reader.deserialize::<LocationRecord>() {
        locations.push(record?.location);
    }
    Ok(locations)
}

/// Writes each candidate's distance from the dataset centroid, labelled by
/// the population row the candidate was drawn from.
///
/// # Errors
///
/// Returns [`GenerateError::Misaligned`] if `distances` and `candidates`
/// differ in length, or an I/O error.
pub fn write_dist_from_center(
    path: &Path,
    candidates: &[CandidateLocation],
    distances: &[f64],
) -> Result<(), GenerateError> {
    if candidates.len() != distances.len() {
        return Err(GenerateError::Misaligned {
            path: path.to_path_buf(),
        });
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["", Column::Location.as_ref()])?;
    for (candidate, distance) in candidates.iter().zip(distances) {
        writer.write_record([candidate.label.to_string(), distance.to_string()])?;
    }
    writer.flush()?;
    log::info!("Wrote centroid distances to {}", path.display());
    Ok(())
}

/// Reads `(label, distance)` pairs written by [`write_dist_from_center`].
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be read or a value does not
/// parse.
pub fn read_dist_from_center(path: &Path) -> Result<Vec<(usize, f64)>, GenerateError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let (Some(label), Some(distance)) = (record.get(0), record.get(1)) else {
            return Err(malformed(path, "expected a label and a distance"));
        };
        pairs.push((parse_label(path, label)?, parse_distance(path, distance)?));
    }
    Ok(pairs)
}

/// Writes a labelled distance matrix with site columns `0..width`.
///
/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be written.
pub fn write_distance_matrix(path: &Path, matrix: &DistanceMatrix) -> Result<(), GenerateError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(std::iter::once(String::new()).chain(site_headers(matrix.width())))?;
    for (label, distances) in matrix.rows() {
        writer.write_record(
            std::iter::once(label.to_string()).chain(distances.iter().map(f64::to_string)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// # Errors
///
/// Returns [`GenerateError`] if the file cannot be read, a value does not
/// parse, or the rows are not all the same width.
pub fn read_distance_matrix(path: &Path) -> Result<DistanceMatrix, GenerateError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut labels = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let label = fields
            .next()
            .ok_or_else(|| malformed(path, "empty distance row"))?;
        labels.push(parse_label(path, label)?);
        rows.push(
            fields
                .map(|value| parse_distance(path, value))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    Ok(DistanceMatrix::from_rows(labels, rows)?)
}

/// Writes every visible column of `frame` with its row labels, followed by
/// the matching distance row.
///
/// # Errors
///
/// Returns [`GenerateError::Misaligned`] if the matrix rows do not carry the
/// frame's labels in order, or an I/O error.
pub fn write_combined_sample(
    path: &Path,
    frame: &Frame,
    distances: &DistanceMatrix,
) -> Result<(), GenerateError> {
    let aligned = frame.len() == distances.len()
        && frame
            .rows()
            .iter()
            .zip(distances.labels())
            .all(|(row, label)| row.label == *label);
    if !aligned {
        return Err(GenerateError::Misaligned {
            path: path.to_path_buf(),
        });
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(
        std::iter::once(String::new())
            .chain(frame.columns().iter().map(ToString::to_string))
            .chain(site_headers(distances.width())),
    )?;
    for (row, (_, row_distances)) in frame.rows().iter().zip(distances.rows()) {
        writer.write_record(
            std::iter::once(row.label.to_string())
                .chain(
                    frame
                        .columns()
                        .iter()
                        .map(|column| row.incident.cell(*column).to_string()),
                )
                .chain(row_distances.iter().map(f64::to_string)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the `type_,shift` projection of `frame` without row labels.
///
/// # Errors
///
/// Returns [`GenerateError`] if the derived columns are missing or the file
/// cannot be written.
pub fn write_reduced_sample(path: &Path, frame: &Frame) -> Result<(), GenerateError> {
    for column in REDUCED_COLUMNS {
        frame.require_column(*column)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REDUCED_COLUMNS.iter().map(ToString::to_string))?;
    for incident in frame.incidents() {
        writer.write_record(
            REDUCED_COLUMNS
                .iter()
                .map(|column| incident.cell(*column).to_string()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Paths of the three files written for `round` under `dir`.
#[must_use]
pub fn round_files(dir: &Path, round: usize) -> [PathBuf; 3] {
    [
        dir.join(combined_sample_file(round)),
        dir.join(reduced_sample_file(round)),
        dir.join(distance_matrix_file(round)),
    ]
}

#[cfg(test)]
mod tests {
    use crime_samples_incident_models::{CategoryCode, Incident, Shift};
    use crime_samples_sample::{CategoryIndex, Selection, derive_features, rank_categories};
    use crime_samples_spatial::distances_from;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn candidates() -> Vec<CandidateLocation> {
        vec![
            CandidateLocation {
                label: 17,
                coordinates: Coordinates::new(41.864_073_157, -87.706_818_608),
            },
            CandidateLocation {
                label: 3,
                coordinates: Coordinates::new(41.782_921_527, -87.604_297_254),
            },
        ]
    }

    fn derived_frame() -> Frame {
        let date = chrono::NaiveDate::from_ymd_opt(2016, 7, 4)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        let location = Coordinates::new(41.894_680_82, -87.758_371_263);
        let incident = Incident::new(
            date,
            "THEFT".to_string(),
            "STREET".to_string(),
            false,
            location.latitude,
            location.longitude,
            location,
        );

        let mut rng = StdRng::seed_from_u64(42);
        let mut frame = Frame::from_incidents(vec![incident])
            .select(&Selection::new().columns(Column::SAMPLED), &mut rng)
            .unwrap();
        let index = CategoryIndex::top(rank_categories(frame.incidents()), 5);
        derive_features(&mut frame, &index).unwrap();

        let derived = &frame.rows()[0].incident;
        assert_eq!(derived.shift, Some(Shift::Day));
        assert_eq!(derived.category_code, Some(CategoryCode(0)));
        frame
    }

    #[test]
    fn cost_table_round_trips() {
        let dir = test_dir("crime_samples_output_costs");
        let path = dir.join(COST_TABLE_FILE);

        write_cost_table(&path, &CostTable::default()).unwrap();
        assert!(
            std::fs::read_to_string(&path)
                .unwrap()
                .starts_with("category,cost\nTHEFT,300\n")
        );
        assert_eq!(read_cost_table(&path).unwrap(), CostTable::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn locations_round_trip() {
        let dir = test_dir("crime_samples_output_locations");
        let path = dir.join(LOCATIONS_FILE);

        write_locations(&path, &candidates()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Location\n\"(41.864073157, -87.706818608)\"\n"));

        let read = read_locations(&path).unwrap();
        assert_eq!(read.len(), 2);
        for (read, written) in read.iter().zip(candidates()) {
            assert!((read.latitude - written.coordinates.latitude).abs() < 1e-9);
            assert!((read.longitude - written.coordinates.longitude).abs() < 1e-9);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn locations_are_written_normalised() {
        let dir = test_dir("crime_samples_output_normalised");
        let path = dir.join(LOCATIONS_FILE);
        let coordinates: Coordinates = "( 41.80 , -87.60 )".parse().unwrap();

        write_locations(
            &path,
            &[CandidateLocation {
                label: 0,
                coordinates,
            }],
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Location\n\"(41.8, -87.6)\"\n"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn centroid_distances_round_trip() {
        let dir = test_dir("crime_samples_output_center");
        let path = dir.join(DIST_FROM_CENTER_FILE);
        let sites: Vec<Coordinates> = candidates().iter().map(|c| c.coordinates).collect();
        let distances = distances_from(Coordinates::new(41.84, -87.67), &sites);

        write_dist_from_center(&path, &candidates(), &distances).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with(",Location\n17,"));

        let read = read_dist_from_center(&path).unwrap();
        assert_eq!(read.iter().map(|(l, _)| *l).collect::<Vec<_>>(), vec![17, 3]);
        for ((_, read), written) in read.iter().zip(&distances) {
            assert!((read - written).abs() < 1e-9);
        }

        assert!(matches!(
            write_dist_from_center(&path, &candidates(), &distances[..1]),
            Err(GenerateError::Misaligned { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn distance_matrix_round_trips() {
        let dir = test_dir("crime_samples_output_matrix");
        let path = dir.join(distance_matrix_file(0));
        let sites: Vec<Coordinates> = candidates().iter().map(|c| c.coordinates).collect();
        let matrix = DistanceMatrix::compute(
            [
                (4, Coordinates::new(41.9, -87.7)),
                (9, Coordinates::new(41.75, -87.6)),
            ],
            &sites,
        );

        write_distance_matrix(&path, &matrix).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with(",0,1\n4,"));

        let read = read_distance_matrix(&path).unwrap();
        assert_eq!(read.labels(), matrix.labels());
        assert_eq!(read.width(), 2);
        for ((_, read), (_, written)) in read.rows().zip(matrix.rows()) {
            for (a, b) in read.iter().zip(written) {
                assert!((a - b).abs() < 1e-9);
            }
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn combined_sample_has_columns_then_distances() {
        let dir = test_dir("crime_samples_output_combined");
        let path = dir.join(combined_sample_file(2));
        let frame = derived_frame();
        let sites: Vec<Coordinates> = candidates().iter().map(|c| c.coordinates).collect();
        let matrix = DistanceMatrix::compute(
            frame.rows().iter().map(|r| (r.label, r.incident.location)),
            &sites,
        );

        write_combined_sample(&path, &frame, &matrix).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            ",parsed_date,Primary Type,Location Description,Arrest,Latitude,Longitude,\
Location,shift,type_,0,1"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(
            "0,2016-07-04 13:30:00,THEFT,STREET,False,41.89468082,-87.758371263,\
\"(41.89468082, -87.758371263)\",1,0,"
        ));

        let shifted = DistanceMatrix::compute([(5, Coordinates::new(41.0, -87.0))], &sites);
        assert!(matches!(
            write_combined_sample(&path, &frame, &shifted),
            Err(GenerateError::Misaligned { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reduced_sample_is_type_then_shift() {
        let dir = test_dir("crime_samples_output_reduced");
        let path = dir.join(reduced_sample_file(0));

        write_reduced_sample(&path, &derived_frame()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "type_,shift\n0,1\n");

        let underived = Frame::from_incidents(derived_frame().incidents().cloned().collect());
        assert!(matches!(
            write_reduced_sample(&path, &underived),
            Err(GenerateError::Selection(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
