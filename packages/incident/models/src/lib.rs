#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record types shared by every stage of sample generation.
//!
//! A loaded crime incident is an [`Incident`]. Stages that reason about
//! incidents generically (column predicates, CSV projection) go through the
//! [`Column`] / [`Cell`] pair instead of touching struct fields directly.

mod coordinates;

use std::fmt;

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use coordinates::{Coordinates, LocationParseError};

/// Format used for every timestamp written to an output file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Eight-hour time-of-day bucket an incident falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Shift {
    /// 00:00 to 07:59
    Night = 0,
    /// 08:00 to 15:59
    Day = 1,
    /// 16:00 to 23:59
    Evening = 2,
}

impl Shift {
    /// Number of hours covered by a single shift.
    pub const HOURS: u32 = 8;

    /// Buckets an hour of the day (`0..24`) into its shift.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour / Self::HOURS {
            0 => Self::Night,
            1 => Self::Day,
            _ => Self::Evening,
        }
    }

    /// Returns the numeric bucket (0, 1 or 2).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns all shifts in bucket order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Night, Self::Day, Self::Evening]
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Position of a crime category within the retained top-k list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryCode(pub u8);

impl CategoryCode {
    /// Returns the code as a list index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column of the incident frame. Display and parse names match the CSV
/// headers used on both the input and output side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
pub enum Column {
    #[strum(serialize = "parsed_date")]
    ParsedDate,
    #[strum(serialize = "Primary Type")]
    PrimaryType,
    #[strum(serialize = "Location Description")]
    LocationDescription,
    #[strum(serialize = "Arrest")]
    Arrest,
    #[strum(serialize = "Latitude")]
    Latitude,
    #[strum(serialize = "Longitude")]
    Longitude,
    #[strum(serialize = "Location")]
    Location,
    #[strum(serialize = "weekofyear")]
    WeekOfYear,
    #[strum(serialize = "monthofyear")]
    MonthOfYear,
    #[strum(serialize = "shift")]
    Shift,
    #[strum(serialize = "type_")]
    CategoryCode,
}

impl Column {
    /// Columns present on every freshly loaded incident.
    pub const LOADED: &[Self] = &[
        Self::ParsedDate,
        Self::PrimaryType,
        Self::LocationDescription,
        Self::Arrest,
        Self::Latitude,
        Self::Longitude,
        Self::Location,
        Self::WeekOfYear,
        Self::MonthOfYear,
    ];

    /// The raw columns kept in demand samples (the input columns, with
    /// `Date` replaced by its parsed form).
    pub const SAMPLED: &[Self] = &[
        Self::ParsedDate,
        Self::PrimaryType,
        Self::LocationDescription,
        Self::Arrest,
        Self::Latitude,
        Self::Longitude,
        Self::Location,
    ];

    /// Columns assigned by the feature stage.
    pub const DERIVED: &[Self] = &[Self::Shift, Self::CategoryCode];
}

/// A single dynamically typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Bool(bool),
    Float(f64),
    Integer(i64),
    Timestamp(NaiveDateTime),
    Coordinates(Coordinates),
    /// Value not assigned yet (derived columns before feature derivation).
    Null,
}

impl Cell {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Renders the cell the way it is written to CSV: `True`/`False` booleans,
/// [`TIMESTAMP_FORMAT`] timestamps and an empty field for [`Cell::Null`].
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Self::Coordinates(c) => write!(f, "{c}"),
            Self::Null => Ok(()),
        }
    }
}

/// One crime incident with every required column present.
///
/// `week_of_year` and `month_of_year` are derived from `parsed_date` on
/// construction. `shift` and `category_code` stay `None` until the feature
/// stage assigns them.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub parsed_date: NaiveDateTime,
    /// Chicago `Primary Type` (e.g. "THEFT").
    pub primary_type: String,
    pub location_description: String,
    pub arrest: bool,
    pub latitude: f64,
    pub longitude: f64,
    /// Parsed `Location` column. Distances are computed from this pair,
    /// not from `latitude`/`longitude`.
    pub location: Coordinates,
    /// ISO 8601 week number.
    pub week_of_year: u32,
    pub month_of_year: u32,
    pub shift: Option<Shift>,
    pub category_code: Option<CategoryCode>,
}

impl Incident {
    /// Builds an incident and derives its calendar fields.
    #[must_use]
    pub fn new(
        parsed_date: NaiveDateTime,
        primary_type: String,
        location_description: String,
        arrest: bool,
        latitude: f64,
        longitude: f64,
        location: Coordinates,
    ) -> Self {
        Self {
            week_of_year: parsed_date.iso_week().week(),
            month_of_year: parsed_date.month(),
            parsed_date,
            primary_type,
            location_description,
            arrest,
            latitude,
            longitude,
            location,
            shift: None,
            category_code: None,
        }
    }

    /// Shift bucket for this incident's hour of day.
    #[must_use]
    pub fn derived_shift(&self) -> Shift {
        Shift::from_hour(self.parsed_date.hour())
    }

    /// Returns the value of `column` for this incident.
    #[must_use]
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::ParsedDate => Cell::Timestamp(self.parsed_date),
            Column::PrimaryType => Cell::Text(self.primary_type.clone()),
            Column::LocationDescription => Cell::Text(self.location_description.clone()),
            Column::Arrest => Cell::Bool(self.arrest),
            Column::Latitude => Cell::Float(self.latitude),
            Column::Longitude => Cell::Float(self.longitude),
            Column::Location => Cell::Coordinates(self.location),
            Column::WeekOfYear => Cell::Integer(i64::from(self.week_of_year)),
            Column::MonthOfYear => Cell::Integer(i64::from(self.month_of_year)),
            Column::Shift => self
                .shift
                .map_or(Cell::Null, |s| Cell::Integer(i64::from(s.value()))),
            Column::CategoryCode => self
                .category_code
                .map_or(Cell::Null, |c| Cell::Integer(i64::from(c.0))),
        }
    }
}
