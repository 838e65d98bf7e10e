//! Field-level parsing for raw incident rows.
//!
//! Every parser returns `None` for values that should be treated as
//! missing, so callers can drop the row the same way they drop empty fields.

use chrono::NaiveDateTime;

/// Date layouts accepted for the `Date` column, tried in order.
///
/// The first is the City of Chicago portal export, the ISO variants come
/// from the Socrata API, and the last is the layout this tool writes.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses an incident timestamp in any of the [`DATE_FORMATS`].
#[must_use]
pub fn parse_incident_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a boolean flag such as the `Arrest` column (`True`, `false`, ...).
#[must_use]
pub fn parse_flag(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses a finite floating point field.
#[must_use]
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Returns the trimmed field, or `None` when it is empty.
#[must_use]
pub fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
