//! Latitude/longitude pairs and the parser for Chicago's `Location` column.
//!
//! The column holds text such as `"(41.864073157, -87.706818608)"`. It is
//! parsed structurally: one optional pair of parentheses, exactly one comma,
//! two finite numbers within WGS84 bounds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Errors produced while parsing a coordinate pair from text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationParseError {
    /// The field was empty after trimming.
    #[error("empty location")]
    Empty,

    /// Only one of the enclosing parentheses was present.
    #[error("unbalanced parentheses in location '{input}'")]
    Unbalanced {
        /// The offending text.
        input: String,
    },

    /// The text did not split into exactly two comma-separated parts.
    #[error("expected 2 comma-separated values in location '{input}', found {parts}")]
    Arity {
        /// The offending text.
        input: String,
        /// How many parts were found.
        parts: usize,
    },

    /// One of the two parts was not a finite number.
    #[error("'{part}' in location '{input}' is not a finite number")]
    NotANumber {
        /// The offending text.
        input: String,
        /// The part that failed to parse.
        part: String,
    },

    /// The pair parsed but lies outside latitude/longitude bounds.
    #[error("location ({latitude}, {longitude}) is out of range")]
    OutOfRange {
        /// Parsed latitude.
        latitude: f64,
        /// Parsed longitude.
        longitude: f64,
    },
}

impl FromStr for Coordinates {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LocationParseError::Empty);
        }

        let inner = match (trimmed.strip_prefix('('), trimmed.ends_with(')')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => trimmed,
            _ => {
                return Err(LocationParseError::Unbalanced {
                    input: trimmed.to_string(),
                });
            }
        };

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let [lat, lng] = parts.as_slice() else {
            return Err(LocationParseError::Arity {
                input: trimmed.to_string(),
                parts: parts.len(),
            });
        };

        let latitude = parse_component(trimmed, lat)?;
        let longitude = parse_component(trimmed, lng)?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationParseError::OutOfRange {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

fn parse_component(input: &str, part: &str) -> Result<f64, LocationParseError> {
    part.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LocationParseError::NotANumber {
            input: input.to_string(),
            part: part.to_string(),
        })
}

/// `(lat, lon)` using the shortest representation that parses back to the
/// same `f64`.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl Serialize for Coordinates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
