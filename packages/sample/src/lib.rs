#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory incident frames and the random draws taken from them.
//!
//! ```text
//!   Vec<Incident>
//!        │
//!        ▼
//!   ┌─────────┐   rank_categories ──► CategoryIndex (top k, codes 0..k)
//!   │  Frame  │
//!   └─────────┘
//!        │ select(Selection)        column predicates, projection, sample
//!        ▼
//!   ┌─────────┐
//!   │  Frame  │   derive_features ──► shift, type_
//!   └─────────┘
//!        │
//!        ├──► draw_candidates        L uniform rows
//!        └──► draw_demand            N rows weighted by category frequency
//! ```
//!
//! All randomness comes from the caller's generator.

pub mod categories;
pub mod costs;
pub mod draw;
pub mod features;
pub mod frame;
pub mod selection;

use crime_samples_incident_models::Column;

pub use categories::{CategoryIndex, CategoryShare, rank_categories};
pub use costs::{CostEntry, CostTable};
pub use draw::{CandidateLocation, draw_candidates, draw_demand};
pub use features::derive_features;
pub use frame::{Frame, Row};
pub use selection::{Predicate, Selection};

/// Errors raised while selecting, deriving or drawing rows.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// A predicate or projection names a column the frame does not have.
    #[error("column '{column}' is not present in the frame")]
    UnknownColumn {
        /// The missing column.
        column: Column,
    },

    /// More rows were requested than the population holds.
    #[error("cannot draw {requested} rows from a population of {available}")]
    InsufficientRows {
        /// Rows asked for.
        requested: usize,
        /// Rows available.
        available: usize,
    },

    /// A row's category has no code in the category index.
    #[error("category '{category}' is not among the retained categories")]
    UnknownCategory {
        /// The unmapped `Primary Type`.
        category: String,
    },

    /// The sampling weights could not be used.
    #[error("invalid sampling weights: {0}")]
    InvalidWeights(#[from] rand::distributions::WeightedError),
}
