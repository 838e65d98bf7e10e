//! Category ranking and the category code assignment.

use std::collections::BTreeMap;

use crime_samples_incident_models::{CategoryCode, Incident};

/// One `Primary Type` with its frequency in the ranked population.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub name: String,
    pub count: u64,
    /// Share of the population covered by this category and every
    /// category ranked above it, in `0.0..=1.0`.
    pub cumulative_share: f64,
}

/// Ranks every category by frequency, most frequent first. Ties are broken
/// by name so the ranking does not depend on row order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rank_categories<'a>(incidents: impl IntoIterator<Item = &'a Incident>) -> Vec<CategoryShare> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut total: u64 = 0;
    for incident in incidents {
        *counts.entry(incident.primary_type.as_str()).or_insert(0) += 1;
        total += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    // BTreeMap order is by name, and sort_by is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut running: u64 = 0;
    ranked
        .into_iter()
        .map(|(name, count)| {
            running += count;
            CategoryShare {
                name: name.to_string(),
                count,
                cumulative_share: running as f64 / total as f64,
            }
        })
        .collect()
}

/// The retained top-k categories. A category's code is its rank, so codes
/// run `0..k` with no gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryIndex {
    categories: Vec<CategoryShare>,
}

impl CategoryIndex {
    /// Keeps the first `k` entries of a ranking from [`rank_categories`].
    /// Codes are `u8`, so at most 256 categories are retained.
    #[must_use]
    pub fn top(mut ranked: Vec<CategoryShare>, k: usize) -> Self {
        ranked.truncate(k.min(usize::from(u8::MAX) + 1));
        Self { categories: ranked }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Code of `name`, or `None` when it is not retained.
    #[must_use]
    pub fn code(&self, name: &str) -> Option<CategoryCode> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| u8::try_from(i).ok())
            .map(CategoryCode)
    }

    #[must_use]
    pub fn name(&self, code: CategoryCode) -> Option<&str> {
        self.categories.get(code.index()).map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.code(name).is_some()
    }

    /// Retained category names in code order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    #[must_use]
    pub fn shares(&self) -> &[CategoryShare] {
        &self.categories
    }

    /// Cumulative share covered by the retained categories.
    #[must_use]
    pub fn coverage(&self) -> f64 {
        self.categories.last().map_or(0.0, |c| c.cumulative_share)
    }
}
