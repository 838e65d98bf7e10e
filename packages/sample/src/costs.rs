//! Fixed resource cost per crime category.

use serde::{Deserialize, Serialize};

/// Cost of responding to one incident of the default categories, in the
/// order they are written out.
const DEFAULT_COSTS: &[(&str, u32)] = &[
    ("THEFT", 300),
    ("BATTERY", 500),
    ("CRIMINAL DAMAGE", 800),
    ("NARCOTICS", 1_000),
    ("ASSAULT", 500),
];

/// One row of `resource_cost.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
    pub category: String,
    pub cost: u32,
}

/// Ordered category to cost table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    entries: Vec<CostEntry>,
}

impl Default for CostTable {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_COSTS
                .iter()
                .map(|(category, cost)| CostEntry {
                    category: (*category).to_string(),
                    cost: *cost,
                })
                .collect(),
        )
    }
}

impl CostTable {
    #[must_use]
    pub const fn from_entries(entries: Vec<CostEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[CostEntry] {
        &self.entries
    }

    #[must_use]
    pub fn cost(&self, category: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.cost)
    }

    /// Names from `categories` that have no cost entry.
    #[must_use]
    pub fn missing<'a>(&self, categories: &'a [String]) -> Vec<&'a str> {
        categories
            .iter()
            .filter(|c| self.cost(c).is_none())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_costs() {
        let table = CostTable::default();
        assert_eq!(table.cost("THEFT"), Some(300));
        assert_eq!(table.cost("BATTERY"), Some(500));
        assert_eq!(table.cost("CRIMINAL DAMAGE"), Some(800));
        assert_eq!(table.cost("NARCOTICS"), Some(1_000));
        assert_eq!(table.cost("ASSAULT"), Some(500));
        assert_eq!(table.cost("ARSON"), None);
    }

    #[test]
    fn keeps_declaration_order() {
        let table = CostTable::default();
        let names: Vec<&str> = table.entries().iter().map(|e| e.category.as_str()).collect();
        assert_eq!(
            names,
            vec!["THEFT", "BATTERY", "CRIMINAL DAMAGE", "NARCOTICS", "ASSAULT"]
        );
    }

    #[test]
    fn reports_uncosted_categories() {
        let table = CostTable::default();
        let categories = vec!["THEFT".to_string(), "DECEPTIVE PRACTICE".to_string()];
        assert_eq!(table.missing(&categories), vec!["DECEPTIVE PRACTICE"]);
    }
}
