//! Merge configuration: lookup tables passed explicitly to the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::option::OptionVocabulary;

pub const DEFAULT_SOURCE: &str = "scoutbook-csv+ui-scrape";

/// Badges required for the Eagle rank.
pub const EAGLE_REQUIRED: &[&str] = &[
    "Camping",
    "Citizenship in Society",
    "Citizenship in the Community",
    "Citizenship in the Nation",
    "Citizenship in the World",
    "Communication",
    "Cooking",
    "Cycling",
    "Emergency Preparedness",
    "Environmental Science",
    "Family Life",
    "First Aid",
    "Hiking",
    "Lifesaving",
    "Personal Fitness",
    "Personal Management",
    "Sustainability",
    "Swimming",
];

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub options: OptionVocabulary,
    pub eagle_required: Vec<String>,
    /// badge name → category
    pub categories: BTreeMap<String, String>,
    /// Recorded as `source` in the canonical output.
    pub source: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            options: OptionVocabulary::default(),
            eagle_required: EAGLE_REQUIRED.iter().map(|s| s.to_string()).collect(),
            categories: BTreeMap::new(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl MergeConfig {
    pub fn is_eagle_required(&self, badge_name: &str) -> bool {
        self.eagle_required
            .iter()
            .any(|b| b.eq_ignore_ascii_case(badge_name.trim()))
    }

    pub fn category(&self, badge_name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(badge_name.trim()))
            .map(|(_, category)| category.as_str())
    }

    /// Apply a catalog file's overrides on top of this configuration.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        if let Some(eagle) = catalog.eagle_required {
            self.eagle_required = eagle;
        }
        self.categories.extend(catalog.categories);
        if let Some(options) = catalog.options {
            self.options = options;
        }
        self
    }
}

/// Optional badge catalog overrides, loaded from JSON.
///
/// `{"eagle_required": [...], "categories": {"Camping": "Outdoor"}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub eagle_required: Option<Vec<String>>,
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    #[serde(default)]
    pub options: Option<OptionVocabulary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eagle_lookup_is_case_insensitive() {
        let config = MergeConfig::default();
        assert!(config.is_eagle_required("camping"));
        assert!(config.is_eagle_required("First Aid "));
        assert!(!config.is_eagle_required("Archery"));
    }

    #[test]
    fn catalog_overrides() {
        let catalog: Catalog = serde_json::from_str(
            r#"{"eagle_required": ["Archery"], "categories": {"Archery": "Sports"}}"#,
        )
        .unwrap();
        let config = MergeConfig::default().with_catalog(catalog);
        assert!(config.is_eagle_required("Archery"));
        assert!(!config.is_eagle_required("Camping"));
        assert_eq!(config.category("archery"), Some("Sports"));
        assert_eq!(config.category("Camping"), None);
    }

    #[test]
    fn empty_catalog_keeps_defaults() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        let config = MergeConfig::default().with_catalog(catalog);
        assert!(config.is_eagle_required("Swimming"));
        assert_eq!(config.options, OptionVocabulary::default());
    }
}
