//! Disagreements between the export and the scrape, queued for human review.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// An export ID with no matching scraped node.
    CsvNotInUi,
    /// A scraped node that looked completable but claimed no export ID.
    UiNotMatched,
    /// No scrape at all for a badge+year.
    BadgeNotAccessible,
    /// More than one export ID matched a scraped node equally well.
    AmbiguousMatch,
    /// A scraped year with no export counterpart.
    VersionMismatch,
}

impl DiscrepancyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CsvNotInUi => "csv_not_in_ui",
            Self::UiNotMatched => "ui_not_matched",
            Self::BadgeNotAccessible => "badge_not_accessible",
            Self::AmbiguousMatch => "ambiguous_match",
            Self::VersionMismatch => "version_mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    #[serde(rename = "type")]
    pub kind: DiscrepancyKind,
    pub badge_name: String,
    pub version_year: u16,
    pub scoutbook_id: Option<String>,
    pub description: String,
    pub suggested_action: String,
}

impl Discrepancy {
    pub fn csv_not_in_ui(badge_name: &str, version_year: u16, scoutbook_id: &str) -> Self {
        Self {
            kind: DiscrepancyKind::CsvNotInUi,
            badge_name: badge_name.to_string(),
            version_year,
            scoutbook_id: Some(scoutbook_id.to_string()),
            description: format!(
                "Requirement ID {scoutbook_id:?} is in the advancement export but no scraped requirement matched it"
            ),
            suggested_action:
                "Check whether the scrape is complete or the ID format changed for this version"
                    .to_string(),
        }
    }

    pub fn badge_not_accessible(badge_name: &str, version_year: u16) -> Self {
        Self {
            kind: DiscrepancyKind::BadgeNotAccessible,
            badge_name: badge_name.to_string(),
            version_year,
            scoutbook_id: None,
            description: format!("No scraped requirements for {badge_name} {version_year}"),
            suggested_action:
                "Scrape this badge version; requirements were emitted flat with empty descriptions"
                    .to_string(),
        }
    }

    pub fn ui_not_matched(badge_name: &str, version_year: u16, label: &str, placeholder: &str) -> Self {
        Self {
            kind: DiscrepancyKind::UiNotMatched,
            badge_name: badge_name.to_string(),
            version_year,
            scoutbook_id: Some(placeholder.to_string()),
            description: format!(
                "Scraped requirement {label:?} has a checkbox but matched no export ID"
            ),
            suggested_action: "Confirm whether this item is completable and find its export ID"
                .to_string(),
        }
    }

    pub fn ambiguous_match(
        badge_name: &str,
        version_year: u16,
        label: &str,
        chosen: &str,
        alternatives: &[&str],
    ) -> Self {
        Self {
            kind: DiscrepancyKind::AmbiguousMatch,
            badge_name: badge_name.to_string(),
            version_year,
            scoutbook_id: Some(chosen.to_string()),
            description: format!(
                "Scraped requirement {label:?} matched {chosen:?}; also matched {}",
                alternatives.join(", ")
            ),
            suggested_action: "Verify the chosen ID against the requirement text".to_string(),
        }
    }

    pub fn version_mismatch(badge_name: &str, version_year: u16, export_years: &[u16]) -> Self {
        let years: Vec<String> = export_years.iter().map(|y| y.to_string()).collect();
        Self {
            kind: DiscrepancyKind::VersionMismatch,
            badge_name: badge_name.to_string(),
            version_year,
            scoutbook_id: None,
            description: format!(
                "Scraped version {version_year} has no export entry; export has {}",
                years.join(", ")
            ),
            suggested_action: "Check the version year recorded by the scraper".to_string(),
        }
    }
}

/// Aggregated discrepancies for one merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    pub generated_at: DateTime<Utc>,
    pub total_discrepancies: usize,
    pub by_type: BTreeMap<DiscrepancyKind, usize>,
    pub discrepancies: Vec<Discrepancy>,
}

impl DiscrepancyReport {
    pub fn new(generated_at: DateTime<Utc>, discrepancies: Vec<Discrepancy>) -> Self {
        let mut by_type = BTreeMap::new();
        for d in &discrepancies {
            *by_type.entry(d.kind).or_insert(0) += 1;
        }
        Self {
            generated_at,
            total_discrepancies: discrepancies.len(),
            by_type,
            discrepancies,
        }
    }

    pub fn count(&self, kind: DiscrepancyKind) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }
}
