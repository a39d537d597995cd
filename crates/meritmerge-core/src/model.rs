//! Input and output shapes for the reconciliation pipeline.
//!
//! Inputs use the camelCase field names produced by the extraction and
//! scraping scripts; outputs use the snake_case names the seeding step
//! expects.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid version year: {0:?}")]
    InvalidYear(String),
}

// ── Inputs ──

/// Requirement IDs pulled from the advancement export, one entry per badge+year.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExtraction {
    /// ISO 8601 timestamp string.
    #[serde(default)]
    pub generated_at: Option<String>,
    pub badges: Vec<CsvBadgeVersion>,
}

/// The authoritative requirement IDs for one badge version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvBadgeVersion {
    pub badge_name: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub version_year: u16,
    pub requirement_ids: Vec<String>,
    #[serde(default)]
    pub total_occurrences: usize,
}

impl CsvBadgeVersion {
    /// Build a version entry, dropping repeated IDs while keeping first-seen order.
    pub fn new(
        badge_name: impl Into<String>,
        version_year: u16,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut requirement_ids: Vec<String> = Vec::new();
        let mut total_occurrences = 0;
        for id in ids {
            let id = id.into();
            total_occurrences += 1;
            if !requirement_ids.contains(&id) {
                requirement_ids.push(id);
            }
        }
        Self {
            badge_name: badge_name.into(),
            version_year,
            requirement_ids,
            total_occurrences,
        }
    }

    /// IDs with repeats removed, in first-seen order.
    pub fn unique_ids(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.requirement_ids.len());
        for id in &self.requirement_ids {
            let id = id.trim();
            if !id.is_empty() && !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

/// Result of scraping the requirement pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedExtraction {
    pub badges: Vec<ScrapedBadgeVersion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedBadgeVersion {
    pub badge_name: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub version_year: u16,
    pub requirements: Vec<ScrapedRequirement>,
}

/// One visually rendered requirement node, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedRequirement {
    #[serde(default)]
    pub display_label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_number: Option<String>,
    #[serde(default)]
    pub visual_depth: u32,
    #[serde(default)]
    pub has_checkbox: bool,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

// ── Outputs ──

/// A node of the reconciled requirement tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRequirement {
    /// Authoritative ID, or a synthesized `header_<parent>_<label>` placeholder.
    pub scoutbook_id: String,
    pub requirement_number: String,
    pub description: String,
    pub is_header: bool,
    pub display_order: u32,
    pub parent_scoutbook_id: Option<String>,
    pub links: Vec<Link>,
    pub children: Vec<CanonicalRequirement>,
}

impl CanonicalRequirement {
    /// Depth-first iterator over this node and all of its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &CanonicalRequirement> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalVersion {
    pub version_year: u16,
    pub requirements: Vec<CanonicalRequirement>,
}

impl CanonicalVersion {
    /// Every node in document order.
    pub fn all_requirements(&self) -> Vec<&CanonicalRequirement> {
        self.requirements.iter().flat_map(|r| r.walk()).collect()
    }

    pub fn find(&self, scoutbook_id: &str) -> Option<&CanonicalRequirement> {
        self.requirements
            .iter()
            .flat_map(|r| r.walk())
            .find(|r| r.scoutbook_id == scoutbook_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBadge {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub is_eagle_required: bool,
    pub is_active: bool,
    /// Newest first.
    pub versions: Vec<CanonicalVersion>,
}

/// The full reconciled badge catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalOutput {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub merit_badges: Vec<CanonicalBadge>,
}

impl CanonicalOutput {
    /// Case-insensitive lookup by badge name.
    pub fn badge(&self, name: &str) -> Option<&CanonicalBadge> {
        self.merit_badges
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

/// URL-safe badge code: lowercase, non-alphanumeric runs collapsed to `-`.
pub fn badge_code(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

// ── Years ──

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{4}").expect("year regex must compile"))
}

/// Parse a version year from strings like `"2025"` or `"2025 Version"`.
///
/// Takes the first four consecutive ASCII digits.
pub fn parse_year(s: &str) -> Result<u16, ModelError> {
    year_re()
        .find(s)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ModelError::InvalidYear(s.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYear {
    Number(u16),
    Text(String),
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match RawYear::deserialize(deserializer)? {
        RawYear::Number(n) => Ok(n),
        RawYear::Text(s) => parse_year(&s).map_err(serde::de::Error::custom),
    }
}
