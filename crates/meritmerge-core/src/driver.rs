//! Top-level merge: pair every export badge version with its scrape.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::MergeConfig;
use crate::discrepancy::{Discrepancy, DiscrepancyReport};
use crate::merge::merge_version;
use crate::model::{
    CanonicalBadge, CanonicalOutput, CsvBadgeVersion, CsvExtraction, ScrapedBadgeVersion,
    ScrapedExtraction, badge_code,
};

/// Everything one merge run produced.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Alphabetical by name; versions newest first.
    pub badges: Vec<CanonicalBadge>,
    pub discrepancies: Vec<Discrepancy>,
}

impl MergeOutcome {
    /// Stamp the outcome into the two serialisable output documents.
    pub fn into_outputs(
        self,
        generated_at: DateTime<Utc>,
        config: &MergeConfig,
    ) -> (CanonicalOutput, DiscrepancyReport) {
        let output = CanonicalOutput {
            generated_at,
            source: config.source.clone(),
            merit_badges: self.badges,
        };
        let report = DiscrepancyReport::new(generated_at, self.discrepancies);
        (output, report)
    }
}

/// Lookup key shared by both inputs: lowercase name and year.
fn version_key(name: &str, year: u16) -> String {
    format!("{}:{}", name.trim().to_lowercase(), year)
}

/// Export entries grouped by lowercase badge name, years merged.
struct BadgeGroup<'a> {
    name: &'a str,
    versions: BTreeMap<u16, CsvBadgeVersion>,
}

fn group_csv(csv: &CsvExtraction) -> BTreeMap<String, BadgeGroup<'_>> {
    let mut groups: BTreeMap<String, BadgeGroup<'_>> = BTreeMap::new();
    for entry in &csv.badges {
        let key = entry.badge_name.trim().to_lowercase();
        let group = groups.entry(key).or_insert_with(|| BadgeGroup {
            name: entry.badge_name.trim(),
            versions: BTreeMap::new(),
        });
        match group.versions.get_mut(&entry.version_year) {
            Some(existing) => {
                warn!(
                    badge = %entry.badge_name,
                    year = entry.version_year,
                    "duplicate export entry; merging requirement IDs"
                );
                for id in &entry.requirement_ids {
                    if !existing.requirement_ids.contains(id) {
                        existing.requirement_ids.push(id.clone());
                    }
                }
                existing.total_occurrences += entry.total_occurrences;
            }
            None => {
                group.versions.insert(entry.version_year, entry.clone());
            }
        }
    }
    groups
}

fn index_scraped(scraped: Option<&ScrapedExtraction>) -> HashMap<String, &ScrapedBadgeVersion> {
    let mut index = HashMap::new();
    for version in scraped.map(|s| s.badges.as_slice()).unwrap_or_default() {
        let key = version_key(&version.badge_name, version.version_year);
        if index.contains_key(&key) {
            warn!(key = %key, "duplicate scraped badge version; keeping the first");
            continue;
        }
        index.insert(key, version);
    }
    index
}

/// Merge the export with the scrape (if any) into the canonical catalog.
pub fn merge(
    csv: &CsvExtraction,
    scraped: Option<&ScrapedExtraction>,
    config: &MergeConfig,
) -> MergeOutcome {
    let groups = group_csv(csv);
    let scraped_index = index_scraped(scraped);
    let mut paired: HashSet<String> = HashSet::new();

    let mut badges = Vec::with_capacity(groups.len());
    let mut discrepancies = Vec::new();

    for group in groups.values() {
        let mut versions = Vec::with_capacity(group.versions.len());
        for (year, csv_version) in group.versions.iter().rev() {
            let key = version_key(group.name, *year);
            let scraped_version = scraped_index.get(&key).copied();
            if scraped_version.is_some() {
                paired.insert(key);
            }
            let merged = merge_version(csv_version, scraped_version, config);
            versions.push(merged.version);
            discrepancies.extend(merged.discrepancies);
        }

        badges.push(CanonicalBadge {
            code: badge_code(group.name),
            name: group.name.to_string(),
            category: config.category(group.name).map(String::from),
            is_eagle_required: config.is_eagle_required(group.name),
            is_active: true,
            versions,
        });
    }

    // Scraped years with no export entry, for badges the export does know.
    if let Some(scraped) = scraped {
        for version in &scraped.badges {
            let key = version_key(&version.badge_name, version.version_year);
            if paired.contains(&key) {
                continue;
            }
            let name_key = version.badge_name.trim().to_lowercase();
            match groups.get(&name_key) {
                Some(group) => {
                    let years: Vec<u16> = group.versions.keys().rev().copied().collect();
                    discrepancies.push(Discrepancy::version_mismatch(
                        group.name,
                        version.version_year,
                        &years,
                    ));
                    paired.insert(key);
                }
                None => info!(
                    badge = %version.badge_name,
                    year = version.version_year,
                    "scraped badge not in export; skipped"
                ),
            }
        }
    }

    info!(
        badges = badges.len(),
        discrepancies = discrepancies.len(),
        "merge complete"
    );

    MergeOutcome {
        badges,
        discrepancies,
    }
}
