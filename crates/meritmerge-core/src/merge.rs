//! Merge one badge version: export IDs against the scraped requirement list.
//!
//! The walk visits scraped items in document order. Each item is matched
//! against the export IDs not yet consumed; a matched item becomes a
//! completable leaf carrying the export ID, an unmatched one becomes a
//! header with a synthesized placeholder ID. Nothing here fails: anything
//! unresolved is returned as a [`Discrepancy`].

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::discrepancy::Discrepancy;
use crate::hierarchy::{self, FlatRequirement};
use crate::identifier::{MatchStrategy, match_strategy, normalize};
use crate::label::classify;
use crate::model::{CanonicalVersion, CsvBadgeVersion, ScrapedBadgeVersion};
use crate::option::OptionTracker;

/// Result of merging one badge version.
#[derive(Debug, Clone)]
pub struct VersionMerge {
    pub version: CanonicalVersion,
    /// Per-item findings in document order, then `csv_not_in_ui` in export order.
    pub discrepancies: Vec<Discrepancy>,
}

struct Candidate<'a> {
    index: usize,
    strategy: MatchStrategy,
    alternatives: Vec<&'a str>,
}

/// Merge an export version with its scrape, if there is one.
pub fn merge_version(
    csv: &CsvBadgeVersion,
    scraped: Option<&ScrapedBadgeVersion>,
    config: &MergeConfig,
) -> VersionMerge {
    match scraped {
        Some(scraped) => merge_scraped(csv, scraped, config),
        None => merge_unscraped(csv),
    }
}

/// No scrape: emit the export IDs flat, in export order, with empty descriptions.
fn merge_unscraped(csv: &CsvBadgeVersion) -> VersionMerge {
    warn!(
        badge = %csv.badge_name,
        year = csv.version_year,
        "no scraped data; emitting flat requirements"
    );
    let items: Vec<FlatRequirement> = csv
        .unique_ids()
        .into_iter()
        .enumerate()
        .map(|(i, id)| FlatRequirement {
            scoutbook_id: id.to_string(),
            requirement_number: id.to_string(),
            description: String::new(),
            is_header: false,
            display_order: i as u32 + 1,
            links: Vec::new(),
        })
        .collect();

    VersionMerge {
        version: CanonicalVersion {
            version_year: csv.version_year,
            requirements: hierarchy::flat(&items),
        },
        discrepancies: vec![Discrepancy::badge_not_accessible(
            &csv.badge_name,
            csv.version_year,
        )],
    }
}

fn merge_scraped(
    csv: &CsvBadgeVersion,
    scraped: &ScrapedBadgeVersion,
    config: &MergeConfig,
) -> VersionMerge {
    let badge = csv.badge_name.as_str();
    let year = csv.version_year;

    let ids = csv.unique_ids();
    let mut consumed = vec![false; ids.len()];
    let mut tracker = OptionTracker::new();
    let mut used_ids: HashSet<String> = ids.iter().map(|id| id.to_string()).collect();
    let mut items: Vec<FlatRequirement> = Vec::with_capacity(scraped.requirements.len());
    let mut discrepancies = Vec::new();

    for (index, req) in scraped.requirements.iter().enumerate() {
        tracker.observe(req, &config.options);

        let label = req.display_label.trim();
        let kind = classify(label);
        let parent = tracker
            .position()
            .parent_context(req.parent_number.as_deref(), &kind);
        let parent = parent.as_deref();
        let option = tracker.current_option();
        let display_order = index as u32 + 1;

        let candidate = if label.is_empty() {
            None
        } else {
            find_candidate(&ids, &consumed, label, parent, option)
        };

        match candidate {
            Some(found) => {
                let id = ids[found.index];
                consumed[found.index] = true;
                debug!(badge, year, label, id, strategy = ?found.strategy, "matched");
                if !found.alternatives.is_empty() {
                    discrepancies.push(Discrepancy::ambiguous_match(
                        badge,
                        year,
                        label,
                        id,
                        &found.alternatives,
                    ));
                }
                items.push(FlatRequirement {
                    scoutbook_id: id.to_string(),
                    requirement_number: label.to_string(),
                    description: req.description.clone(),
                    is_header: false,
                    display_order,
                    links: req.links.clone(),
                });
            }
            None => {
                let placeholder = header_id(parent, label, index, &mut used_ids);
                debug!(badge, year, label, id = %placeholder, "header");
                if req.has_checkbox {
                    discrepancies.push(Discrepancy::ui_not_matched(badge, year, label, &placeholder));
                }
                items.push(FlatRequirement {
                    scoutbook_id: placeholder,
                    requirement_number: label.to_string(),
                    description: req.description.clone(),
                    is_header: true,
                    display_order,
                    links: req.links.clone(),
                });
            }
        }
    }

    let mut unmatched = 0usize;
    for (id, used) in ids.iter().zip(&consumed) {
        if !used {
            unmatched += 1;
            discrepancies.push(Discrepancy::csv_not_in_ui(badge, year, id));
        }
    }

    info!(
        badge,
        year,
        items = items.len(),
        matched = ids.len() - unmatched,
        unmatched,
        "merged badge version"
    );

    VersionMerge {
        version: CanonicalVersion {
            version_year: year,
            requirements: hierarchy::build(&items),
        },
        discrepancies,
    }
}

/// Best outstanding ID for a label: lowest strategy wins, ties go to export order.
fn find_candidate<'a>(
    ids: &[&'a str],
    consumed: &[bool],
    label: &str,
    parent: Option<&str>,
    option: Option<&str>,
) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;

    for (index, &id) in ids.iter().enumerate() {
        if consumed[index] {
            continue;
        }
        let Some(strategy) = match_strategy(id, label, parent, option) else {
            continue;
        };
        let replace = match &best {
            None => true,
            Some(current) => strategy < current.strategy,
        };
        if replace {
            best = Some(Candidate {
                index,
                strategy,
                alternatives: Vec::new(),
            });
        } else if let Some(current) = best.as_mut()
            && current.strategy == strategy
        {
            current.alternatives.push(id);
        }
    }

    best
}

/// Deterministic placeholder: `header_<parent>_<label>`, or the item index
/// when there is no label. Collisions get the index appended.
fn header_id(
    parent: Option<&str>,
    label: &str,
    index: usize,
    used: &mut HashSet<String>,
) -> String {
    let parent = parent.map(slug).filter(|p| !p.is_empty());
    let parent = parent.as_deref().unwrap_or("root");
    let label = slug(label);
    let base = if label.is_empty() {
        format!("header_{parent}_{index}")
    } else {
        format!("header_{parent}_{label}")
    };
    let id = if used.contains(&base) {
        format!("{base}_{index}")
    } else {
        base
    };
    used.insert(id.clone());
    id
}

fn slug(s: &str) -> String {
    normalize(s).replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrepancy::DiscrepancyKind;
    use crate::model::ScrapedRequirement;

    fn req(label: &str, parent: Option<&str>, description: &str) -> ScrapedRequirement {
        ScrapedRequirement {
            display_label: label.into(),
            description: description.into(),
            parent_number: parent.map(String::from),
            ..Default::default()
        }
    }

    fn scraped(name: &str, year: u16, requirements: Vec<ScrapedRequirement>) -> ScrapedBadgeVersion {
        ScrapedBadgeVersion {
            badge_name: name.into(),
            version_year: year,
            requirements,
        }
    }

    fn kinds(merge: &VersionMerge) -> Vec<DiscrepancyKind> {
        merge.discrepancies.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn unscraped_version_is_flat() {
        let csv = CsvBadgeVersion::new("Cooking", 2024, ["1", "2a", "2b", "3"]);
        let merge = merge_version(&csv, None, &MergeConfig::default());

        let ids: Vec<&str> = merge
            .version
            .requirements
            .iter()
            .map(|r| r.scoutbook_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2a", "2b", "3"]);
        assert!(merge.version.requirements.iter().all(|r| r.description.is_empty()));
        assert!(merge.version.requirements.iter().all(|r| !r.is_header));
        assert_eq!(kinds(&merge), vec![DiscrepancyKind::BadgeNotAccessible]);
    }

    #[test]
    fn matched_items_are_leaves_and_unmatched_are_headers() {
        let csv = CsvBadgeVersion::new("Camping", 2025, ["1", "2a", "2b"]);
        let s = scraped(
            "Camping",
            2025,
            vec![
                req("1", None, "Do the following"),
                req("2", None, "Do the following"),
                req("(a)", Some("2"), "Pitch a tent"),
                req("(b)", Some("2"), "Cook a meal"),
            ],
        );
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());

        assert!(merge.discrepancies.is_empty(), "{:?}", merge.discrepancies);
        let roots = &merge.version.requirements;
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].scoutbook_id, "1");
        assert!(!roots[0].is_header);
        assert!(roots[1].is_header);
        assert_eq!(roots[1].scoutbook_id, "header_root_2");
        let children: Vec<&str> = roots[1].children.iter().map(|c| c.scoutbook_id.as_str()).collect();
        assert_eq!(children, vec!["2a", "2b"]);
        assert_eq!(roots[1].children[0].description, "Pitch a tent");
    }

    #[test]
    fn each_id_consumed_once() {
        let csv = CsvBadgeVersion::new("Camping", 2025, ["1"]);
        let s = scraped("Camping", 2025, vec![req("1", None, "First"), req("1", None, "Again")]);
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());

        let all = merge.version.all_requirements();
        assert_eq!(all.iter().filter(|r| r.scoutbook_id == "1").count(), 1);
        assert!(all.iter().any(|r| r.is_header && r.description == "Again"));
    }

    #[test]
    fn unconsumed_ids_reported_after_walk() {
        let csv = CsvBadgeVersion::new("Swimming", 2025, ["1", "5b Opt B"]);
        let mut checkbox = req("9", None, "Stray");
        checkbox.has_checkbox = true;
        let s = scraped(
            "Swimming",
            2025,
            vec![req("1", None, ""), req("5", None, ""), req("(b)", Some("5"), ""), checkbox],
        );
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());
        assert_eq!(
            kinds(&merge),
            vec![DiscrepancyKind::UiNotMatched, DiscrepancyKind::CsvNotInUi]
        );
        assert_eq!(merge.discrepancies[1].scoutbook_id.as_deref(), Some("5b Opt B"));
    }

    #[test]
    fn option_context_enables_option_ids() {
        let csv = CsvBadgeVersion::new("Bird Study", 2025, ["6a avian", "6a mammal"]);
        let s = scraped(
            "Bird Study",
            2025,
            vec![
                req("6", None, "Do ONE option"),
                req("", None, "Avian Option"),
                req("(a)", Some("6"), "Watch birds"),
                req("", None, "Mammal Option"),
                req("(a)", Some("6"), "Watch mammals"),
            ],
        );
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());
        assert!(merge.discrepancies.is_empty(), "{:?}", merge.discrepancies);

        let v = &merge.version;
        assert_eq!(v.find("6a avian").unwrap().description, "Watch birds");
        assert_eq!(v.find("6a mammal").unwrap().description, "Watch mammals");

        let root = &v.requirements[0];
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(|c| c.is_header));
        assert_eq!(root.children[0].children[0].scoutbook_id, "6a avian");
    }

    #[test]
    fn tracked_main_number_stands_in_for_missing_parent() {
        let csv = CsvBadgeVersion::new("Hiking", 2025, ["3a", "3b"]);
        let s = scraped(
            "Hiking",
            2025,
            vec![req("3", None, ""), req("(a)", None, ""), req("(b)", None, "")],
        );
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());
        assert!(merge.discrepancies.is_empty(), "{:?}", merge.discrepancies);
        assert_eq!(merge.version.requirements[0].children.len(), 2);
    }

    #[test]
    fn ambiguous_prefix_match_is_reported() {
        let csv = CsvBadgeVersion::new("Fishing", 2025, ["7a bait", "7a fly"]);
        let s = scraped("Fishing", 2025, vec![req("7a", None, "Catch a fish")]);
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());

        let d = &merge.discrepancies[0];
        assert_eq!(d.kind, DiscrepancyKind::AmbiguousMatch);
        assert_eq!(d.scoutbook_id.as_deref(), Some("7a bait"));
        assert_eq!(merge.discrepancies[1].kind, DiscrepancyKind::CsvNotInUi);
        assert_eq!(merge.discrepancies[1].scoutbook_id.as_deref(), Some("7a fly"));
    }

    #[test]
    fn direct_match_beats_earlier_prefix_match() {
        let csv = CsvBadgeVersion::new("Chess", 2025, ["10a", "10"]);
        let s = scraped("Chess", 2025, vec![req("10", None, "")]);
        let merge = merge_version(&csv, Some(&s), &MergeConfig::default());
        assert!(!merge.version.requirements[0].is_header);
        assert_eq!(merge.version.requirements[0].scoutbook_id, "10");
    }

    #[test]
    fn header_ids_are_unique() {
        let mut used = HashSet::new();
        let a = header_id(Some("6"), "", 3, &mut used);
        let b = header_id(Some("6"), "", 5, &mut used);
        let c = header_id(Some("6"), "(a)", 7, &mut used);
        let d = header_id(Some("6"), "(a)", 9, &mut used);
        assert_eq!(a, "header_6_3");
        assert_eq!(b, "header_6_5");
        assert_eq!(c, "header_6_a");
        assert_eq!(d, "header_6_a_9");
    }

    #[test]
    fn header_id_without_parent() {
        let mut used = HashSet::new();
        assert_eq!(header_id(None, "2", 1, &mut used), "header_root_2");
    }
}
