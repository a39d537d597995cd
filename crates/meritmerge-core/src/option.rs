//! Option-context tracking over the scraped requirement list.
//!
//! Some badges split a main requirement into options ("Avian Option",
//! "Option A—Canoeing") announced by an unlabelled header row. Export IDs
//! under an option carry its name (`"6a avian"`, `"5b Opt B"`), so the
//! matcher needs to know which option is open. The tracker is a linear
//! scan with no backtracking: a scrape that omits the next main
//! requirement number leaves the previous option open.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::label::{LabelKind, classify};
use crate::model::ScrapedRequirement;

/// Ordered `(phrase, canonical short form)` pairs; first hit wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionVocabulary {
    pub entries: Vec<(String, String)>,
}

const DEFAULT_OPTIONS: &[(&str, &str)] = &[
    ("air rifle", "air rifle"),
    ("muzzleloading rifle", "muzzleloader"),
    ("muzzleloader", "muzzleloader"),
    ("modern rifle", "rifle"),
    ("rifle", "rifle"),
    ("shotgun", "shotgun"),
    ("canoeing", "canoe"),
    ("canoe", "canoe"),
    ("kayaking", "kayak"),
    ("kayak", "kayak"),
    ("rowing", "rowing"),
    ("sailing", "sailing"),
    ("avian", "avian"),
    ("mammal", "mammal"),
    ("reptile", "reptile"),
    ("amphibian", "amphibian"),
    ("insect", "insect"),
    ("fish", "fish"),
    ("bird", "bird"),
    ("wood", "wood"),
    ("metal", "metal"),
    ("leather", "leather"),
    ("plastics", "plastics"),
    ("ceramics", "ceramics"),
    ("clay", "clay"),
    ("backpacking", "backpacking"),
    ("hiking", "hiking"),
    ("cycling", "cycling"),
    ("swimming", "swimming"),
    ("skiing", "skiing"),
    ("snowboarding", "snowboarding"),
];

impl Default for OptionVocabulary {
    fn default() -> Self {
        Self {
            entries: DEFAULT_OPTIONS
                .iter()
                .map(|(p, s)| (p.to_string(), s.to_string()))
                .collect(),
        }
    }
}

fn lettered_option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\boption\s+([a-z])\b").expect("lettered option regex must compile")
    })
}

fn named_option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([a-z0-9]+)\s+option\b").expect("named option regex must compile")
    })
}

impl OptionVocabulary {
    /// Recognise an option header description, returning the option's short form.
    ///
    /// Vocabulary phrases are matched on word boundaries. Failing that,
    /// `"Option B"` maps to `"opt b"` and `"<Word> Option"` to `"<word>"`.
    pub fn detect(&self, description: &str) -> Option<String> {
        let lower = description.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let padded = format!(" {} ", words.join(" "));

        for (phrase, short) in &self.entries {
            if padded.contains(&format!(" {} ", phrase.to_lowercase())) {
                return Some(short.clone());
            }
        }

        if let Some(caps) = lettered_option_re().captures(&padded) {
            return Some(format!("opt {}", &caps[1]));
        }

        named_option_re()
            .captures(&padded)
            .map(|caps| caps[1].to_string())
    }
}

/// Where in the conceptual outline the scan currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyPosition {
    pub main_req: Option<String>,
    pub option: Option<String>,
    /// Letter of the open lettered item under `main_req`.
    pub section: Option<char>,
}

impl HierarchyPosition {
    /// Parent context the matcher composes with `kind`'s label.
    ///
    /// A scraped parent wins. Numbered sub-items under an open lettered
    /// item get that letter appended, so `"(1)"` after `"(a)"` under `"4"`
    /// composes as `"4a"` + `"1"`. Main numbers and composite labels
    /// carry their own position and get no parent from the tracker.
    pub fn parent_context(&self, scraped_parent: Option<&str>, kind: &LabelKind) -> Option<String> {
        let scraped_parent = scraped_parent.map(str::trim).filter(|p| !p.is_empty());
        let parent = match scraped_parent {
            Some(p) => p,
            None if matches!(kind, LabelKind::MainNumber(_) | LabelKind::Composite { .. }) => {
                return None;
            }
            None => self.main_req.as_deref()?,
        };

        match (kind, self.section) {
            (LabelKind::SubIndex(_), Some(section)) if self.main_req.as_deref() == Some(parent) => {
                Some(format!("{parent}{section}"))
            }
            _ => Some(parent.to_string()),
        }
    }
}

/// What observing one item did to the option context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionTransition {
    Entered(String),
    Reset,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct OptionTracker {
    position: HierarchyPosition,
}

impl OptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &HierarchyPosition {
        &self.position
    }

    pub fn current_option(&self) -> Option<&str> {
        self.position.option.as_deref()
    }

    /// Advance over the next scraped item in document order.
    pub fn observe(
        &mut self,
        item: &ScrapedRequirement,
        vocabulary: &OptionVocabulary,
    ) -> OptionTransition {
        match classify(&item.display_label) {
            LabelKind::Empty => match vocabulary.detect(&item.description) {
                Some(name) => {
                    self.position.option = Some(name.clone());
                    self.position.section = None;
                    OptionTransition::Entered(name)
                }
                None => OptionTransition::Unchanged,
            },
            LabelKind::MainNumber(n) => {
                let had_option = self.position.option.is_some();
                self.position = HierarchyPosition {
                    main_req: Some(n.to_string()),
                    ..HierarchyPosition::default()
                };
                if had_option {
                    OptionTransition::Reset
                } else {
                    OptionTransition::Unchanged
                }
            }
            LabelKind::Letter(letter) => {
                self.position.section = Some(letter);
                OptionTransition::Unchanged
            }
            LabelKind::Composite { main, letter, .. } => {
                self.position.main_req = Some(main.to_string());
                self.position.section = Some(letter);
                OptionTransition::Unchanged
            }
            LabelKind::SubIndex(_) | LabelKind::Other => OptionTransition::Unchanged,
        }
    }
}
