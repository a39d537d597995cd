pub mod config;
pub mod discrepancy;
pub mod driver;
pub mod hierarchy;
pub mod identifier;
pub mod label;
pub mod merge;
pub mod model;
pub mod option;
pub mod sort_key;

pub use config::{Catalog, MergeConfig};
pub use discrepancy::{Discrepancy, DiscrepancyKind, DiscrepancyReport};
pub use driver::{MergeOutcome, merge};
pub use identifier::{MatchStrategy, match_strategy, matches, normalize};
pub use label::{LabelKind, classify};
pub use merge::{VersionMerge, merge_version};
pub use model::{
    CanonicalBadge, CanonicalOutput, CanonicalRequirement, CanonicalVersion, CsvBadgeVersion,
    CsvExtraction, Link, ModelError, ScrapedBadgeVersion, ScrapedExtraction, ScrapedRequirement,
};
pub use option::{HierarchyPosition, OptionTracker, OptionVocabulary};
pub use sort_key::requirement_sort_key;
