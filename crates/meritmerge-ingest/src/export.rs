//! Requirement-ID extraction from the advancement export CSV.
//!
//! The export has one row per recorded advancement item. Merit badge
//! requirement rows carry the badge and requirement ID together in the
//! `Advancement` column (`"Camping #2a"`) and the requirements year in
//! `Version`. Other advancement types are ignored; malformed requirement
//! rows are skipped with a warning.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use meritmerge_core::model::parse_year;
use meritmerge_core::{CsvBadgeVersion, CsvExtraction, requirement_sort_key};
use tracing::{info, warn};

use crate::IngestError;

const TYPE_COLUMN: &str = "advancement type";
const ADVANCEMENT_COLUMN: &str = "advancement";
const VERSION_COLUMN: &str = "version";

const REQUIREMENT_TYPE: &str = "merit badge requirement";

struct Columns {
    kind: usize,
    advancement: usize,
    version: usize,
}

impl Columns {
    fn locate(header: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(IngestError::MissingColumn(name))
        };
        Ok(Self {
            kind: find(TYPE_COLUMN)?,
            advancement: find(ADVANCEMENT_COLUMN)?,
            version: find(VERSION_COLUMN)?,
        })
    }
}

#[derive(Default)]
struct Accum {
    name: String,
    ids: Vec<String>,
    seen: HashSet<String>,
    occurrences: usize,
}

/// Split `"Camping #2a"` into `("Camping", "2a")`.
pub fn split_advancement(advancement: &str) -> Option<(&str, &str)> {
    let (name, id) = advancement.rsplit_once('#')?;
    let (name, id) = (name.trim(), id.trim());
    if name.is_empty() || id.is_empty() {
        return None;
    }
    Some((name, id))
}

/// Parse the export into one [`CsvBadgeVersion`] per badge+year.
///
/// Badges come out alphabetically, years newest first, and each version's
/// IDs in outline order.
pub fn parse_export(text: &str, generated_at: DateTime<Utc>) -> Result<CsvExtraction, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(IngestError::EmptyExport);
    }
    let cols = Columns::locate(&header)?;

    let mut groups: BTreeMap<(String, std::cmp::Reverse<u16>), Accum> = BTreeMap::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "unreadable export row; skipped");
                skipped += 1;
                continue;
            }
        };
        let row = record.position().map_or(0, |p| p.line());
        let cell = |i: usize| record.get(i).unwrap_or("");

        if !cell(cols.kind).eq_ignore_ascii_case(REQUIREMENT_TYPE) {
            continue;
        }

        let Some((name, id)) = split_advancement(cell(cols.advancement)) else {
            warn!(row, advancement = cell(cols.advancement), "unparseable advancement; skipped");
            skipped += 1;
            continue;
        };
        let year = match parse_year(cell(cols.version)) {
            Ok(year) => year,
            Err(e) => {
                warn!(row, error = %e, "bad version; skipped");
                skipped += 1;
                continue;
            }
        };

        let key = (name.to_lowercase(), std::cmp::Reverse(year));
        let acc = groups.entry(key).or_insert_with(|| Accum {
            name: name.to_string(),
            ..Default::default()
        });
        acc.occurrences += 1;
        if acc.seen.insert(id.to_string()) {
            acc.ids.push(id.to_string());
        }
    }

    let badges: Vec<CsvBadgeVersion> = groups
        .into_iter()
        .map(|((_, std::cmp::Reverse(year)), mut acc)| {
            acc.ids.sort_by_cached_key(|id| requirement_sort_key(id));
            CsvBadgeVersion {
                badge_name: acc.name,
                version_year: year,
                requirement_ids: acc.ids,
                total_occurrences: acc.occurrences,
            }
        })
        .collect();

    info!(versions = badges.len(), skipped, "extracted requirement IDs");

    Ok(CsvExtraction {
        generated_at: Some(generated_at.to_rfc3339()),
        badges,
    })
}
