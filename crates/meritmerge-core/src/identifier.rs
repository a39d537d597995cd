//! Requirement identifier normalisation and matching.
//!
//! Export IDs and scraped display labels render the same requirement in
//! several ways: `"2a"`, `"2(a)"`, `"2a."`, a bare `"(a)"` under main
//! requirement 2, or with a trailing option name (`"6a avian"`,
//! `"5b Opt B"`, `"6[a] Avian"`). There is no fixed grammar, so matching
//! tries a fixed sequence of strategies and the first success wins.

/// Canonicalise a requirement label so that superficially different
/// renderings compare equal.
///
/// Removes `()[]`, collapses whitespace, strips trailing periods, lowercases.
/// Idempotent.
pub fn normalize(id: &str) -> String {
    let stripped: String = id
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']'))
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_lowercase()
}

/// How an export ID was tied to a scraped label, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrategy {
    /// `"2a"` == `"2a."`
    Direct,
    /// parent `"2"` + label `"(a)"` == `"2a"`
    Composite,
    /// parent + label + current option, e.g. `"6a avian"`
    OptionComposite,
    /// ID starts with a multi-character label, e.g. `"6a avian"` for `"6a"`
    Prefix,
}

/// Decide whether `csv_id` denotes the scraped `ui_label`, and by which strategy.
pub fn match_strategy(
    csv_id: &str,
    ui_label: &str,
    parent_number: Option<&str>,
    current_option: Option<&str>,
) -> Option<MatchStrategy> {
    let csv = normalize(csv_id);
    if csv.is_empty() {
        return None;
    }
    let label = normalize(ui_label);

    if csv == label {
        return Some(MatchStrategy::Direct);
    }

    let parent = parent_number.map(str::trim).filter(|p| !p.is_empty());
    if let Some(parent) = parent
        && !label.is_empty()
    {
        let composite = normalize(&format!("{parent}{ui_label}"));
        if csv == composite {
            return Some(MatchStrategy::Composite);
        }

        if let Some(option) = current_option.map(str::trim).filter(|o| !o.is_empty()) {
            if csv == normalize(&format!("{parent}{ui_label} {option}")) {
                return Some(MatchStrategy::OptionComposite);
            }
            if csv_id.to_lowercase().contains(&option.to_lowercase()) && csv.starts_with(&composite)
            {
                return Some(MatchStrategy::OptionComposite);
            }
            if csv == normalize(&format!("{parent}[{ui_label}] {option}")) {
                return Some(MatchStrategy::OptionComposite);
            }
        }
    }

    if label.chars().count() > 1 && csv.starts_with(&label) {
        return Some(MatchStrategy::Prefix);
    }

    None
}

/// Boolean form of [`match_strategy`].
pub fn matches(
    csv_id: &str,
    ui_label: &str,
    parent_number: Option<&str>,
    current_option: Option<&str>,
) -> bool {
    match_strategy(csv_id, ui_label, parent_number, current_option).is_some()
}
