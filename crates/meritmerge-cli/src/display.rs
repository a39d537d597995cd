//! Human-readable rendering of merge results.
//!
//! The requirement tree goes to stdout as an indented outline; the merge
//! summary goes to stderr so it never mixes with piped output.

use meritmerge_core::{
    CanonicalBadge, CanonicalOutput, CanonicalRequirement, CanonicalVersion, DiscrepancyReport,
};

const MAX_LIST_ITEMS: usize = 10;
const DESCRIPTION_WIDTH: usize = 72;

// ── Badge tree ──

/// Print a badge version as a card header followed by its requirement outline.
pub fn print_badge_tree(badge: &CanonicalBadge, version: &CanonicalVersion) {
    println!("=== {} ({}) ===", badge.name, version.version_year);
    println!("  {:<18} {}", "code", badge.code);
    if let Some(category) = &badge.category {
        println!("  {:<18} {}", "category", category);
    }
    println!(
        "  {:<18} {}",
        "eagle required",
        if badge.is_eagle_required { "yes" } else { "no" }
    );

    let all = version.all_requirements();
    let headers = all.iter().filter(|r| r.is_header).count();
    println!("  {:<18} {}", "requirements", all.len() - headers);
    println!("  {:<18} {}", "headers", headers);
    println!();

    for root in &version.requirements {
        print_node(root, 0);
    }
}

fn print_node(node: &CanonicalRequirement, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let marker = if node.is_header { "▸" } else { "☐" };
    let label = if node.requirement_number.is_empty() {
        "-"
    } else {
        node.requirement_number.as_str()
    };

    if node.is_header {
        println!("{indent}{marker} {label}  {}", truncate(&node.description));
    } else {
        println!(
            "{indent}{marker} {label}  [{}]  {}",
            node.scoutbook_id,
            truncate(&node.description)
        );
    }
    for link in &node.links {
        println!("{indent}    ↳ {} <{}>", link.text, link.url);
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn truncate(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= DESCRIPTION_WIDTH {
        return line.to_string();
    }
    let cut: String = line.chars().take(DESCRIPTION_WIDTH - 1).collect();
    format!("{cut}…")
}

// ── Merge summary ──

/// Print per-run totals and the first few discrepancies of each type.
pub fn print_merge_summary(output: &CanonicalOutput, report: &DiscrepancyReport) {
    let versions: usize = output.merit_badges.iter().map(|b| b.versions.len()).sum();
    let requirements: usize = output
        .merit_badges
        .iter()
        .flat_map(|b| &b.versions)
        .map(|v| v.all_requirements().iter().filter(|r| !r.is_header).count())
        .sum();

    eprintln!("Merge summary");
    eprintln!("  {:<26} {}", "badges", output.merit_badges.len());
    eprintln!("  {:<26} {}", "versions", versions);
    eprintln!("  {:<26} {}", "completable requirements", requirements);
    eprintln!("  {:<26} {}", "discrepancies", report.total_discrepancies);
    for (kind, count) in &report.by_type {
        eprintln!("    {:<24} {}", kind.as_str(), count);
    }

    for &kind in report.by_type.keys() {
        let items: Vec<_> = report
            .discrepancies
            .iter()
            .filter(|d| d.kind == kind)
            .collect();
        eprintln!();
        eprintln!("{} ({}):", kind.as_str(), items.len());
        for d in items.iter().take(MAX_LIST_ITEMS) {
            eprintln!("  {} {}: {}", d.badge_name, d.version_year, d.description);
        }
        if items.len() > MAX_LIST_ITEMS {
            eprintln!("  ... and {} more", items.len() - MAX_LIST_ITEMS);
        }
    }
    eprintln!();
}
