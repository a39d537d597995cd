use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use meritmerge_core::{MergeConfig, merge};

mod display;

#[derive(Parser)]
#[command(name = "meritmerge", version, about = "Reconcile merit badge requirements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract requirement IDs from an advancement export CSV.
    Extract {
        /// Advancement export (CSV).
        #[arg(long)]
        export: PathBuf,
        /// Where to write the requirement-ID JSON.
        #[arg(long, default_value = "csv-requirement-ids.json")]
        out: PathBuf,
    },
    /// Merge export IDs with scraped requirements.
    Merge {
        /// Requirement-ID JSON from `extract`.
        #[arg(long, env = "MERITMERGE_CSV_IDS")]
        csv_ids: PathBuf,
        /// Scraped requirements JSON. Without it every version degrades to flat.
        #[arg(long, env = "MERITMERGE_SCRAPED")]
        scraped: Option<PathBuf>,
        /// Directory for canonical-requirements.json and discrepancies.json.
        #[arg(long, env = "MERITMERGE_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Catalog overrides: eagle list, categories, option vocabulary.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print one badge's canonical requirement tree.
    Tree {
        /// canonical-requirements.json from `merge`.
        #[arg(long)]
        canonical: PathBuf,
        /// Badge name (case-insensitive).
        #[arg(long)]
        badge: String,
        /// Version year; newest when omitted.
        #[arg(long)]
        year: Option<u16>,
    },
}

const CANONICAL_FILE: &str = "canonical-requirements.json";
const DISCREPANCY_FILE: &str = "discrepancies.json";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("meritmerge v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Extract { export, out } => run_extract(&export, &out),
        Command::Merge {
            csv_ids,
            scraped,
            out_dir,
            catalog,
        } => run_merge(&csv_ids, scraped.as_deref(), &out_dir, catalog.as_deref()),
        Command::Tree {
            canonical,
            badge,
            year,
        } => run_tree(&canonical, &badge, year),
    }
}

fn run_extract(export: &Path, out: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(export)
        .with_context(|| format!("reading {}", export.display()))?;
    let extraction = meritmerge_ingest::parse_export(&text, chrono::Utc::now())
        .with_context(|| format!("parsing {}", export.display()))?;
    meritmerge_ingest::write_json(out, &extraction)?;

    let ids: usize = extraction.badges.iter().map(|b| b.requirement_ids.len()).sum();
    eprintln!(
        "  Extracted {ids} requirement IDs across {} badge versions → {}",
        extraction.badges.len(),
        out.display()
    );
    Ok(())
}

fn run_merge(
    csv_ids: &Path,
    scraped: Option<&Path>,
    out_dir: &Path,
    catalog: Option<&Path>,
) -> anyhow::Result<()> {
    let mut config = MergeConfig::default();
    if let Some(path) = catalog {
        let catalog = meritmerge_ingest::load_catalog(path).context("loading catalog")?;
        config = config.with_catalog(catalog);
    }

    let csv = meritmerge_ingest::load_csv_extraction(csv_ids).context("loading export IDs")?;
    let scraped = match scraped {
        Some(path) => Some(meritmerge_ingest::load_scraped(path).context("loading scrape")?),
        None => {
            tracing::warn!("no scrape given; all badge versions will be flat");
            None
        }
    };

    let outcome = merge(&csv, scraped.as_ref(), &config);
    let (output, report) = outcome.into_outputs(chrono::Utc::now(), &config);

    let canonical_path = out_dir.join(CANONICAL_FILE);
    let report_path = out_dir.join(DISCREPANCY_FILE);
    meritmerge_ingest::write_json(&canonical_path, &output)?;
    meritmerge_ingest::write_json(&report_path, &report)?;

    display::print_merge_summary(&output, &report);
    eprintln!("  Wrote {}", canonical_path.display());
    eprintln!("  Wrote {}", report_path.display());
    Ok(())
}

fn run_tree(canonical: &Path, badge: &str, year: Option<u16>) -> anyhow::Result<()> {
    let output = meritmerge_ingest::load_canonical(canonical).context("loading canonical catalog")?;
    let badge = output
        .badge(badge)
        .ok_or_else(|| anyhow::anyhow!("no badge named {badge:?}"))?;
    let version = match year {
        Some(y) => badge
            .versions
            .iter()
            .find(|v| v.version_year == y)
            .ok_or_else(|| anyhow::anyhow!("{} has no {y} version", badge.name))?,
        None => badge
            .versions
            .first()
            .ok_or_else(|| anyhow::anyhow!("{} has no versions", badge.name))?,
    };
    display::print_badge_tree(badge, version);
    Ok(())
}
