//! Whole-file JSON loading and saving for the pipeline's inputs and outputs.

use std::fs;
use std::path::Path;

use meritmerge_core::{CanonicalOutput, Catalog, CsvExtraction, ScrapedExtraction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::IngestError;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the requirement-ID extraction (`{generatedAt, badges: [...]}`).
pub fn load_csv_extraction(path: &Path) -> Result<CsvExtraction, IngestError> {
    let ext: CsvExtraction = read_json(path)?;
    info!(path = %path.display(), versions = ext.badges.len(), "loaded export IDs");
    Ok(ext)
}

/// Load the scraped requirement pages (`{badges: [...]}`).
pub fn load_scraped(path: &Path) -> Result<ScrapedExtraction, IngestError> {
    let scraped: ScrapedExtraction = read_json(path)?;
    info!(path = %path.display(), versions = scraped.badges.len(), "loaded scrape");
    Ok(scraped)
}

/// Load a previously written canonical catalog.
pub fn load_canonical(path: &Path) -> Result<CanonicalOutput, IngestError> {
    read_json(path)
}

/// Load catalog overrides (eagle list, categories, option vocabulary).
pub fn load_catalog(path: &Path) -> Result<Catalog, IngestError> {
    read_json(path)
}

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json + "\n").map_err(io_err)?;
    info!(path = %path.display(), "wrote JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_extraction_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ids.json");
        let ext = CsvExtraction {
            generated_at: Some("2025-09-01T00:00:00Z".into()),
            badges: vec![meritmerge_core::CsvBadgeVersion::new("Camping", 2025, ["1", "2a"])],
        };
        write_json(&path, &ext).unwrap();

        let loaded = load_csv_extraction(&path).unwrap();
        assert_eq!(loaded.badges, ext.badges);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"badgeName\""));
        assert!(raw.contains("\"requirementIds\""));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_scraped(Path::new("/nonexistent/scrape.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scrape.json"));
    }

    #[test]
    fn missing_top_level_field_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrape.json");
        fs::write(&path, r#"{"pages": []}"#).unwrap();
        let err = load_scraped(&path).unwrap_err();
        assert!(matches!(err, IngestError::Json { .. }));
    }
}
