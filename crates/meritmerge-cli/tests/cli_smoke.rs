use std::fs;
use std::path::Path;
use std::process::Command;

const EXPORT: &str = "\
BSA Member ID,Advancement Type,Advancement,Version,Date Completed
1001,Merit Badge Requirement,Camping #1,2025,2025-03-01
1001,Merit Badge Requirement,Camping #2a,2025,2025-03-01
1002,Merit Badge Requirement,Camping #2b,2025,2025-04-01
1002,Merit Badge Requirement,Camping #3,2025,2025-04-01
1003,Merit Badge Requirement,Cooking #1,2024,2024-06-01
";

const SCRAPE: &str = r#"{
  "badges": [
    {"badgeName": "Camping", "versionYear": 2025, "requirements": [
      {"displayLabel": "1", "description": "Explain the outdoor code", "hasCheckbox": true},
      {"displayLabel": "2", "description": "Do the following"},
      {"displayLabel": "(a)", "description": "Pitch a tent", "parentNumber": "2", "hasCheckbox": true},
      {"displayLabel": "(b)", "description": "Cook a meal", "parentNumber": "2", "hasCheckbox": true},
      {"displayLabel": "4", "description": "Not in the export", "hasCheckbox": true}
    ]}
  ]
}"#;

fn meritmerge(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_meritmerge"))
        .args(args)
        .env_remove("MERITMERGE_CSV_IDS")
        .env_remove("MERITMERGE_SCRAPED")
        .env_remove("MERITMERGE_OUT_DIR")
        .output()
        .expect("run meritmerge")
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 temp path")
}

fn read_json(p: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(p).expect("read output")).expect("parse output")
}

#[test]
fn extract_merge_tree_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let export = dir.path().join("export.csv");
    let ids = dir.path().join("ids.json");
    let scrape = dir.path().join("scrape.json");
    let out = dir.path().join("out");
    fs::write(&export, EXPORT).expect("write export");
    fs::write(&scrape, SCRAPE).expect("write scrape");

    let extract = meritmerge(&["extract", "--export", path_str(&export), "--out", path_str(&ids)]);
    assert!(
        extract.status.success(),
        "extract failed: {}",
        String::from_utf8_lossy(&extract.stderr)
    );
    let extracted = read_json(&ids);
    assert_eq!(extracted["badges"][0]["badgeName"], "Camping");
    assert_eq!(
        extracted["badges"][0]["requirementIds"],
        serde_json::json!(["1", "2a", "2b", "3"])
    );

    let merge = meritmerge(&[
        "merge",
        "--csv-ids",
        path_str(&ids),
        "--scraped",
        path_str(&scrape),
        "--out-dir",
        path_str(&out),
    ]);
    assert!(
        merge.status.success(),
        "merge failed: {}",
        String::from_utf8_lossy(&merge.stderr)
    );

    let canonical = read_json(&out.join("canonical-requirements.json"));
    let camping = &canonical["merit_badges"][0];
    assert_eq!(camping["name"], "Camping");
    let roots = camping["versions"][0]["requirements"]
        .as_array()
        .expect("requirements array");
    assert_eq!(roots[1]["is_header"], true);
    assert_eq!(roots[1]["children"][1]["scoutbook_id"], "2b");

    let report = read_json(&out.join("discrepancies.json"));
    assert_eq!(report["by_type"]["csv_not_in_ui"], 1);
    assert_eq!(report["by_type"]["ui_not_matched"], 1);
    assert_eq!(report["by_type"]["badge_not_accessible"], 1);

    let summary = String::from_utf8_lossy(&merge.stderr);
    assert!(summary.contains("Merge summary"), "{summary}");

    let tree = meritmerge(&[
        "tree",
        "--canonical",
        path_str(&out.join("canonical-requirements.json")),
        "--badge",
        "camping",
    ]);
    assert!(tree.status.success());
    let stdout = String::from_utf8_lossy(&tree.stdout);
    assert!(stdout.contains("=== Camping (2025) ==="), "{stdout}");
    assert!(stdout.contains("[2a]"), "{stdout}");
    assert!(stdout.contains("Pitch a tent"), "{stdout}");
}

#[test]
fn merge_reads_paths_from_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ids = dir.path().join("ids.json");
    fs::write(
        &ids,
        r#"{"badges": [{"badgeName": "Hiking", "versionYear": 2025, "requirementIds": ["1", "2"]}]}"#,
    )
    .expect("write ids");

    let status = Command::new(env!("CARGO_BIN_EXE_meritmerge"))
        .arg("merge")
        .env("MERITMERGE_CSV_IDS", &ids)
        .env("MERITMERGE_OUT_DIR", dir.path())
        .env_remove("MERITMERGE_SCRAPED")
        .output()
        .expect("run meritmerge");
    assert!(status.status.success(), "{}", String::from_utf8_lossy(&status.stderr));

    let canonical = read_json(&dir.path().join("canonical-requirements.json"));
    let reqs = &canonical["merit_badges"][0]["versions"][0]["requirements"];
    assert_eq!(reqs[0]["scoutbook_id"], "1");
    assert_eq!(reqs[1]["scoutbook_id"], "2");
}

#[test]
fn unknown_badge_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let canonical = dir.path().join("canonical.json");
    fs::write(
        &canonical,
        r#"{"generated_at": "2025-09-01T00:00:00Z", "source": "test", "merit_badges": []}"#,
    )
    .expect("write canonical");

    let out = meritmerge(&["tree", "--canonical", path_str(&canonical), "--badge", "Archery"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no badge named"));
}

#[test]
fn missing_export_reports_path() {
    let out = meritmerge(&["extract", "--export", "/nonexistent/export.csv"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("/nonexistent/export.csv"));
}
