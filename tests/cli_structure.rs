use std::fs;

use predicates::prelude::*;
use siteinsight::formats::StructuredDocument;

const REPORT: &str = "# Green Hosting Review\n\
\n\
## Overview\n\
The site loads quickly on desktop.\n\
\n\
## Recommendations\n\
- Compress hero images before upload\n\
- Move to a renewable energy host\n\
\n\
In summary, small changes add up.\n";

#[test]
fn structure_reads_file_and_prints_json() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let input = temp.path().join("report.md");
    fs::write(&input, REPORT)?;

    let output = assert_cmd::cargo::cargo_bin_cmd!("siteinsight")
        .args([
            "structure",
            "--input",
            input.to_str().expect("utf-8 path"),
            "--content-type",
            "sustainability",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: StructuredDocument = serde_json::from_slice(&output)?;
    assert_eq!(document.title, "Green Hosting Review");
    assert_eq!(
        document
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>(),
        vec!["Green Hosting Review", "Overview", "Recommendations"]
    );
    assert_eq!(
        document.key_points,
        vec![
            "Compress hero images before upload".to_owned(),
            "Move to a renewable energy host".to_owned(),
        ]
    );
    assert_eq!(document.conclusion, "In summary, small changes add up.");
    assert_eq!(document.metadata.content_type, "sustainability");
    assert!(!document.metadata.used_fallback);
    Ok(())
}

#[test]
fn structure_reads_stdin_and_falls_back_on_empty_input() -> anyhow::Result<()> {
    let output = assert_cmd::cargo::cargo_bin_cmd!("siteinsight")
        .args(["structure", "--input", "-", "--content-type", "security"])
        .write_stdin("   \n\n  ")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: StructuredDocument = serde_json::from_slice(&output)?;
    assert_eq!(document.title, "Security Analysis");
    assert!(document.metadata.used_fallback);
    assert_eq!(document.metadata.word_count, 0);
    assert_eq!(document.sections.len(), 1);
    Ok(())
}

#[test]
fn structure_refuses_to_overwrite_without_force() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let input = temp.path().join("report.md");
    let out = temp.path().join("doc.json");
    fs::write(&input, REPORT)?;
    fs::write(&out, "keep me")?;

    let args = [
        "structure",
        "--input",
        input.to_str().expect("utf-8 path"),
        "--content-type",
        "blog",
        "--out",
        out.to_str().expect("utf-8 path"),
    ];

    assert_cmd::cargo::cargo_bin_cmd!("siteinsight")
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("output already exists"));
    assert_eq!(fs::read_to_string(&out)?, "keep me");

    assert_cmd::cargo::cargo_bin_cmd!("siteinsight")
        .args(args)
        .arg("--force")
        .assert()
        .success();
    let document: StructuredDocument = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(document.metadata.content_type, "blog");
    Ok(())
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    assert_cmd::cargo::cargo_bin_cmd!("siteinsight")
        .env("RUST_LOG", "debug")
        .args(["structure", "--input", "-", "--content-type", "blog"])
        .write_stdin("Plain text.")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn verbose_flag_enables_debug_logging() {
    assert_cmd::cargo::cargo_bin_cmd!("siteinsight")
        .env_remove("RUST_LOG")
        .args(["-v", "structure", "--input", "-", "--content-type", "blog"])
        .write_stdin("Plain text.")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}
