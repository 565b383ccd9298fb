//! Report files on disk: written by the assembler, read back by the parser

mod common;

use common::analyzed;
use reposcope_core::{AnalysisStage, ReportConfig};
use reposcope_report::{load_report, ReportAssembler};
use tempfile::TempDir;

#[tokio::test]
async fn test_written_report_reads_back_as_cards() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("github_repo_analysis.md");

    let mut skipped = analyzed("abandoned", 2017, &["Go"], &[], "");
    skipped.mark_skipped(AnalysisStage::DetectingFrameworks, "skipped by operator");

    let results = vec![
        analyzed(
            "shop-front",
            2019,
            &["JavaScript", "CSS"],
            &["React", "Express"],
            "This repository is a storefront built with React. It talks to an Express API.",
        ),
        analyzed(
            "pipeline",
            2023,
            &["Python"],
            &["pandas", "Flask"],
            "A data pipeline that cleans sensor readings.",
        ),
        skipped,
    ];

    let assembler = ReportAssembler::new(ReportConfig::default());
    assembler.write_markdown(&results, &path).await.unwrap();

    let cards = load_report(&path).await.unwrap();
    let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["pipeline", "shop-front", "abandoned"]);

    assert_eq!(cards[0].year.as_deref(), Some("2023"));
    assert_eq!(
        cards[0].description.as_deref(),
        Some("A data pipeline that cleans sensor readings.")
    );
    assert_eq!(cards[0].tags, vec!["Python", "Flask", "pandas"]);

    assert_eq!(
        cards[1].description.as_deref(),
        Some("This repository is a storefront built with React.")
    );
    assert_eq!(cards[1].tags, vec!["JavaScript", "CSS", "Express", "React"]);

    assert_eq!(
        cards[2].description.as_deref(),
        Some("_Skipped: skipped by operator_")
    );
    assert_eq!(cards[2].tags, vec!["Go"]);
}

#[tokio::test]
async fn test_json_export_contains_every_result() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");

    let results = vec![
        analyzed("one", 2020, &["Rust"], &["Tokio"], "First."),
        analyzed("two", 2021, &[], &[], "Second."),
    ];

    ReportAssembler::default()
        .write_json(&results, &path)
        .await
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "one");
    assert_eq!(entries[0]["frameworks"][0]["name"], "Tokio");
    assert_eq!(entries[1]["skipped"], false);
}
