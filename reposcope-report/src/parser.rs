//! Reads a generated report back into project cards

use regex::Regex;
use reposcope_core::{ErrorContext, ProjectCard, ScopeError, ScopeResult};
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(\d{4})\*\*").expect("year pattern is valid"));

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("tag pattern is valid"));

/// Parse report Markdown. Each `## ` heading opens a card; the first
/// `**YYYY**` line after it is the year, the next non-empty line the
/// description, and a later line with backticks the tags.
pub fn parse_report(markdown: &str) -> Vec<ProjectCard> {
    let mut cards = Vec::new();
    let mut current: Option<ProjectCard> = None;

    for line in markdown.lines() {
        if let Some(name) = line.strip_prefix("## ") {
            cards.extend(current.take());
            current = Some(ProjectCard {
                name: name.trim().to_string(),
                ..ProjectCard::default()
            });
            continue;
        }

        let Some(card) = current.as_mut() else {
            continue;
        };
        let text = line.trim();

        if card.year.is_none() {
            if line.starts_with("**") {
                card.year = YEAR_PATTERN.captures(line).map(|caps| caps[1].to_string());
            }
        } else if card.description.is_none() {
            if !text.is_empty() && text != "---" {
                card.description = Some(text.to_string());
            }
        } else if line.contains('`') {
            card.tags = TAG_PATTERN
                .captures_iter(line)
                .map(|caps| caps[1].to_string())
                .collect();
        }
    }

    cards.extend(current);
    cards
}

/// Read and parse a report file
pub async fn load_report(path: &Path) -> ScopeResult<Vec<ProjectCard>> {
    info!(path = ?path, "Loading report");

    let markdown = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScopeError::Report {
            message: format!("Failed to read report {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("report_parser")
                .with_operation("load_report")
                .with_suggestion("Run 'reposcope analyze' first or pass --file"),
        })?;

    let cards = parse_report(&markdown);
    info!(projects = cards.len(), "Extracted projects");
    Ok(cards)
}
