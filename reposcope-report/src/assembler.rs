//! Markdown report assembly
//!
//! Layout of one repository card:
//!
//! ```text
//! ## name
//!
//! **2021**
//!
//! First sentence of the summary.
//!
//! `Python` `Flask`
//!
//! ---
//! ```

use reposcope_core::{AnalysisResult, ErrorContext, ReportConfig, ScopeError, ScopeResult};
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

const MAX_LANGUAGE_TAGS: usize = 3;
const MAX_TAGS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 150;

/// First sentence of a summary, on one line and at most 150 characters
pub fn short_description(summary: &str) -> String {
    let flattened = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.is_empty() {
        return String::new();
    }

    let first = flattened.split('.').next().unwrap_or_default();
    let sentence = format!("{}.", first);
    if sentence.chars().count() > MAX_DESCRIPTION_CHARS {
        let mut cut: String = sentence.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
        cut.push_str("...");
        cut
    } else {
        sentence
    }
}

/// Up to three language tags, then framework tags up to five in total
pub fn card_tags(result: &AnalysisResult) -> Vec<String> {
    let mut tags: Vec<String> = result
        .languages
        .iter()
        .take(MAX_LANGUAGE_TAGS)
        .cloned()
        .collect();
    let room = MAX_TAGS.saturating_sub(tags.len());
    tags.extend(result.frameworks.sorted().into_iter().take(room));
    tags
}

/// Renders analysis results as the Markdown project report
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    config: ReportConfig,
}

impl ReportAssembler {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Results in report order
    fn ordered<'a>(&self, results: &'a [AnalysisResult]) -> Vec<&'a AnalysisResult> {
        let mut ordered: Vec<&AnalysisResult> = results.iter().collect();
        if self.config.newest_first {
            ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        ordered
    }

    pub fn render(&self, results: &[AnalysisResult]) -> String {
        let mut report = format!("# {}\n\n", self.config.title);

        for result in self.ordered(results) {
            let _ = write!(report, "## {}\n\n**{}**\n\n", result.name, result.created_year());

            if result.skipped {
                let note = result.note.as_deref().unwrap_or("skipped");
                let _ = write!(report, "_Skipped: {}_\n\n", note);
            } else if let Some(description) = result
                .summary
                .as_deref()
                .map(short_description)
                .filter(|d| !d.is_empty())
            {
                let _ = write!(report, "{}\n\n", description);
            }

            let tags = card_tags(result);
            if !tags.is_empty() {
                let line = tags
                    .iter()
                    .map(|tag| format!("`{}`", tag))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(report, "{}\n\n", line);
            }

            report.push_str("---\n\n");
            debug!(repo = %result.name, skipped = result.skipped, "Rendered report card");
        }

        report
    }

    /// Write the Markdown report, creating parent directories
    pub async fn write_markdown(
        &self,
        results: &[AnalysisResult],
        output_path: &Path,
    ) -> ScopeResult<()> {
        info!(path = ?output_path, cards = results.len(), "Writing report");

        ensure_parent(output_path).await?;
        fs::write(output_path, self.render(results))
            .await
            .map_err(|e| write_error(output_path, e))?;

        info!(path = ?output_path, "Report generated");
        Ok(())
    }

    /// Write the raw results as pretty JSON
    pub async fn write_json(&self, results: &[AnalysisResult], output_path: &Path) -> ScopeResult<()> {
        info!(path = ?output_path, "Exporting analysis results as JSON");

        let json_content = serde_json::to_string_pretty(results).map_err(|e| ScopeError::Report {
            message: format!("Failed to serialize analysis results to JSON: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("report").with_operation("write_json"),
        })?;

        ensure_parent(output_path).await?;
        fs::write(output_path, json_content)
            .await
            .map_err(|e| write_error(output_path, e))?;

        Ok(())
    }
}

async fn ensure_parent(path: &Path) -> ScopeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| write_error(parent, e))?;
    }
    Ok(())
}

fn write_error(path: &Path, e: std::io::Error) -> ScopeError {
    ScopeError::Report {
        message: format!("Failed to write {}: {}", path.display(), e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("report")
            .with_operation("write")
            .with_metadata("path", &path.display().to_string())
            .with_suggestion("Check that the output directory is writable"),
    }
}
