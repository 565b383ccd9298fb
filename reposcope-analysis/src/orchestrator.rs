//! Per-repository analysis pipeline
//!
//! Repositories are analyzed one after another. Every repository yields
//! exactly one [`AnalysisResult`]: complete, skipped by the operator, or
//! skipped because it could not be listed.

use crate::classifier::LanguageTally;
use crate::frameworks::FrameworkDetector;
use crate::skip::{CancellationSignal, Cancelled};
use crate::stats::StatsAggregator;
use crate::summary::fallback_summary;
use reposcope_core::{
    log_operation_start, log_operation_success, AnalysisConfig, AnalysisResult, AnalysisStage,
    FileEntry, RepositorySource, ScopeError, Summarizer, SummaryInput,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Root-level README names, in lookup order
const README_CANDIDATES: &[&str] = &[
    "README.md",
    "README.MD",
    "Readme.md",
    "readme.md",
    "README.rst",
    "README.txt",
    "README",
    "readme",
];

const SKIPPED_NOTE: &str = "skipped by operator";

/// Why a repository stopped before `Done`
#[derive(Debug)]
enum StageStop {
    Cancelled,
    Inaccessible(ScopeError),
}

impl From<Cancelled> for StageStop {
    fn from(_: Cancelled) -> Self {
        StageStop::Cancelled
    }
}

/// First README found at the repository root, if any can be read
pub async fn extract_readme(
    entries: &[FileEntry],
    source: &dyn RepositorySource,
) -> Option<String> {
    for candidate in README_CANDIDATES {
        let present = entries
            .iter()
            .any(|entry| !entry.is_dir && entry.path == *candidate);
        if !present {
            continue;
        }
        match source.read_file(candidate).await {
            Ok(text) if !text.trim().is_empty() => return Some(text),
            Ok(_) => continue,
            Err(e) => {
                debug!(path = candidate, error = %e, "README unreadable");
            }
        }
    }
    None
}

/// Sequences classification, detection, statistics, README extraction and
/// summarization for each repository
pub struct AnalysisOrchestrator {
    detector: FrameworkDetector,
    aggregator: StatsAggregator,
    summarizer: Option<Arc<dyn Summarizer>>,
    top_extensions: usize,
}

impl AnalysisOrchestrator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            detector: FrameworkDetector::new(config),
            aggregator: StatsAggregator::new(config),
            summarizer: None,
            top_extensions: config.top_extensions,
        }
    }

    /// Summarize with `summarizer`; failures fall back to the template
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Analyze every source in order, one result per source
    pub async fn run(
        &self,
        sources: &[Box<dyn RepositorySource>],
        signal: &CancellationSignal,
    ) -> Vec<AnalysisResult> {
        log_operation_start!("analyze_repositories", count = sources.len());

        let mut results = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            info!(
                repo = %source.descriptor().full_name,
                position = index + 1,
                total = sources.len(),
                "Analyzing repository"
            );
            results.push(self.analyze(source.as_ref(), signal).await);
        }

        let skipped = results.iter().filter(|result| result.skipped).count();
        log_operation_success!("analyze_repositories", analyzed = results.len(), skipped);
        results
    }

    /// Analyze one repository. The signal is cleared before returning.
    pub async fn analyze(
        &self,
        source: &dyn RepositorySource,
        signal: &CancellationSignal,
    ) -> AnalysisResult {
        let mut result = AnalysisResult::new(source.descriptor());
        let mut stage = AnalysisStage::Pending;

        match self.run_stages(source, signal, &mut result, &mut stage).await {
            Ok(()) => {
                Self::enter(&result.name, &mut stage, AnalysisStage::Done);
            }
            Err(StageStop::Cancelled) => {
                info!(repo = %result.name, %stage, "Repository skipped by operator");
                result.mark_skipped(stage, SKIPPED_NOTE);
                Self::enter(&result.name, &mut stage, AnalysisStage::Skipped);
            }
            Err(StageStop::Inaccessible(e)) => {
                warn!(repo = %result.name, %stage, error = %e, "Repository could not be analyzed");
                result.mark_skipped(stage, &format!("repository inaccessible: {}", e));
                Self::enter(&result.name, &mut stage, AnalysisStage::Skipped);
            }
        }

        signal.clear();
        result
    }

    fn enter(repo: &str, stage: &mut AnalysisStage, next: AnalysisStage) {
        debug!(repo, from = %stage, to = %next, "Stage transition");
        *stage = next;
    }

    async fn run_stages(
        &self,
        source: &dyn RepositorySource,
        signal: &CancellationSignal,
        result: &mut AnalysisResult,
        stage: &mut AnalysisStage,
    ) -> Result<(), StageStop> {
        let name = result.name.clone();

        Self::enter(&name, stage, AnalysisStage::Fetching);
        let entries = source
            .list_files()
            .await
            .map_err(StageStop::Inaccessible)?;

        Self::enter(&name, stage, AnalysisStage::Classifying);
        signal.checkpoint()?;
        let mut tally = LanguageTally::new();
        for entry in entries.iter().filter(|entry| !entry.is_dir) {
            signal.checkpoint()?;
            tally.record(&entry.path);
        }
        result.languages = tally.languages();

        Self::enter(&name, stage, AnalysisStage::DetectingFrameworks);
        signal.checkpoint()?;
        result.frameworks = self.detector.detect(&entries, source, signal).await?;

        Self::enter(&name, stage, AnalysisStage::AggregatingStats);
        signal.checkpoint()?;
        let stats = self.aggregator.aggregate(&entries, source, signal).await?;
        result.total_files = stats.total_files;
        result.total_lines = stats.total_lines;
        result.extension_stats = stats.extensions.clone();
        result.tree_preview = stats.tree_preview.clone();
        if stats.unreadable_files > 0 {
            result.note = Some(format!("{} files could not be read", stats.unreadable_files));
        }

        Self::enter(&name, stage, AnalysisStage::ExtractingReadme);
        signal.checkpoint()?;
        result.readme = extract_readme(&entries, source).await;

        Self::enter(&name, stage, AnalysisStage::Summarizing);
        signal.checkpoint()?;
        let input = SummaryInput {
            name: name.clone(),
            created_at: result.created_at,
            description: source.descriptor().description.clone(),
            languages: result.languages.clone(),
            frameworks: result.frameworks.sorted(),
            total_files: stats.total_files,
            total_lines: stats.total_lines,
            main_file_types: stats.extensions.main_file_types(self.top_extensions),
            tree_preview: stats.tree_preview,
            code_samples: stats.code_samples,
            readme: result.readme.clone(),
        };
        let summary = self.summarize(&input).await;
        // a press during a slow summarizer call still skips this repository
        signal.checkpoint()?;
        result.summary = Some(summary);

        Ok(())
    }

    async fn summarize(&self, input: &SummaryInput) -> String {
        let Some(summarizer) = &self.summarizer else {
            return fallback_summary(input);
        };
        match summarizer.summarize(input).await {
            Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
            Ok(_) => {
                warn!(repo = %input.name, summarizer = summarizer.name(), "Empty summary, using fallback");
                fallback_summary(input)
            }
            Err(e) => {
                warn!(repo = %input.name, summarizer = summarizer.name(), error = %e, "Summarizer failed, using fallback");
                fallback_summary(input)
            }
        }
    }
}
