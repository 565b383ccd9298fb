//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Bucket used by [`ExtensionStats`] for files without an extension
pub const NO_EXTENSION: &str = "(no extension)";

/// Repository metadata as delivered by a fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Short repository name
    pub name: String,
    /// Owner-qualified name (`owner/name`), or the directory path for local sources
    pub full_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Free-text description, if the host provides one
    pub description: Option<String>,
}

impl RepositoryDescriptor {
    pub fn new(name: &str, full_name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            full_name: full_name.to_string(),
            created_at,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Last component of a `/`-separated path
pub fn path_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lowercase extension of a `/`-separated path, without the dot. Dotfiles
/// such as `.gitignore` and names ending in a dot have none.
pub fn path_extension(path: &str) -> Option<String> {
    let name = path_file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => Some(name[idx + 1..].to_ascii_lowercase()),
        _ => None,
    }
}

/// One entry of a repository listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    /// Size in bytes, when the host reports it
    pub size: Option<u64>,
    /// Whether this entry is a directory
    pub is_dir: bool,
}

impl FileEntry {
    pub fn file(path: &str, size: Option<u64>) -> Self {
        Self {
            path: path.to_string(),
            size,
            is_dir: false,
        }
    }

    pub fn dir(path: &str) -> Self {
        Self {
            path: path.to_string(),
            size: None,
            is_dir: true,
        }
    }

    pub fn file_name(&self) -> &str {
        path_file_name(&self.path)
    }

    pub fn extension(&self) -> Option<String> {
        path_extension(&self.path)
    }

    /// Key used by [`ExtensionStats`]: `.ext` or [`NO_EXTENSION`]
    pub fn extension_key(&self) -> String {
        match self.extension() {
            Some(ext) => format!(".{}", ext),
            None => NO_EXTENSION.to_string(),
        }
    }
}

/// Which signal produced a framework detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameworkSource {
    /// Declared dependency in a manifest file
    Manifest { file: String },
    /// Import/require signature found in a source file
    Content { file: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkHit {
    pub name: String,
    pub source: FrameworkSource,
}

/// Distinct framework names in detection order.
///
/// Names are compared case-insensitively; the first spelling and source to
/// arrive are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FrameworkHit>", into = "Vec<FrameworkHit>")]
pub struct FrameworkMatch {
    hits: Vec<FrameworkHit>,
    seen: HashSet<String>,
}

impl FrameworkMatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detection. Returns `false` if the name was already present.
    pub fn insert(&mut self, name: &str, source: FrameworkSource) -> bool {
        if !self.seen.insert(name.to_lowercase()) {
            return false;
        }
        self.hits.push(FrameworkHit {
            name: name.to_string(),
            source,
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hits(&self) -> &[FrameworkHit] {
        &self.hits
    }

    /// Names in detection order
    pub fn names(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.name.clone()).collect()
    }

    /// Names in a reproducible order for rendering
    pub fn sorted(&self) -> Vec<String> {
        let mut names = self.names();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }
}

impl From<Vec<FrameworkHit>> for FrameworkMatch {
    fn from(hits: Vec<FrameworkHit>) -> Self {
        let mut matched = FrameworkMatch::new();
        for hit in hits {
            matched.insert(&hit.name, hit.source);
        }
        matched
    }
}

impl From<FrameworkMatch> for Vec<FrameworkHit> {
    fn from(matched: FrameworkMatch) -> Self {
        matched.hits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCount {
    pub extension: String,
    pub count: usize,
}

/// File counts per extension, remembering first-seen order for tie breaks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ExtensionCount>", into = "Vec<ExtensionCount>")]
pub struct ExtensionStats {
    entries: Vec<ExtensionCount>,
    index: HashMap<String, usize>,
}

impl ExtensionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&idx) => self.entries[idx].count += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(ExtensionCount {
                    extension: key.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn count(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].count)
            .unwrap_or(0)
    }

    /// Sum of all buckets
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buckets in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionCount> {
        self.entries.iter()
    }

    /// The `n` largest buckets; equal counts keep first-seen order
    pub fn top(&self, n: usize) -> Vec<ExtensionCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }

    /// Human-readable top-n list, e.g. `.py (3 files)`
    pub fn main_file_types(&self, n: usize) -> Vec<String> {
        self.top(n)
            .into_iter()
            .map(|entry| {
                let unit = if entry.count == 1 { "file" } else { "files" };
                format!("{} ({} {})", entry.extension, entry.count, unit)
            })
            .collect()
    }
}

impl From<Vec<ExtensionCount>> for ExtensionStats {
    fn from(entries: Vec<ExtensionCount>) -> Self {
        let mut stats = ExtensionStats::new();
        for entry in entries {
            match stats.index.get(&entry.extension) {
                Some(&idx) => stats.entries[idx].count += entry.count,
                None => {
                    stats
                        .index
                        .insert(entry.extension.clone(), stats.entries.len());
                    stats.entries.push(entry);
                }
            }
        }
        stats
    }
}

impl From<ExtensionStats> for Vec<ExtensionCount> {
    fn from(stats: ExtensionStats) -> Self {
        stats.entries
    }
}

/// Leading lines of one source file, kept for the summary prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSample {
    pub path: String,
    pub extension: String,
    pub sample: String,
    pub lines: usize,
}

/// Output of the code statistics aggregator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStats {
    /// Files in the listing, directories excluded
    pub total_files: usize,
    /// Lines across readable text files
    pub total_lines: usize,
    pub extensions: ExtensionStats,
    pub tree_preview: String,
    /// Files whose content could not be fetched or decoded
    pub unreadable_files: usize,
    pub code_samples: Vec<CodeSample>,
}

/// Per-repository analysis state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Pending,
    Fetching,
    Classifying,
    DetectingFrameworks,
    AggregatingStats,
    ExtractingReadme,
    Summarizing,
    Done,
    Skipped,
}

impl AnalysisStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStage::Done | AnalysisStage::Skipped)
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisStage::Pending => "pending",
            AnalysisStage::Fetching => "fetching",
            AnalysisStage::Classifying => "classifying",
            AnalysisStage::DetectingFrameworks => "detecting frameworks",
            AnalysisStage::AggregatingStats => "aggregating stats",
            AnalysisStage::ExtractingReadme => "extracting readme",
            AnalysisStage::Summarizing => "summarizing",
            AnalysisStage::Done => "done",
            AnalysisStage::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Everything the analysis produced for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    /// Distinct languages, most files first
    pub languages: Vec<String>,
    pub frameworks: FrameworkMatch,
    pub total_files: usize,
    pub total_lines: usize,
    pub extension_stats: ExtensionStats,
    pub tree_preview: String,
    pub readme: Option<String>,
    pub summary: Option<String>,
    pub skipped: bool,
    /// Stage that was active when the analysis stopped early
    pub skipped_at: Option<AnalysisStage>,
    /// Why the repository was skipped, or what degraded
    pub note: Option<String>,
}

impl AnalysisResult {
    /// Empty result for a repository; stages fill the fields in
    pub fn new(descriptor: &RepositoryDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            full_name: descriptor.full_name.clone(),
            created_at: descriptor.created_at,
            languages: Vec::new(),
            frameworks: FrameworkMatch::new(),
            total_files: 0,
            total_lines: 0,
            extension_stats: ExtensionStats::new(),
            tree_preview: String::new(),
            readme: None,
            summary: None,
            skipped: false,
            skipped_at: None,
            note: None,
        }
    }

    pub fn mark_skipped(&mut self, stage: AnalysisStage, note: &str) {
        self.skipped = true;
        self.skipped_at = Some(stage);
        self.note = Some(note.to_string());
    }

    pub fn created_date(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }

    pub fn created_year(&self) -> String {
        self.created_at.format("%Y").to_string()
    }
}

/// Everything a summarizer may look at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryInput {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub total_files: usize,
    pub total_lines: usize,
    pub main_file_types: Vec<String>,
    pub tree_preview: String,
    pub code_samples: Vec<CodeSample>,
    pub readme: Option<String>,
}

/// One project entry read back from a generated report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectCard {
    pub name: String,
    pub year: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Impressiveness rating of a project card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 1 to 10; 0 when the rating could not be read
    pub score: f64,
    pub reason: String,
}
