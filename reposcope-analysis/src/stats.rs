//! Code statistics over a repository listing

use crate::classifier::{classify, is_ignored, UNKNOWN_LANGUAGE};
use crate::skip::{CancellationSignal, Cancelled};
use reposcope_core::{AnalysisConfig, CodeSample, CodeStats, FileEntry, RepositorySource};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Final line of a truncated tree preview
pub const TREE_TRUNCATION_MARKER: &str = "... (more files/directories)";

/// Counts files, lines and extensions and renders the tree preview
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    tree_max_lines: usize,
    max_line_count_bytes: u64,
    max_code_samples: usize,
    sample_lines: usize,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl StatsAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            tree_max_lines: config.tree_max_lines,
            max_line_count_bytes: config.max_line_count_bytes,
            max_code_samples: config.max_code_samples,
            sample_lines: config.sample_lines,
        }
    }

    /// Aggregate a listing. Unreadable files count as files with zero lines.
    pub async fn aggregate(
        &self,
        entries: &[FileEntry],
        source: &dyn RepositorySource,
        signal: &CancellationSignal,
    ) -> Result<CodeStats, Cancelled> {
        let mut stats = CodeStats {
            tree_preview: render_tree(entries, self.tree_max_lines),
            ..CodeStats::default()
        };
        let mut samples_per_extension: HashMap<String, usize> = HashMap::new();

        for entry in entries.iter().filter(|entry| !entry.is_dir) {
            signal.checkpoint()?;

            stats.total_files += 1;
            let extension_key = entry.extension_key();
            stats.extensions.record(&extension_key);

            if is_ignored(&entry.path) {
                continue;
            }
            if entry
                .size
                .is_some_and(|size| size > self.max_line_count_bytes)
            {
                debug!(path = %entry.path, size = ?entry.size, "File too large to count lines");
                continue;
            }

            let content = match source.read_file(&entry.path).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %entry.path, error = %e, "File unreadable, counted without lines");
                    stats.unreadable_files += 1;
                    continue;
                }
            };

            let lines = content.lines().count();
            stats.total_lines += lines;

            if classify(&entry.path) == UNKNOWN_LANGUAGE {
                continue;
            }
            let taken = samples_per_extension
                .entry(extension_key.clone())
                .or_insert(0);
            if *taken < self.max_code_samples {
                *taken += 1;
                stats.code_samples.push(CodeSample {
                    path: entry.path.clone(),
                    extension: extension_key,
                    sample: content
                        .lines()
                        .take(self.sample_lines)
                        .collect::<Vec<_>>()
                        .join("\n"),
                    lines,
                });
            }
        }

        debug!(
            files = stats.total_files,
            lines = stats.total_lines,
            unreadable = stats.unreadable_files,
            "Aggregated code statistics"
        );
        Ok(stats)
    }
}

#[derive(Default)]
struct TreeNode {
    dirs: BTreeMap<String, TreeNode>,
    files: BTreeSet<String>,
}

impl TreeNode {
    fn insert(&mut self, entry: &FileEntry) {
        let mut components: Vec<&str> = entry.path.split('/').filter(|c| !c.is_empty()).collect();
        let Some(last) = components.pop() else {
            return;
        };

        let mut node = self;
        for component in components {
            node = node.dirs.entry(component.to_string()).or_default();
        }
        if entry.is_dir {
            node.dirs.entry(last.to_string()).or_default();
        } else {
            node.files.insert(last.to_string());
        }
    }

    /// Push lines depth first; stops once `limit` lines are collected
    fn render(&self, depth: usize, limit: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        for (name, child) in &self.dirs {
            if lines.len() >= limit {
                return;
            }
            lines.push(format!("{}{}/", indent, name));
            child.render(depth + 1, limit, lines);
        }
        for name in &self.files {
            if lines.len() >= limit {
                return;
            }
            lines.push(format!("{}{}", indent, name));
        }
    }
}

/// Indented tree of a listing: directories before files, each group in
/// lexical order. At most `max_lines` lines are produced; when the tree is
/// longer, the last of them is [`TREE_TRUNCATION_MARKER`].
pub fn render_tree(entries: &[FileEntry], max_lines: usize) -> String {
    if max_lines == 0 {
        return String::new();
    }

    let mut root = TreeNode::default();
    for entry in entries {
        root.insert(entry);
    }

    let mut lines = Vec::with_capacity(max_lines + 1);
    root.render(0, max_lines + 1, &mut lines);

    if lines.len() > max_lines {
        lines.truncate(max_lines - 1);
        lines.push(TREE_TRUNCATION_MARKER.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(paths: &[&str]) -> Vec<FileEntry> {
        paths
            .iter()
            .map(|p| match p.strip_suffix('/') {
                Some(dir) => FileEntry::dir(dir),
                None => FileEntry::file(p, None),
            })
            .collect()
    }

    #[test]
    fn test_tree_orders_directories_first() {
        let entries = listing(&["z.txt", "src/", "src/main.rs", "a.txt", "docs/", "src/lib/", "src/lib/x.rs"]);
        assert_eq!(
            render_tree(&entries, 50),
            "docs/\nsrc/\n  lib/\n    x.rs\n  main.rs\na.txt\nz.txt"
        );
    }

    #[test]
    fn test_tree_creates_implicit_directories() {
        let entries = listing(&["pkg/mod/file.go"]);
        assert_eq!(render_tree(&entries, 10), "pkg/\n  mod/\n    file.go");
    }

    #[test]
    fn test_tree_truncation_bound() {
        let paths: Vec<String> = (0..30).map(|i| format!("f{:02}.txt", i)).collect();
        let entries: Vec<FileEntry> = paths.iter().map(|p| FileEntry::file(p, None)).collect();

        for max in 1..=35 {
            let preview = render_tree(&entries, max);
            let lines: Vec<&str> = preview.lines().collect();
            assert!(lines.len() <= max);
            if max < 30 {
                assert_eq!(lines.last(), Some(&TREE_TRUNCATION_MARKER));
            } else {
                assert_eq!(lines.len(), 30);
                assert!(!preview.contains(TREE_TRUNCATION_MARKER));
            }
        }
    }

    #[test]
    fn test_tree_exact_fit_has_no_marker() {
        let entries = listing(&["a", "b", "c"]);
        assert_eq!(render_tree(&entries, 3), "a\nb\nc");
        assert_eq!(render_tree(&entries, 2), format!("a\n{}", TREE_TRUNCATION_MARKER));
    }
}
