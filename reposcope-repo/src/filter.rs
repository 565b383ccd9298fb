//! Directory filtering for repository listings

use reposcope_core::FileEntry;
use std::collections::HashSet;

/// Prunes vendored and generated directories from a listing
#[derive(Debug, Clone)]
pub struct DirectoryFilter {
    excluded: HashSet<String>,
}

impl DirectoryFilter {
    pub fn new<I, S>(excluded_dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that keeps everything
    pub fn none() -> Self {
        Self {
            excluded: HashSet::new(),
        }
    }

    /// Check if a directory with this name should be traversed
    pub fn should_traverse_directory(&self, dir_name: &str) -> bool {
        !self.excluded.contains(dir_name)
    }

    /// Check if a `/`-separated relative path lies inside an excluded directory
    /// (or is one)
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        relative_path
            .split('/')
            .any(|component| self.excluded.contains(component))
    }

    /// Drop excluded entries, keeping the order of the rest
    pub fn apply(&self, entries: Vec<FileEntry>) -> Vec<FileEntry> {
        if self.excluded.is_empty() {
            return entries;
        }
        entries
            .into_iter()
            .filter(|entry| !self.is_excluded(&entry.path))
            .collect()
    }
}

impl Default for DirectoryFilter {
    fn default() -> Self {
        Self::new(reposcope_core::RepositoryConfig::default().excluded_dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excludes_nested_components() {
        let filter = DirectoryFilter::new(["node_modules", ".git"]);
        assert!(filter.is_excluded("node_modules"));
        assert!(filter.is_excluded("web/node_modules/react/index.js"));
        assert!(!filter.is_excluded("src/node_modules_helper.js"));
        assert!(!filter.should_traverse_directory(".git"));
        assert!(filter.should_traverse_directory("src"));
    }

    #[test]
    fn test_apply_keeps_order() {
        let filter = DirectoryFilter::default();
        let entries = vec![
            FileEntry::file("b.py", Some(1)),
            FileEntry::dir("venv"),
            FileEntry::file("venv/lib/site.py", Some(1)),
            FileEntry::file("a.py", Some(1)),
        ];
        let kept: Vec<String> = filter.apply(entries).into_iter().map(|e| e.path).collect();
        assert_eq!(kept, vec!["b.py", "a.py"]);
    }
}
