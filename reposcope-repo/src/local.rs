//! Local directory sources
//!
//! Lets the pipeline run against checkouts on disk, without a GitHub token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reposcope_core::{
    ErrorContext, FileEntry, RepositoryDescriptor, RepositoryFetcher, RepositorySource,
    ScopeError, ScopeResult,
};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::filter::DirectoryFilter;

/// A directory on disk treated as one repository
pub struct LocalRepositorySource {
    root: PathBuf,
    descriptor: RepositoryDescriptor,
    filter: DirectoryFilter,
}

impl LocalRepositorySource {
    pub fn open<P: AsRef<Path>>(root: P, filter: DirectoryFilter) -> ScopeResult<Self> {
        let root = root.as_ref();
        let metadata = std::fs::metadata(root).map_err(|e| ScopeError::Repository {
            message: format!("Cannot open local repository {}: {}", root.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("local_source")
                .with_operation("open")
                .with_suggestion("Check that the path exists and is readable"),
        })?;

        if !metadata.is_dir() {
            return Err(ScopeError::Repository {
                message: format!("{} is not a directory", root.display()),
                source: None,
                context: ErrorContext::new("local_source").with_operation("open"),
            });
        }

        let root = root.canonicalize()?;
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let created_at: DateTime<Utc> = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let descriptor =
            RepositoryDescriptor::new(&name, &root.display().to_string(), created_at);

        debug!(root = %root.display(), name = %name, "Opened local repository");

        Ok(Self {
            root,
            descriptor,
            filter,
        })
    }

    /// Override the creation timestamp (filesystems rarely keep a meaningful one)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.descriptor.created_at = created_at;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> ScopeResult<PathBuf> {
        let relative_path = Path::new(relative);
        let escapes = relative_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ScopeError::Repository {
                message: format!("Path escapes the repository root: {}", relative),
                source: None,
                context: ErrorContext::new("local_source").with_operation("read_file"),
            });
        }
        Ok(self.root.join(relative_path))
    }
}

/// Walk `root`, returning `/`-separated relative entries sorted by path
fn walk_directory(root: &Path, filter: &DirectoryFilter) -> ScopeResult<Vec<FileEntry>> {
    let walk_filter = filter.clone();
    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !is_dir || walk_filter.should_traverse_directory(&entry.file_name().to_string_lossy())
        })
        .build();

    let mut entries = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => continue,
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            entries.push(FileEntry::dir(&relative));
        } else if file_type.is_file() {
            let size = entry.metadata().ok().map(|m| m.len());
            entries.push(FileEntry::file(&relative, size));
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

#[async_trait]
impl RepositorySource for LocalRepositorySource {
    fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    async fn list_files(&self) -> ScopeResult<Vec<FileEntry>> {
        let root = self.root.clone();
        let filter = self.filter.clone();

        let entries = tokio::task::spawn_blocking(move || walk_directory(&root, &filter))
            .await
            .map_err(|e| ScopeError::Internal {
                message: format!("Directory walk panicked: {}", e),
                source: None,
                context: ErrorContext::new("local_source").with_operation("list_files"),
            })??;

        debug!(root = %self.root.display(), entries = entries.len(), "Listed local repository");
        Ok(entries)
    }

    async fn read_file(&self, path: &str) -> ScopeResult<String> {
        let full_path = self.resolve(path)?;
        let bytes = tokio::fs::read(&full_path).await?;
        String::from_utf8(bytes).map_err(|e| ScopeError::Repository {
            message: format!("{} is not valid UTF-8", path),
            source: Some(Box::new(e)),
            context: ErrorContext::new("local_source").with_operation("read_file"),
        })
    }
}

/// A requested directory that could not be opened. Listing it fails with the
/// open error, so the run reports it instead of stopping.
struct UnopenedSource {
    descriptor: RepositoryDescriptor,
    reason: String,
}

impl UnopenedSource {
    fn new(root: &Path, error: &ScopeError) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Self {
            descriptor: RepositoryDescriptor::new(&name, &root.display().to_string(), Utc::now()),
            reason: error.to_string(),
        }
    }

    fn error(&self, operation: &str) -> ScopeError {
        ScopeError::Repository {
            message: self.reason.clone(),
            source: None,
            context: ErrorContext::new("local_source")
                .with_operation(operation)
                .with_metadata("root", &self.descriptor.full_name)
                .with_suggestion("Check that the path exists and is readable"),
        }
    }
}

#[async_trait]
impl RepositorySource for UnopenedSource {
    fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    async fn list_files(&self) -> ScopeResult<Vec<FileEntry>> {
        Err(self.error("list_files"))
    }

    async fn read_file(&self, _path: &str) -> ScopeResult<String> {
        Err(self.error("read_file"))
    }
}

/// Serves a fixed set of local directories, oldest first. Directories that
/// cannot be opened sort last.
pub struct LocalFetcher {
    roots: Vec<PathBuf>,
    filter: DirectoryFilter,
}

impl LocalFetcher {
    pub fn new(roots: Vec<PathBuf>, filter: DirectoryFilter) -> Self {
        Self { roots, filter }
    }
}

#[async_trait]
impl RepositoryFetcher for LocalFetcher {
    async fn fetch(&self) -> ScopeResult<Vec<Box<dyn RepositorySource>>> {
        let mut sources: Vec<Box<dyn RepositorySource>> = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            match LocalRepositorySource::open(root, self.filter.clone()) {
                Ok(source) => sources.push(Box::new(source)),
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Local repository unavailable");
                    sources.push(Box::new(UnopenedSource::new(root, &e)));
                }
            }
        }
        sources.sort_by(|a, b| a.descriptor().created_at.cmp(&b.descriptor().created_at));

        info!(count = sources.len(), "Prepared local repositories");
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("src/app.py"), "import flask\n").unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        std::fs::write(dir.path().join(".env"), "A=1").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_list_files_prunes_excluded_dirs() {
        let dir = sample_tree();
        let source = LocalRepositorySource::open(dir.path(), DirectoryFilter::default()).unwrap();

        let entries = source.list_files().await.unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec![".env", "src", "src/app.py"]);
        assert!(entries[1].is_dir);
        assert_eq!(entries[2].size, Some(13));
    }

    #[tokio::test]
    async fn test_read_file_rejects_traversal() {
        let dir = sample_tree();
        let source = LocalRepositorySource::open(dir.path(), DirectoryFilter::none()).unwrap();

        assert_eq!(source.read_file("src/app.py").await.unwrap(), "import flask\n");
        assert!(source.read_file("../outside.txt").await.is_err());
        assert!(source.read_file("missing.txt").await.is_err());
    }

    #[test]
    fn test_open_rejects_files() {
        let dir = sample_tree();
        assert!(LocalRepositorySource::open(dir.path().join(".env"), DirectoryFilter::none()).is_err());
        assert!(LocalRepositorySource::open(dir.path().join("nope"), DirectoryFilter::none()).is_err());
    }

    #[tokio::test]
    async fn test_fetch_keeps_unopenable_roots() {
        let dir = sample_tree();
        let fetcher = LocalFetcher::new(
            vec![dir.path().to_path_buf(), PathBuf::from("/nonexistent/reposcope/repo")],
            DirectoryFilter::default(),
        );

        let sources = fetcher.fetch().await.unwrap();
        assert_eq!(sources.len(), 2);

        let missing = sources
            .iter()
            .find(|s| s.descriptor().name == "repo")
            .unwrap();
        let err = missing.list_files().await.unwrap_err();
        assert!(matches!(err, ScopeError::Repository { .. }));
        assert!(err.to_string().contains("/nonexistent/reposcope/repo"));
        assert!(missing.read_file("README.md").await.is_err());

        let present = sources
            .iter()
            .find(|s| s.descriptor().name != "repo")
            .unwrap();
        assert_eq!(present.list_files().await.unwrap().len(), 3);
    }
}
