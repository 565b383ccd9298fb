//! Core trait definitions - the seams to external collaborators

use crate::error::ScopeResult;
use crate::types::*;
use async_trait::async_trait;

/// Lazy access to one repository: listing and file contents are fetched on demand
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Metadata known without touching the file tree
    fn descriptor(&self) -> &RepositoryDescriptor;

    /// Full recursive listing, directories included
    async fn list_files(&self) -> ScopeResult<Vec<FileEntry>>;

    /// Content of one file as UTF-8 text
    async fn read_file(&self, path: &str) -> ScopeResult<String>;
}

/// Produces the repositories to analyze, in the order they should be reported
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch(&self) -> ScopeResult<Vec<Box<dyn RepositorySource>>>;
}

/// Turns analysis facts into prose
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn summarize(&self, input: &SummaryInput) -> ScopeResult<String>;
}
