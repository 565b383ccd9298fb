//! Common test utilities for analysis tests
//!
//! In-memory repository sources with scripted contents, injected read
//! failures and skip requests fired from inside a read.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reposcope_analysis::CancellationSignal;
use reposcope_core::{
    ErrorContext, FileEntry, RepositoryDescriptor, RepositorySource, ScopeError, ScopeResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("reposcope_analysis=debug,info")
            .with_test_writer()
            .try_init();
    });
}

enum Content {
    Text(String),
    Unreadable,
}

/// Repository held entirely in memory
pub struct MemorySource {
    descriptor: RepositoryDescriptor,
    entries: Vec<FileEntry>,
    contents: HashMap<String, Content>,
    listing_fails: bool,
    skip_on_read: Option<(String, CancellationSignal)>,
    reads: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new(name: &str, year: i32) -> Self {
        let created_at = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
        Self {
            descriptor: RepositoryDescriptor::new(name, &format!("octocat/{}", name), created_at),
            entries: Vec::new(),
            contents: HashMap::new(),
            listing_fails: false,
            skip_on_read: None,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a file; parent directories are added to the listing as needed
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.add_parents(path);
        self.entries
            .push(FileEntry::file(path, Some(content.len() as u64)));
        self.contents
            .insert(path.to_string(), Content::Text(content.to_string()));
        self
    }

    /// File with `lines` numbered lines
    pub fn lines(self, path: &str, lines: usize) -> Self {
        let content: String = (1..=lines).map(|i| format!("line {}\n", i)).collect();
        self.file(path, &content)
    }

    /// Listed file whose content cannot be read
    pub fn unreadable(mut self, path: &str) -> Self {
        self.add_parents(path);
        self.entries.push(FileEntry::file(path, None));
        self.contents.insert(path.to_string(), Content::Unreadable);
        self
    }

    pub fn with_size(mut self, path: &str, size: u64) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            entry.size = Some(size);
        }
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Raise `signal` the moment `path` is read
    pub fn skip_when_reading(mut self, path: &str, signal: &CancellationSignal) -> Self {
        self.skip_on_read = Some((path.to_string(), signal.clone()));
        self
    }

    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn boxed(self) -> Box<dyn RepositorySource> {
        Box::new(self)
    }

    fn add_parents(&mut self, path: &str) {
        let components: Vec<&str> = path.split('/').collect();
        for depth in 1..components.len() {
            let dir = components[..depth].join("/");
            if !self.entries.iter().any(|e| e.is_dir && e.path == dir) {
                self.entries.push(FileEntry::dir(&dir));
            }
        }
    }
}

#[async_trait]
impl RepositorySource for MemorySource {
    fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    async fn list_files(&self) -> ScopeResult<Vec<FileEntry>> {
        if self.listing_fails {
            return Err(ScopeError::NotFound {
                resource: self.descriptor.full_name.clone(),
                context: ErrorContext::new("memory_source"),
            });
        }
        Ok(self.entries.clone())
    }

    async fn read_file(&self, path: &str) -> ScopeResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some((trigger, signal)) = &self.skip_on_read {
            if trigger == path {
                signal.raise();
            }
        }
        match self.contents.get(path) {
            Some(Content::Text(text)) => Ok(text.clone()),
            Some(Content::Unreadable) => Err(ScopeError::Network {
                message: format!("simulated read failure for {}", path),
                source: None,
                context: ErrorContext::new("memory_source"),
            }),
            None => Err(ScopeError::NotFound {
                resource: path.to_string(),
                context: ErrorContext::new("memory_source"),
            }),
        }
    }
}
