//! Reposcope Repository - repository discovery and lazy content access
//!
//! Provides the GitHub API source and the local-directory source that feed
//! the analysis orchestrator

pub mod api;
pub mod fetcher;
pub mod filter;
pub mod local;

pub use api::*;
pub use fetcher::*;
pub use filter::*;
pub use local::*;
