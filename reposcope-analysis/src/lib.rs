//! Reposcope Analysis - the repository analysis engine
//!
//! File classification, framework detection, code statistics and the
//! per-repository orchestrator with cooperative skip support

pub mod classifier;
pub mod frameworks;
pub mod orchestrator;
pub mod skip;
pub mod stats;
pub mod summary;

pub use classifier::{classify, detect_languages, is_ignored, LanguageTally, UNKNOWN_LANGUAGE};
pub use frameworks::{FrameworkDetector, ManifestKind};
pub use orchestrator::{extract_readme, AnalysisOrchestrator};
pub use skip::{
    Acknowledge, CancellationSignal, Cancelled, KeyboardTrigger, SkipController, TriggerPoll,
    TriggerSource,
};
pub use stats::{render_tree, StatsAggregator, TREE_TRUNCATION_MARKER};
pub use summary::fallback_summary;
