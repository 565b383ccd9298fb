//! Reposcope LLM - chat-completion backed summaries and project ratings
//!
//! Provider access goes through siumai; everything above the client talks
//! to the [`TextGenerator`] seam so it can run against a stub.

pub mod client;
pub mod evaluator;
pub mod summarizer;

pub use client::{ScopeLlmClient, TextGenerator};
pub use evaluator::{
    build_evaluation_prompt, extract_reason, extract_score, ProjectEvaluator, EVALUATION_MAX_TOKENS,
};
pub use summarizer::{build_summary_prompt, LlmSummarizer};
