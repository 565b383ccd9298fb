//! Impressiveness ratings for report entries

use crate::client::TextGenerator;
use regex::Regex;
use reposcope_core::{Evaluation, ProjectCard, ScopeResult};
use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are an expert project evaluator.";

/// Token budget for one rating
pub const EVALUATION_MAX_TOKENS: u32 = 300;

static SCORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Score:\s*(\d+(?:\.\d+)?)").expect("score pattern is valid")
});

pub fn build_evaluation_prompt(card: &ProjectCard) -> String {
    format!(
        "You are an expert project evaluator. Assess the following GitHub project and rate how \
impressive it is on a scale of 1 (not impressive) to 10 (extremely impressive), considering \
technical complexity, uniqueness, and potential impact.

After the rating, briefly explain why you gave that score in 2-3 sentences.

Project Name: {}
Year: {}
Description: {}
Technologies: {}

Respond in the following format:
Score: <number>
Reason: <your explanation>
",
        card.name,
        card.year.as_deref().unwrap_or("None"),
        card.description.as_deref().unwrap_or("None"),
        card.tags.join(", ")
    )
}

/// First `Score: <n>` in the reply; 0 when absent
pub fn extract_score(reply: &str) -> f64 {
    SCORE_PATTERN
        .captures(reply)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

/// Text after the first `Reason:`; empty when absent
pub fn extract_reason(reply: &str) -> String {
    reply
        .split_once("Reason:")
        .map(|(_, reason)| reason.trim().to_string())
        .unwrap_or_default()
}

/// Rates project cards with an LLM
pub struct ProjectEvaluator {
    generator: Arc<dyn TextGenerator>,
}

impl ProjectEvaluator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn evaluate(&self, card: &ProjectCard) -> ScopeResult<Evaluation> {
        let reply = self
            .generator
            .generate_with_system(SYSTEM_PROMPT, &build_evaluation_prompt(card))
            .await?;

        Ok(Evaluation {
            score: extract_score(&reply),
            reason: extract_reason(&reply),
        })
    }

    /// Rate every card, best first. A failed rating scores 0 and keeps its
    /// error as the reason.
    pub async fn rank(&self, cards: Vec<ProjectCard>) -> Vec<(ProjectCard, Evaluation)> {
        let total = cards.len();
        let mut ranked = Vec::with_capacity(total);

        for (index, card) in cards.into_iter().enumerate() {
            info!(project = %card.name, position = index + 1, total, "Evaluating project");
            let evaluation = match self.evaluate(&card).await {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    warn!(project = %card.name, error = %e, "Evaluation failed");
                    Evaluation {
                        score: 0.0,
                        reason: format!("Error evaluating project: {}", e),
                    }
                }
            };
            ranked.push((card, evaluation));
        }

        // stable: equal scores keep report order
        ranked.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap_or(Ordering::Equal));
        ranked
    }
}
