//! Repository summaries written by an LLM

use crate::client::TextGenerator;
use async_trait::async_trait;
use reposcope_core::{ScopeResult, Summarizer, SummaryInput};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

const SYSTEM_PROMPT: &str =
    "You are a helpful technical documentation writer with expertise in code analysis.";

/// Tree preview lines included in the prompt
const PROMPT_TREE_LINES: usize = 30;

const README_EXCERPT_CHARS: usize = 1000;

/// Prompt describing one analyzed repository
pub fn build_summary_prompt(input: &SummaryInput) -> String {
    let languages = if input.languages.is_empty() {
        "No languages detected".to_string()
    } else {
        input.languages.join(", ")
    };

    let frameworks = if input.frameworks.is_empty() {
        "No specific frameworks detected".to_string()
    } else {
        input.frameworks.join("\n")
    };

    let main_file_types = if input.main_file_types.is_empty() {
        "None detected".to_string()
    } else {
        input.main_file_types.join(", ")
    };

    let structure = input
        .tree_preview
        .lines()
        .take(PROMPT_TREE_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    // one sample per extension
    let mut seen = HashSet::new();
    let samples: String = input
        .code_samples
        .iter()
        .filter(|sample| seen.insert(sample.extension.as_str()))
        .map(|sample| {
            format!(
                "\nSample {} code from {}:\n```\n{}\n```\n",
                sample.extension, sample.path, sample.sample
            )
        })
        .collect();

    let readme = match &input.readme {
        Some(readme) => readme.chars().take(README_EXCERPT_CHARS).collect(),
        None => "No README available".to_string(),
    };

    let description = input
        .description
        .as_deref()
        .map(|d| format!("Description: {}\n", d))
        .unwrap_or_default();

    format!(
        "You are a technical documentation assistant. Given the following repository details, \
generate a concise and informative summary:

Repository Name: {name}
Created On: {created}
{description}Languages: {languages}
Frameworks and Libraries:
{frameworks}

Code Analysis:
- Total Files: {total_files}
- Total Lines of Code: {total_lines}
- Main File Types: {main_file_types}

File Structure Overview:
{structure}

{samples}

README Excerpt:
{readme}

Provide a clear, well-structured summary highlighting:
1. The repository's purpose and main functionality
2. Key technologies and programming languages used
3. Code organization and architecture
4. Notable features or patterns observed in the code
5. Any other relevant insights from the code analysis
",
        name = input.name,
        created = input.created_at.format("%Y-%m-%d"),
        description = description,
        languages = languages,
        frameworks = frameworks,
        total_files = input.total_files,
        total_lines = input.total_lines,
        main_file_types = main_file_types,
        structure = structure,
        samples = samples,
        readme = readme,
    )
}

/// [`Summarizer`] that asks an LLM to describe the repository
pub struct LlmSummarizer {
    generator: Arc<dyn TextGenerator>,
    name: String,
}

impl LlmSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        let name = format!("llm:{}", generator.describe());
        Self { generator, name }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn summarize(&self, input: &SummaryInput) -> ScopeResult<String> {
        let prompt = build_summary_prompt(input);
        debug!(repo = %input.name, prompt_chars = prompt.len(), "Requesting LLM summary");
        self.generator
            .generate_with_system(SYSTEM_PROMPT, &prompt)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reposcope_core::{CodeSample, ErrorContext, ScopeError};
    use std::sync::Mutex;

    fn sample(path: &str, extension: &str) -> CodeSample {
        CodeSample {
            path: path.to_string(),
            extension: extension.to_string(),
            sample: format!("// {}", path),
            lines: 1,
        }
    }

    fn input() -> SummaryInput {
        SummaryInput {
            name: "inventory".to_string(),
            created_at: Utc.with_ymd_and_hms(2021, 3, 14, 0, 0, 0).unwrap(),
            description: None,
            languages: vec!["Python".to_string(), "JavaScript".to_string()],
            frameworks: vec!["Flask".to_string(), "React".to_string()],
            total_files: 12,
            total_lines: 340,
            main_file_types: vec![".py (7 files)".to_string(), ".js (3 files)".to_string()],
            tree_preview: (0..40).map(|i| format!("file{}.py", i)).collect::<Vec<_>>().join("\n"),
            code_samples: vec![
                sample("app.py", ".py"),
                sample("models.py", ".py"),
                sample("web/index.js", ".js"),
            ],
            readme: Some("r".repeat(1500)),
        }
    }

    #[test]
    fn test_prompt_carries_analysis_facts() {
        let prompt = build_summary_prompt(&input());

        assert!(prompt.contains("Repository Name: inventory"));
        assert!(prompt.contains("Created On: 2021-03-14"));
        assert!(prompt.contains("Languages: Python, JavaScript"));
        assert!(prompt.contains("Frameworks and Libraries:\nFlask\nReact"));
        assert!(prompt.contains("- Total Files: 12"));
        assert!(prompt.contains("- Total Lines of Code: 340"));
        assert!(prompt.contains("- Main File Types: .py (7 files), .js (3 files)"));
    }

    #[test]
    fn test_prompt_bounds_tree_samples_and_readme() {
        let prompt = build_summary_prompt(&input());

        assert!(prompt.contains("file29.py"));
        assert!(!prompt.contains("file30.py"));

        assert!(prompt.contains("Sample .py code from app.py:\n```\n// app.py\n```"));
        assert!(!prompt.contains("models.py"));
        assert!(prompt.contains("Sample .js code from web/index.js"));

        assert!(prompt.contains(&"r".repeat(1000)));
        assert!(!prompt.contains(&"r".repeat(1001)));
    }

    #[test]
    fn test_prompt_placeholders_for_missing_facts() {
        let mut bare = input();
        bare.languages.clear();
        bare.frameworks.clear();
        bare.main_file_types.clear();
        bare.readme = None;

        let prompt = build_summary_prompt(&bare);
        assert!(prompt.contains("Languages: No languages detected"));
        assert!(prompt.contains("No specific frameworks detected"));
        assert!(prompt.contains("Main File Types: None detected"));
        assert!(prompt.contains("README Excerpt:\nNo README available"));
    }

    struct RecordingGenerator {
        prompts: Mutex<Vec<(String, String)>>,
        reply: Option<String>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        fn describe(&self) -> String {
            "stub/model".to_string()
        }

        async fn generate_with_system(
            &self,
            system_prompt: &str,
            user_message: &str,
        ) -> ScopeResult<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_message.to_string()));
            self.reply.clone().ok_or_else(|| ScopeError::Summary {
                message: "provider unavailable".to_string(),
                provider: None,
                model: None,
                context: ErrorContext::new("test"),
            })
        }
    }

    #[tokio::test]
    async fn test_summarizer_sends_system_and_user_prompt() {
        let generator = Arc::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            reply: Some("An inventory tracker.".to_string()),
        });
        let summarizer = LlmSummarizer::new(generator.clone());

        assert_eq!(summarizer.name(), "llm:stub/model");
        let summary = summarizer.summarize(&input()).await.unwrap();
        assert_eq!(summary, "An inventory tracker.");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, SYSTEM_PROMPT);
        assert!(prompts[0].1.contains("Repository Name: inventory"));
    }

    #[tokio::test]
    async fn test_summarizer_propagates_generator_errors() {
        let summarizer = LlmSummarizer::new(Arc::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            reply: None,
        }));

        let err = summarizer.summarize(&input()).await.unwrap_err();
        assert!(matches!(err, ScopeError::Summary { .. }));
    }
}
