//! Deterministic summary used without an LLM or when it fails

use reposcope_core::SummaryInput;

const README_EXCERPT_CHARS: usize = 100;

/// Template summary built only from analysis facts
pub fn fallback_summary(input: &SummaryInput) -> String {
    let languages = if input.languages.is_empty() {
        "No languages detected".to_string()
    } else {
        input.languages.join(", ")
    };

    let mut summary = format!(
        "This repository is named '{}' and was created on {}. It primarily uses {}. ",
        input.name,
        input.created_at.format("%Y-%m-%d"),
        languages
    );

    if !input.frameworks.is_empty() {
        summary.push_str(&format!(
            "The project utilizes {}. ",
            input.frameworks.join(", ")
        ));
    }

    if input.total_files > 0 {
        summary.push_str(&format!(
            "The codebase consists of {} files with approximately {} lines of code. ",
            input.total_files, input.total_lines
        ));
        if !input.main_file_types.is_empty() {
            summary.push_str(&format!(
                "The main file types are {}. ",
                input.main_file_types.join(", ")
            ));
        }
    }

    if let Some(line) = input
        .readme
        .as_deref()
        .and_then(|readme| readme.lines().map(str::trim).find(|line| !line.is_empty()))
    {
        summary.push_str("README excerpt: ");
        if line.chars().count() > README_EXCERPT_CHARS {
            summary.extend(line.chars().take(README_EXCERPT_CHARS));
            summary.push_str("...");
        } else {
            summary.push_str(line);
        }
    }

    summary.trim_end().to_string()
}
