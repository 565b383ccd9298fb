//! Common test utilities for report tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use reposcope_core::{AnalysisResult, FrameworkSource, RepositoryDescriptor};

/// Completed analysis of a repository created on January 1st of `year`
pub fn analyzed(name: &str, year: i32, languages: &[&str], frameworks: &[&str], summary: &str) -> AnalysisResult {
    let descriptor = RepositoryDescriptor::new(
        name,
        &format!("octocat/{}", name),
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
    );
    let mut result = AnalysisResult::new(&descriptor);
    result.languages = languages.iter().map(|l| l.to_string()).collect();
    for framework in frameworks {
        result.frameworks.insert(
            framework,
            FrameworkSource::Manifest {
                file: "package.json".to_string(),
            },
        );
    }
    result.summary = Some(summary.to_string());
    result
}
