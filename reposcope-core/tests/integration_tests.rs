//! Integration tests for reposcope-core infrastructure

use chrono::{TimeZone, Utc};
use reposcope_core::{
    config_error, init_logging, log_operation_error, log_operation_start, log_operation_success,
    repository_error, AnalysisResult, AnalysisStage, FrameworkMatch, FrameworkSource,
    LogFormat, LoggingConfig, RepositoryDescriptor, ScopeConfig, ScopeError,
};

#[test]
fn test_error_macros() {
    let error = repository_error!("Repository is archived", "test_component");
    match &error {
        ScopeError::Repository {
            message, context, ..
        } => {
            assert_eq!(message, "Repository is archived");
            assert_eq!(context.component, "test_component");
        }
        _ => panic!("Expected Repository error"),
    }
    error.log();

    let config = config_error!("bad value", "test");
    assert!(!config.is_recoverable());
    assert_eq!(
        config.context().map(|c| c.recovery_suggestions.len()),
        Some(2)
    );
}

#[test]
fn test_logging_initialization_only_once() {
    let config = LoggingConfig {
        format: LogFormat::Compact,
        filter_directives: vec!["reposcope_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // Other tests in this binary may have installed a subscriber already,
    // so only the second call is guaranteed to fail.
    let _ = init_logging(&config);
    assert!(init_logging(&config).is_err());

    log_operation_start!("test_operation", repo = "demo");
    log_operation_success!("test_operation");
    log_operation_error!("test_operation", "boom");
}

#[test]
fn test_logging_rejects_file_without_path() {
    let config = LoggingConfig {
        log_to_file: true,
        log_file_path: None,
        ..LoggingConfig::default()
    };
    assert!(init_logging(&config).is_err());
}

#[test]
fn test_analysis_result_serializes_for_downstream() {
    let created = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
    let descriptor = RepositoryDescriptor::new("demo", "octocat/demo", created);

    let mut result = AnalysisResult::new(&descriptor);
    let mut frameworks = FrameworkMatch::new();
    frameworks.insert(
        "Flask",
        FrameworkSource::Manifest {
            file: "requirements.txt".to_string(),
        },
    );
    result.frameworks = frameworks;
    result.mark_skipped(AnalysisStage::AggregatingStats, "skipped by operator");

    assert_eq!(result.created_date(), "2021-03-04");
    assert_eq!(result.created_year(), "2021");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["skipped"], true);
    assert_eq!(json["skipped_at"], "aggregating_stats");
    assert_eq!(json["frameworks"][0]["name"], "Flask");
    assert_eq!(json["frameworks"][0]["source"]["kind"], "manifest");

    let restored: AnalysisResult = serde_json::from_value(json).unwrap();
    assert_eq!(restored, result);
}

#[test]
fn test_default_config_roundtrips_through_toml() {
    let config = ScopeConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: ScopeConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
