//! Configuration management

use crate::error::{ErrorContext, ScopeError, ScopeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration, stored as TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub github: GitHubConfig,
    pub llm: LlmConfig,
    pub repository: RepositoryConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
    pub skip: SkipConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub per_page: u32,
    /// Falls back to the `GITHUB_TOKEN` environment variable
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            user_agent: format!("reposcope/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
            per_page: 100,
            token: None,
        }
    }
}

impl GitHubConfig {
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Falls back to the provider's usual environment variable
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            api_key: None,
            base_url: None,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Directory names pruned from every listing
    pub excluded_dirs: Vec<String>,
    /// Maximum number of repositories to analyze
    pub limit: Option<usize>,
    /// Only analyze repositories with these names
    pub allow_list: Option<Vec<String>>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "venv".to_string(),
                ".venv".to_string(),
                "__pycache__".to_string(),
                "dist".to_string(),
                "build".to_string(),
            ],
            limit: None,
            allow_list: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum rendered lines of the tree preview, truncation marker included
    pub tree_max_lines: usize,
    /// Source files sampled by the content-signature pass
    pub max_scan_files: usize,
    /// Bytes inspected per sampled file
    pub max_scan_bytes: usize,
    /// Files larger than this are never read for framework detection
    pub max_scan_file_bytes: u64,
    /// Files larger than this are not read for line counting
    pub max_line_count_bytes: u64,
    /// Extensions listed as "main file types"
    pub top_extensions: usize,
    /// Code samples kept per extension
    pub max_code_samples: usize,
    /// Lines kept per code sample
    pub sample_lines: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tree_max_lines: 50,
            max_scan_files: 200,
            max_scan_bytes: 16 * 1024,
            max_scan_file_bytes: 1_000_000,
            max_line_count_bytes: 100_000,
            top_extensions: 3,
            max_code_samples: 5,
            sample_lines: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: String,
    pub title: String,
    pub newest_first: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "github_repo_analysis.md".to_string(),
            title: "My GitHub Projects".to_string(),
            newest_first: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipConfig {
    pub enabled: bool,
    /// Key that abandons the current repository
    pub key: char,
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: 's',
        }
    }
}

impl ScopeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScopeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScopeError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ScopeConfig = toml::from_str(&content).map_err(|e| ScopeError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ScopeResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ScopeError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| ScopeError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Candidate config locations, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("reposcope").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".reposcope").join("config.toml"));
        }
        paths.push(PathBuf::from("reposcope.toml"));
        paths
    }

    /// Validate configuration
    pub fn validate(&self) -> ScopeResult<()> {
        let invalid = |message: &str, suggestion: &str| ScopeError::Config {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion(suggestion),
        };

        if self.analysis.tree_max_lines == 0 {
            return Err(invalid(
                "analysis.tree_max_lines must be greater than 0",
                "Set analysis.tree_max_lines to a positive value",
            ));
        }

        if self.analysis.max_scan_bytes == 0 {
            return Err(invalid(
                "analysis.max_scan_bytes must be greater than 0",
                "Set analysis.max_scan_bytes to a positive value",
            ));
        }

        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(invalid(
                "github.per_page must be between 1 and 100",
                "GitHub caps page size at 100",
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(invalid(
                "llm.max_tokens must be greater than 0",
                "Set llm.max_tokens to a positive value",
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid(
                "llm.temperature must be between 0.0 and 2.0",
                "Use a temperature such as 0.7",
            ));
        }

        if self.report.output_path.trim().is_empty() {
            return Err(invalid(
                "report.output_path must not be empty",
                "Set report.output_path to a file name",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScopeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.tree_max_lines, 50);
        assert_eq!(config.report.output_path, "github_repo_analysis.md");
        assert!(config.repository.excluded_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ScopeConfig = toml::from_str(
            r#"
            [analysis]
            tree_max_lines = 10

            [skip]
            key = "x"
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.tree_max_lines, 10);
        assert_eq!(config.analysis.max_scan_files, 200);
        assert_eq!(config.skip.key, 'x');
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_validation_rejects_zero_tree_lines() {
        let mut config = ScopeConfig::default();
        config.analysis.tree_max_lines = 0;
        assert!(matches!(config.validate(), Err(ScopeError::Config { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ScopeConfig::default();
        config.repository.limit = Some(5);
        config.save_to_file(&path).unwrap();

        let loaded = ScopeConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
