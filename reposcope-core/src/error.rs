//! Error type shared by every reposcope crate
//!
//! Variants map to pipeline areas; most carry an [`ErrorContext`] so the CLI
//! can print suggestions next to the message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type ScopeResult<T> = Result<T, ScopeError>;

/// Where and when an error happened, plus hints for the operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Correlates the logged error with what the CLI prints
    pub error_id: String,
    pub timestamp: DateTime<Utc>,
    /// Crate-level area, e.g. `github` or `summarizer`
    pub component: String,
    pub operation: Option<String>,
    pub metadata: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the reposcope workspace
#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Analysis error: {message}")]
    Analysis {
        message: String,
        context: ErrorContext,
    },

    #[error("Summary error: {message}")]
    Summary {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Report error: {message}")]
    Report {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_ms: Option<u64>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl ScopeError {
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ScopeError::Repository { context, .. }
            | ScopeError::Analysis { context, .. }
            | ScopeError::Summary { context, .. }
            | ScopeError::Report { context, .. }
            | ScopeError::Config { context, .. }
            | ScopeError::Network { context, .. }
            | ScopeError::Authentication { context, .. }
            | ScopeError::NotFound { context, .. }
            | ScopeError::RateLimit { context, .. }
            | ScopeError::Internal { context, .. } => Some(context),
            ScopeError::Io(_) | ScopeError::Serialization(_) => None,
        }
    }

    /// Transient failures worth repeating unchanged
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScopeError::Network { .. } | ScopeError::RateLimit { .. }
        )
    }

    /// Suggested wait before the next attempt, for recoverable errors only
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            ScopeError::Network { .. } => Some(1000),
            ScopeError::RateLimit { retry_after_ms, .. } => retry_after_ms.or(Some(5000)),
            _ => None,
        }
    }

    /// Emit the error as a tracing event; transient and lookup failures are warnings
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        let component = self.context().map(|c| c.component.as_str());
        match self {
            ScopeError::Network { .. } | ScopeError::RateLimit { .. } => {
                warn!(?error_id, ?component, error = %self, "Transient failure");
            }
            ScopeError::NotFound { .. } => {
                warn!(?error_id, ?component, error = %self, "Nothing found");
            }
            ScopeError::Config { .. } | ScopeError::Authentication { .. } => {
                error!(?error_id, ?component, error = %self, "Fix the configuration or credentials");
            }
            _ => {
                error!(?error_id, ?component, error = %self, "Operation failed");
            }
        }
    }
}

/// Build a `ScopeError` with a fresh context for `component`
#[macro_export]
macro_rules! repository_error {
    ($msg:expr, $component:expr) => {
        $crate::ScopeError::Repository {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ScopeError::Repository {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ScopeError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'reposcope config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::ScopeError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the repository name or path"),
        }
    };
}
