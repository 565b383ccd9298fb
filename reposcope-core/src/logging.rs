//! Logging setup
//!
//! `tracing` events go to stderr (or a file) so stdout stays free for the
//! skip prompt, progress lines and printed cards.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` takes precedence when set
    pub level: String,
    pub format: LogFormat,
    /// Source file and line of each event
    pub include_location: bool,
    pub include_thread: bool,
    /// Append to `log_file_path` instead of writing to stderr
    pub log_to_file: bool,
    pub log_file_path: Option<String>,
    /// Emit span close events with their busy/idle time
    pub enable_performance_monitoring: bool,
    /// Extra `EnvFilter` directives such as `reposcope_repo=trace`
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_to_file: false,
            log_file_path: None,
            enable_performance_monitoring: false,
            filter_directives: Vec::new(),
        }
    }
}

impl LoggingConfig {
    /// Debug output for every reposcope crate
    pub fn verbose() -> Self {
        let crates = [
            "reposcope",
            "reposcope_core",
            "reposcope_repo",
            "reposcope_analysis",
            "reposcope_llm",
            "reposcope_report",
        ];
        Self {
            level: "debug".to_string(),
            include_location: true,
            filter_directives: crates.iter().map(|c| format!("{}=debug", c)).collect(),
            ..Self::default()
        }
    }

    fn filter(&self) -> Result<EnvFilter, Box<dyn Error + Send + Sync>> {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        for directive in &self.filter_directives {
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }

    /// Destination of formatted events and whether it understands ANSI colours
    fn writer(&self) -> Result<(BoxMakeWriter, bool), Box<dyn Error + Send + Sync>> {
        if !self.log_to_file {
            return Ok((BoxMakeWriter::new(io::stderr), true));
        }

        let path = self
            .log_file_path
            .as_deref()
            .ok_or("log_file_path must be set when log_to_file is enabled")?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok((BoxMakeWriter::new(Mutex::new(file)), false))
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (writer, ansi) = config.writer()?;
    let span_events = if config.enable_performance_monitoring {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_span_events(span_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread);

    let registry = tracing_subscriber::registry().with(config.filter()?);
    match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init()?,
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
        LogFormat::Compact => registry.with(layer.compact()).try_init()?,
    }

    Ok(())
}

/// Start/success/failure events sharing an `operation` field
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Operation started"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Operation started"
        );
    };
}

#[macro_export]
macro_rules! log_operation_success {
    ($operation:expr) => {
        tracing::info!(
            operation = $operation,
            "Operation finished"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info!(
            operation = $operation,
            $($field)*,
            "Operation finished"
        );
    };
}

#[macro_export]
macro_rules! log_operation_error {
    ($operation:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "Operation failed"
        );
    };
    ($operation:expr, $error:expr, $($field:tt)*) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            $($field)*,
            "Operation failed"
        );
    };
}
