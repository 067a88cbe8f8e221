//! Logging utilities for the Jsonshape CLI
//!
//! This module provides:
//! - Request ID generation and tracking
//! - Redaction of sensitive document fields before they are traced
//! - Performance timing spans
//! - Structured logging setup (console or file, compact/full/json)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Global request ID for the current session
static REQUEST_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable console output
    pub console: bool,
    /// Optional file output path
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for everyday use
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {
                config.level = "warn".to_string();
            }
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the `[logging]` section of the configuration file
    ///
    /// The file's level only applies when no `-v` flag raised verbosity.
    pub fn merge_with_file(&mut self, file: &crate::config::LoggingConfig, verbosity: u8) {
        if verbosity == 0 {
            self.level = file.level.clone();
        }
        match LogFormat::parse(&file.format) {
            Some(format) => self.format = format,
            None => tracing::warn!("Invalid log format in config: {}", file.format),
        }
        if file.file.is_some() {
            self.file = file.file.clone();
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("JSONSHAPE_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }

        if let Ok(file) = std::env::var("JSONSHAPE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }
}

/// Open the log file appender; the file is appended to and never rotated
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::config(format!("Log file path has no file name: {}", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .map_err(|e| Error::other(format!("Failed to open log file {}: {}", path.display(), e)))
}

/// Initialize the global logging system
///
/// Log lines are written by a background worker. The returned guard flushes
/// it on drop, so keep it alive until the process exits.
pub fn init_logging(config: LoggingConfig) -> Result<WorkerGuard> {
    let env_filter = create_env_filter(&config)?;

    let (sink, guard) = match &config.file {
        Some(path) => tracing_appender::non_blocking(file_appender(path)?),
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    let ansi = config.console && config.file.is_none() && std::io::stderr().is_terminal();

    // Different subscriber per format to avoid type conflicts
    let installed = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(sink)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .compact()
                .finish(),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(sink)
                .with_target(true)
                .with_ansi(false)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .json()
                .finish(),
        ),
        LogFormat::Full => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(sink)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .finish(),
        ),
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let request_id = generate_request_id();
    REQUEST_ID
        .set(request_id.clone())
        .map_err(|_| Error::other("Failed to set request ID"))?;

    tracing::debug!(
        request_id = %request_id,
        config = ?config,
        "Logging system initialized"
    );

    Ok(guard)
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))
}

/// Generate a unique request ID for this session
pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Get the current request ID
pub fn current_request_id() -> Option<&'static str> {
    REQUEST_ID.get().map(|s| s.as_str())
}

/// Create a span with request ID and timing
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        request_id = current_request_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Sensitive data redaction for traced documents
pub mod redaction {
    use regex::Regex;
    use std::sync::OnceLock;

    static INLINE_SECRET: OnceLock<Option<Regex>> = OnceLock::new();

    fn inline_secret() -> Option<&'static Regex> {
        INLINE_SECRET
            .get_or_init(|| {
                Regex::new(r#"(?i)(api[_-]?key|token|bearer|password|passwd|pwd|secret)[=:\s]+['"]?([^\s'",]{3,})['"]?"#).ok()
            })
            .as_ref()
    }

    /// Redact `key=value` style secrets embedded in free text
    pub fn redact_sensitive(input: &str) -> String {
        match inline_secret() {
            Some(regex) => regex.replace_all(input, "$1=***").into_owned(),
            None => input.to_string(),
        }
    }

    /// Redact sensitive fields of a JSON document in place
    pub fn redact_json_value(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) {
                        *val = serde_json::Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_json_value(item);
                }
            }
            serde_json::Value::String(s) => {
                *s = redact_sensitive(s);
            }
            _ => {}
        }
    }

    /// A redacted copy, for trace output
    pub fn redacted(value: &serde_json::Value) -> serde_json::Value {
        let mut copy = value.clone();
        redact_json_value(&mut copy);
        copy
    }

    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        ["key", "token", "password", "passwd", "secret", "credential", "auth"]
            .iter()
            .any(|needle| key_lower.contains(needle))
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when finished or dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
        finished: bool,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self::start(operation, None)
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self::start(operation, Some(details))
        }

        fn start(operation: &str, details: Option<&str>) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, details),
                operation: operation.to_string(),
                finished: false,
            }
        }

        /// Finish the timer and log the duration
        pub fn finish(mut self) {
            self.finished = true;
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::info!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            if self.finished {
                return;
            }
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed (auto-timed)"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_redaction() {
        let input = "api_key=sk-1234567890abcdef token=bearer_xyz password=secret123";
        let redacted = redaction::redact_sensitive(input);
        assert!(redacted.contains("api_key=***"));
        assert!(redacted.contains("token=***"));
        assert!(redacted.contains("password=***"));
        assert!(!redacted.contains("sk-1234567890abcdef"));
        assert!(!redacted.contains("bearer_xyz"));
        assert!(!redacted.contains("secret123"));
    }

    #[test]
    fn test_document_redaction() {
        let document = json!({
            "user": "ada",
            "password": "hunter2",
            "db": {"authToken": "abc", "host": "localhost"},
            "replicas": [{"secret": "s"}]
        });

        let redacted = redaction::redacted(&document);

        assert_eq!(redacted["user"], "ada");
        assert_eq!(redacted["password"], "***");
        assert_eq!(redacted["db"]["authToken"], "***");
        assert_eq!(redacted["db"]["host"], "localhost");
        assert_eq!(redacted["replicas"][0]["secret"], "***");
        assert_eq!(document["password"], "hunter2");
    }

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Full);
        assert!(config.thread_ids);
    }

    #[test]
    fn test_file_settings_respect_verbosity() {
        let file = crate::config::LoggingConfig {
            level: "error".to_string(),
            format: "json".to_string(),
            file: None,
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.merge_with_file(&file, 0);
        assert_eq!(quiet.level, "error");
        assert_eq!(quiet.format, LogFormat::Json);

        let mut verbose = LoggingConfig::from_verbosity(2);
        verbose.merge_with_file(&file, 2);
        assert_eq!(verbose.level, "debug");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = generate_request_id();
        let b = generate_request_id();
        assert!(a.starts_with("req_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_appender_appends_to_the_named_file() {
        use std::io::Write;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("jsonshape.log");
        std::fs::write(&path, "first\n").unwrap();

        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"second\n").unwrap();
        appender.flush().unwrap();
        drop(appender);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_file_appender_needs_a_file_name() {
        assert!(matches!(file_appender(Path::new("/")), Err(Error::Config(_))));
    }
}
