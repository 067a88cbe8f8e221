//! Error and issue types for the jsonshape engine
//!
//! Validation and diffing never fail: they report problems as data
//! ([`Issue`] lists and diff trees). The [`Error`] enum covers the few
//! places where the engine does signal a hard failure: compiling patterns,
//! loading schema documents, and the assert wrapper.
//!
//! Copyright (c) 2025 Jsonshape Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for jsonshape operations
#[derive(Error, Debug)]
pub enum Error {
    /// A `matches` pattern failed to compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A `@name` pattern reference did not resolve
    #[error("Unknown named pattern: {0}")]
    UnknownPattern(String),

    /// The assert wrapper found issues
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// Schema or value document could not be decoded
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A single validation failure
///
/// `path` is the dotted/bracketed address of the offending slot relative to
/// the validation root (`""` for the root itself, `.name` for object
/// properties, `[i]` for array and tuple positions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Location of the failing slot
    pub path: String,
    /// Human-readable message
    pub message: String,
}

impl Issue {
    /// Create a new issue
    pub fn new<P, M>(path: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Failure raised by [`crate::assert`] when validation reports issues
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AssertionError {
    /// Aggregated message: optional description, `assertion failed:`, every issue
    pub message: String,
    /// The issues that caused the failure
    pub issues: Vec<Issue>,
}

impl AssertionError {
    /// Build the aggregated failure for a non-empty issue list
    pub fn new(description: Option<&str>, issues: Vec<Issue>) -> Self {
        let prefix = match description {
            Some(text) if !text.is_empty() => format!("{} ", text),
            _ => String::new(),
        };
        let rendered = issues
            .iter()
            .map(Issue::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            message: format!("{}assertion failed: {}", prefix, rendered),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display_omits_empty_path() {
        assert_eq!(Issue::new("", "value can't be null").to_string(), "value can't be null");
        assert_eq!(
            Issue::new(".a[0]", "value is not a string").to_string(),
            ".a[0]: value is not a string"
        );
    }

    #[test]
    fn test_assertion_message_aggregates_issues() {
        let error = AssertionError::new(
            Some("config"),
            vec![
                Issue::new("", "value is not an object"),
                Issue::new(".port", "value is less than 1"),
            ],
        );
        assert_eq!(
            error.to_string(),
            "config assertion failed: value is not an object, .port: value is less than 1"
        );
    }

    #[test]
    fn test_assertion_message_without_description() {
        let error = AssertionError::new(Some(""), vec![Issue::new(".a", "x")]);
        assert_eq!(error.message, "assertion failed: .a: x");
    }
}
