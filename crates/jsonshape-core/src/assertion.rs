//! Assert wrapper: validation as a hard failure

use crate::error::AssertionError;
use crate::schema::Schema;
use crate::validator::{validate, ValidateOptions};
use crate::value::Value;
use tracing::warn;

/// Options for [`assert`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertOptions {
    pub partial: bool,
    pub fallback: bool,
    /// Prefix for the failure message
    pub description: Option<String>,
}

impl AssertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Validate `value` and hand it back, or fail with every issue found
///
/// With fallback substitution on, a missing `value` starts from the
/// schema's fallback, and the returned value carries every substitution
/// made below it.
pub fn assert(
    value: Option<Value>,
    schema: &Schema,
    options: &AssertOptions,
) -> Result<Option<Value>, AssertionError> {
    let mut slot = match value {
        None if options.fallback => schema.modifiers().fallback.clone(),
        value => value,
    };

    let validate_options = ValidateOptions {
        partial: options.partial,
        fallback: options.fallback,
    };
    let issues = validate(&mut slot, schema, &validate_options);
    if issues.is_empty() {
        return Ok(slot);
    }

    let error = AssertionError::new(options.description.as_deref(), issues);
    warn!(issues = error.issues.len(), "{}", error.message);
    Err(error)
}
