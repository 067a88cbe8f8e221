//! Jsonshape Core - runtime schema engine for JSON-compatible values
//!
//! This crate checks dynamically-shaped values against declarative schemas
//! and computes schema-guided diffs between two versions of a value:
//! - **Validation**: every violation of a value against its schema, with paths
//! - **Fallbacks**: optional in-place substitution of declared defaults
//! - **Diffing**: a tree of add/modify/unset changes between two values
//! - **Assertions**: validation turned into a single failure carrying every issue
//! - **Deep equality** and **cycle detection** for arbitrary values
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonshape_core::{validate, Schema, ValidateOptions, Value};
//! use serde_json::json;
//!
//! let schema: Schema = Schema::object()
//!     .prop("name", Schema::string())
//!     .prop("port", Schema::integer().min_value(1.0).fallback(8080))
//!     .into();
//!
//! let mut slot = Some(Value::from(json!({"name": "api"})));
//! let issues = validate(&mut slot, &schema, &ValidateOptions::new().with_fallback(true));
//!
//! assert!(issues.is_empty());
//! assert_eq!(slot, Some(Value::from(json!({"name": "api", "port": 8080}))));
//! ```
//!
//! ## Diffing
//!
//! ```rust
//! use jsonshape_core::{compare, Action, CompareOptions, Schema, Value};
//! use serde_json::json;
//!
//! let schema: Schema = Schema::array().item(Schema::number()).into();
//! let before = Value::from(json!([1, 2, 3]));
//! let after = Value::from(json!([2, 3, 4]));
//!
//! let diff = compare(Some(&before), Some(&after), &schema, &CompareOptions::new()).unwrap();
//! assert_eq!(diff.action, Action::Modify);
//! ```
//!
//! ## Missing values
//!
//! A missing value ("undefined") is `Option::None` wherever a slot may be
//! absent; `Value::Null` is an explicit null. Objects keep insertion order
//! and deep equality observes it.
//!
//! Copyright (c) 2025 Jsonshape Team
//! Licensed under the Apache-2.0 license

pub mod assertion;
pub mod classify;
pub mod differ;
pub mod equality;
pub mod error;
pub mod patterns;
pub mod schema;
pub mod validator;
pub mod value;

// Re-export commonly used types for convenience
pub use assertion::{assert, AssertOptions};
pub use classify::Kind;
pub use differ::{compare, Action, CompareOptions, Diff, DiffChildren};
pub use equality::{is_cyclic, is_deep_equal};
pub use error::{AssertionError, Error, Issue, Result};
pub use patterns::Pattern;
pub use schema::{
    AnySchema, ArraySchema, BooleanSchema, FunctionSchema, IntegerSchema, Modifiers, NumberSchema,
    ObjectSchema, Schema, SchemaKind, StringSchema, TupleSchema, ValidateHook,
};
pub use validator::{validate, validate_value, ValidateOptions};
pub use value::{Callable, Map, SharedValue, Value};

/// Version of the jsonshape-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
