//! Type classification predicates
//!
//! Every predicate is total: it answers for any input, looks through
//! shared nodes, and never panics. Predicates taking `Option<&Value>`
//! treat `None` as the missing ("undefined") slot.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime kind of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Date,
    Function,
    Array,
    Object,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Date => "date",
            Kind::Function => "function",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        self.with_resolved(|value| match value {
            Value::Null | Value::Shared(_) => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Date(_) => Kind::Date,
            Value::Function(_) => Kind::Function,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        })
    }
}

pub fn is_object(value: &Value) -> bool {
    value.kind() == Kind::Object
}

pub fn is_array(value: &Value) -> bool {
    value.kind() == Kind::Array
}

pub fn is_function(value: &Value) -> bool {
    value.kind() == Kind::Function
}

pub fn is_string(value: &Value) -> bool {
    value.kind() == Kind::String
}

/// Finite numbers only
pub fn is_number(value: &Value) -> bool {
    value.with_resolved(|value| matches!(value, Value::Number(n) if n.is_finite()))
}

/// Finite whole numbers
pub fn is_integer(value: &Value) -> bool {
    value.with_resolved(|value| matches!(value, Value::Number(n) if n.is_finite() && n.fract() == 0.0))
}

pub fn is_date(value: &Value) -> bool {
    value.kind() == Kind::Date
}

pub fn is_bool(value: &Value) -> bool {
    value.kind() == Kind::Bool
}

/// Neither missing nor null
pub fn is_set(value: Option<&Value>) -> bool {
    matches!(value, Some(value) if !value.is_null())
}

pub fn is_not_set(value: Option<&Value>) -> bool {
    !is_set(value)
}

/// Missing, null, or the empty string
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(value) => value.with_resolved(|value| match value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            _ => false,
        }),
    }
}

/// A string with at least one character
pub fn is_non_empty(value: &Value) -> bool {
    value.with_resolved(|value| matches!(value, Value::String(text) if !text.is_empty()))
}

/// `value` when set, otherwise `other`
pub fn if_not_set<'a>(value: Option<&'a Value>, other: &'a Value) -> &'a Value {
    match value {
        Some(value) if is_set(Some(value)) => value,
        _ => other,
    }
}

/// `value` when it is a non-empty string, otherwise `other`
pub fn if_empty<'a>(value: Option<&'a Value>, other: &'a Value) -> &'a Value {
    match value {
        Some(value) if is_non_empty(value) => value,
        _ => other,
    }
}

/// String length in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
