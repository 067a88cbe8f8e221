//! Schema model
//!
//! A [`Schema`] is a closed sum type tagged by `type`. Each variant carries
//! its own struct with the constraints that apply to that kind plus a
//! flattened [`Modifiers`] block shared by every kind.
//!
//! Schemas are built in code with the builder functions on [`Schema`]:
//!
//! ```
//! use jsonshape_core::Schema;
//!
//! let user = Schema::object()
//!     .prop("name", Schema::string().min_length(1))
//!     .prop("age", Schema::integer().min_value(0.0).optional())
//!     .arbitrary(false);
//! ```
//!
//! or loaded from a document whose field names follow the camelCase layout
//! (`allowEmpty`, `minLength`, `oneOf`, ...). Custom validate hooks and
//! function-typed `equal`/`oneOf` only exist in code.
//!
//! Copyright (c) 2025 Jsonshape Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Issue, Result};
use crate::patterns::Pattern;
use crate::value::{Callable, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

type HookFn = dyn Fn(&Value) -> Vec<Issue> + Send + Sync;

/// Custom validation callback attached to a schema node
///
/// Invoked with the already type-checked value; the returned issue paths
/// are relative to the node.
#[derive(Clone)]
pub struct ValidateHook(Arc<HookFn>);

impl ValidateHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Value) -> Vec<Issue> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn call(&self, value: &Value) -> Vec<Issue> {
        (self.0)(value)
    }
}

impl fmt::Debug for ValidateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidateHook(..)")
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Modifiers shared by every schema kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    /// A missing value is acceptable
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,

    /// A null value is acceptable
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    /// Substituted for a missing value when fallback substitution is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Value>,

    #[serde(skip)]
    pub validate: Option<ValidateHook>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringSchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberSchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<f64>>,
}

/// Number constraints restricted to whole values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegerSchema(pub NumberSchema);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanSchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<bool>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    #[serde(skip)]
    pub equal: Option<Callable>,
    #[serde(skip)]
    pub one_of: Option<Vec<Callable>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnySchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    /// Declared properties, checked in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<IndexMap<String, Schema>>,
    /// Schema applied to every property present on the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Box<Schema>>,
    /// Whether undeclared properties are allowed; defaults to `props.is_none()`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbitrary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
}

impl ObjectSchema {
    pub fn allows_arbitrary(&self) -> bool {
        self.arbitrary.unwrap_or(self.props.is_none())
    }

    pub fn declares(&self, name: &str) -> bool {
        self.props.as_ref().is_some_and(|props| props.contains_key(name))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    /// Schema of every element; arrays without one are untracked by diffing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<Schema>>,
    /// Property correlating object elements across diff sides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleSchema {
    #[serde(flatten)]
    pub modifiers: Modifiers,
    /// Positional element schemas
    #[serde(default)]
    pub items: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,
}

/// A declarative description of an expected value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Integer(IntegerSchema),
    Boolean(BooleanSchema),
    Function(FunctionSchema),
    Any(AnySchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
}

/// The `type` tag of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Function,
    Any,
    Object,
    Array,
    Tuple,
}

impl SchemaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Integer => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Function => "function",
            SchemaKind::Any => "any",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::Tuple => "tuple",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Schema {
    pub fn string() -> StringSchema {
        StringSchema::default()
    }

    pub fn number() -> NumberSchema {
        NumberSchema::default()
    }

    pub fn integer() -> IntegerSchema {
        IntegerSchema::default()
    }

    pub fn boolean() -> BooleanSchema {
        BooleanSchema::default()
    }

    pub fn function() -> FunctionSchema {
        FunctionSchema::default()
    }

    pub fn any() -> AnySchema {
        AnySchema::default()
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::default()
    }

    pub fn array() -> ArraySchema {
        ArraySchema::default()
    }

    pub fn tuple<I, S>(items: I) -> TupleSchema
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        TupleSchema {
            items: items.into_iter().map(Into::into).collect(),
            ..TupleSchema::default()
        }
    }

    /// Decode a schema document
    pub fn from_json(document: serde_json::Value) -> Result<Self> {
        serde_json::from_value(document).map_err(|e| Error::json("invalid schema document", e))
    }

    /// Decode a schema document from text
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::json("invalid schema document", e))
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::String(_) => SchemaKind::String,
            Schema::Number(_) => SchemaKind::Number,
            Schema::Integer(_) => SchemaKind::Integer,
            Schema::Boolean(_) => SchemaKind::Boolean,
            Schema::Function(_) => SchemaKind::Function,
            Schema::Any(_) => SchemaKind::Any,
            Schema::Object(_) => SchemaKind::Object,
            Schema::Array(_) => SchemaKind::Array,
            Schema::Tuple(_) => SchemaKind::Tuple,
        }
    }

    pub fn modifiers(&self) -> &Modifiers {
        match self {
            Schema::String(s) => &s.modifiers,
            Schema::Number(s) => &s.modifiers,
            Schema::Integer(s) => &s.0.modifiers,
            Schema::Boolean(s) => &s.modifiers,
            Schema::Function(s) => &s.modifiers,
            Schema::Any(s) => &s.modifiers,
            Schema::Object(s) => &s.modifiers,
            Schema::Array(s) => &s.modifiers,
            Schema::Tuple(s) => &s.modifiers,
        }
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers {
        match self {
            Schema::String(s) => &mut s.modifiers,
            Schema::Number(s) => &mut s.modifiers,
            Schema::Integer(s) => &mut s.0.modifiers,
            Schema::Boolean(s) => &mut s.modifiers,
            Schema::Function(s) => &mut s.modifiers,
            Schema::Any(s) => &mut s.modifiers,
            Schema::Object(s) => &mut s.modifiers,
            Schema::Array(s) => &mut s.modifiers,
            Schema::Tuple(s) => &mut s.modifiers,
        }
    }
}

trait HasModifiers {
    fn modifiers_mut(&mut self) -> &mut Modifiers;
}

macro_rules! modifier_setters {
    ($($ty:ty => |$this:ident| $field:expr),+ $(,)?) => {
        $(
            impl HasModifiers for $ty {
                fn modifiers_mut(&mut self) -> &mut Modifiers {
                    let $this = self;
                    $field
                }
            }

            impl $ty {
                pub fn optional(mut self) -> Self {
                    HasModifiers::modifiers_mut(&mut self).optional = true;
                    self
                }

                pub fn nullable(mut self) -> Self {
                    HasModifiers::modifiers_mut(&mut self).nullable = true;
                    self
                }

                pub fn fallback(mut self, value: impl Into<Value>) -> Self {
                    HasModifiers::modifiers_mut(&mut self).fallback = Some(value.into());
                    self
                }

                pub fn validate_with<F>(mut self, hook: F) -> Self
                where
                    F: Fn(&Value) -> Vec<Issue> + Send + Sync + 'static,
                {
                    HasModifiers::modifiers_mut(&mut self).validate = Some(ValidateHook::new(hook));
                    self
                }
            }
        )+
    };
}

modifier_setters! {
    Schema => |this| Schema::modifiers_mut(this),
    StringSchema => |this| &mut this.modifiers,
    NumberSchema => |this| &mut this.modifiers,
    IntegerSchema => |this| &mut this.0.modifiers,
    BooleanSchema => |this| &mut this.modifiers,
    FunctionSchema => |this| &mut this.modifiers,
    AnySchema => |this| &mut this.modifiers,
    ObjectSchema => |this| &mut this.modifiers,
    ArraySchema => |this| &mut this.modifiers,
    TupleSchema => |this| &mut this.modifiers,
}

impl StringSchema {
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn matches(mut self, pattern: Pattern) -> Self {
        self.matches = Some(pattern);
        self
    }

    pub fn equal(mut self, expected: impl Into<String>) -> Self {
        self.equal = Some(expected.into());
        self
    }

    pub fn one_of<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(candidates.into_iter().map(Into::into).collect());
        self
    }
}

macro_rules! number_setters {
    ($($ty:ty => |$this:ident| $inner:expr),+ $(,)?) => {
        $(
            impl $ty {
                pub fn min_value(mut self, bound: f64) -> Self {
                    let $this = &mut self;
                    $inner.min_value = Some(bound);
                    self
                }

                pub fn max_value(mut self, bound: f64) -> Self {
                    let $this = &mut self;
                    $inner.max_value = Some(bound);
                    self
                }

                pub fn equal(mut self, expected: f64) -> Self {
                    let $this = &mut self;
                    $inner.equal = Some(expected);
                    self
                }

                pub fn one_of(mut self, candidates: impl IntoIterator<Item = f64>) -> Self {
                    let $this = &mut self;
                    $inner.one_of = Some(candidates.into_iter().collect());
                    self
                }
            }
        )+
    };
}

number_setters! {
    NumberSchema => |this| this,
    IntegerSchema => |this| this.0,
}

impl BooleanSchema {
    pub fn equal(mut self, expected: bool) -> Self {
        self.equal = Some(expected);
        self
    }

    pub fn one_of(mut self, candidates: impl IntoIterator<Item = bool>) -> Self {
        self.one_of = Some(candidates.into_iter().collect());
        self
    }
}

impl FunctionSchema {
    pub fn equal(mut self, expected: Callable) -> Self {
        self.equal = Some(expected);
        self
    }

    pub fn one_of(mut self, candidates: impl IntoIterator<Item = Callable>) -> Self {
        self.one_of = Some(candidates.into_iter().collect());
        self
    }
}

macro_rules! value_setters {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                pub fn equal(mut self, expected: impl Into<Value>) -> Self {
                    self.equal = Some(expected.into());
                    self
                }

                pub fn one_of<I, V>(mut self, candidates: I) -> Self
                where
                    I: IntoIterator<Item = V>,
                    V: Into<Value>,
                {
                    self.one_of = Some(candidates.into_iter().map(Into::into).collect());
                    self
                }
            }
        )+
    };
}

value_setters!(AnySchema, ObjectSchema, ArraySchema, TupleSchema);

impl ObjectSchema {
    /// Declare a property
    pub fn prop(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.props
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), schema.into());
        self
    }

    pub fn entry(mut self, schema: impl Into<Schema>) -> Self {
        self.entry = Some(Box::new(schema.into()));
        self
    }

    pub fn arbitrary(mut self, allowed: bool) -> Self {
        self.arbitrary = Some(allowed);
        self
    }
}

impl ArraySchema {
    pub fn item(mut self, schema: impl Into<Schema>) -> Self {
        self.item = Some(Box::new(schema.into()));
        self
    }

    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.key = Some(name.into());
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }
}

macro_rules! into_schema {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Schema {
                fn from(schema: $ty) -> Self {
                    Schema::$variant(schema)
                }
            }
        )+
    };
}

into_schema! {
    StringSchema => String,
    NumberSchema => Number,
    IntegerSchema => Integer,
    BooleanSchema => Boolean,
    FunctionSchema => Function,
    AnySchema => Any,
    ObjectSchema => Object,
    ArraySchema => Array,
    TupleSchema => Tuple,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders_produce_tagged_variants() {
        let schema: Schema = Schema::object()
            .prop("id", Schema::integer().min_value(1.0))
            .prop("tags", Schema::array().item(Schema::string()).optional())
            .into();

        assert_eq!(schema.kind(), SchemaKind::Object);
        let Schema::Object(object) = &schema else {
            panic!("expected object schema");
        };
        assert!(!object.allows_arbitrary());
        assert!(object.declares("tags"));
        let props = object.props.as_ref().unwrap();
        assert_eq!(props["id"].kind(), SchemaKind::Integer);
        assert!(props["tags"].modifiers().optional);
    }

    #[test]
    fn test_arbitrary_defaults_to_missing_props() {
        assert!(Schema::object().allows_arbitrary());
        assert!(!Schema::object().prop("a", Schema::any()).allows_arbitrary());
        assert!(Schema::object().prop("a", Schema::any()).arbitrary(true).allows_arbitrary());
    }

    #[test]
    fn test_document_round_trip_uses_camel_case() {
        let document = json!({
            "type": "object",
            "props": {
                "name": {"type": "string", "minLength": 2, "allowEmpty": true, "matches": "@slug"},
                "age": {"type": "integer", "maxValue": 150.5, "optional": true},
                "pair": {"type": "tuple", "items": [{"type": "number"}, {"type": "boolean", "nullable": true}]}
            },
            "arbitrary": false
        });
        let schema = Schema::from_json(document.clone()).unwrap();

        let Schema::Object(object) = &schema else {
            panic!("expected object schema");
        };
        let props = object.props.as_ref().unwrap();
        let Schema::String(name) = &props["name"] else {
            panic!("expected string schema");
        };
        assert_eq!(name.min_length, Some(2));
        assert!(name.allow_empty);
        assert_eq!(name.matches.as_ref().and_then(Pattern::name), Some("slug"));
        assert!(props["age"].modifiers().optional);
        assert_eq!(props["pair"].kind(), SchemaKind::Tuple);

        assert_eq!(serde_json::to_value(&schema).unwrap(), document);
    }

    #[test]
    fn test_unknown_named_pattern_is_rejected() {
        let result = Schema::from_json(json!({"type": "string", "matches": "@nothing"}));
        assert!(matches!(result, Err(Error::Json { .. })));
    }

    #[test]
    fn test_fallback_document_field() {
        let schema = Schema::from_json(json!({"type": "any", "fallback": {"a": [1]}})).unwrap();
        assert_eq!(schema.modifiers().fallback, Some(Value::from(json!({"a": [1]}))));
    }
}
