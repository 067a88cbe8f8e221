//! Dynamic value model
//!
//! [`Value`] is the engine's rendering of "any JSON-compatible value":
//! null, booleans, finite and non-finite numbers, strings, dates, opaque
//! functions, arrays and insertion-ordered objects. A missing slot is never
//! a `Value`; it is `Option::None` wherever a slot may be absent.
//!
//! Reference identity only exists for [`SharedValue`] nodes, which are the
//! only way to build a self-referencing (cyclic) structure.
//!
//! Copyright (c) 2025 Jsonshape Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered object representation
pub type Map = IndexMap<String, Value>;

type Func = dyn Fn(&[Value]) -> Value + Send + Sync;

/// An opaque function value
///
/// Two callables are equal only when they share the same allocation.
#[derive(Clone)]
pub struct Callable {
    name: String,
    func: Arc<Func>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.name)
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}", self.name)
    }
}

/// A value with reference identity
///
/// Cloning the handle shares the node. Storing a handle inside its own
/// content creates a cycle; such structures are never freed, so keep them
/// for data that lives as long as the process or break the cycle with
/// [`SharedValue::set`] when done.
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Clone of the current content
    pub fn get(&self) -> Value {
        self.0.read_recursive().clone()
    }

    /// Replace the content
    pub fn set(&self, value: Value) {
        *self.0.write() = value;
    }

    /// Mutate the content in place
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut guard = self.0.write();
        f(&mut guard)
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Recursive read so sibling occurrences of one node never deadlock
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read_recursive()
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.addr())
    }
}

/// A JSON-compatible dynamic value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Function(Callable),
    Array(Vec<Value>),
    Object(Map),
    Shared(SharedValue),
}

impl Value {
    /// Wrap in a new shared node
    pub fn shared(value: impl Into<Value>) -> Self {
        Value::Shared(SharedValue::new(value.into()))
    }

    /// Run `f` against this value with shared nodes resolved
    ///
    /// A shared node whose content leads back to itself without passing
    /// through a container resolves to `Null`.
    pub fn with_resolved<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        fn go<R, F: FnOnce(&Value) -> R>(value: &Value, seen: &mut Vec<usize>, f: F) -> R {
            match value {
                Value::Shared(node) if !seen.contains(&node.addr()) => {
                    seen.push(node.addr());
                    let inner = node.read();
                    go(&inner, seen, f)
                }
                Value::Shared(_) => f(&Value::Null),
                other => f(other),
            }
        }
        go(self, &mut Vec::new(), f)
    }

    pub fn is_null(&self) -> bool {
        self.with_resolved(|value| matches!(value, Value::Null))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Clone of an object property, looking through shared nodes
    pub fn get(&self, key: &str) -> Option<Value> {
        self.with_resolved(|value| match value {
            Value::Object(map) => map.get(key).cloned(),
            _ => None,
        })
    }
}

impl PartialEq for Value {
    /// Deep equality, see [`crate::is_deep_equal`]
    fn eq(&self, other: &Self) -> bool {
        crate::equality::is_deep_equal(self, other)
    }
}

/// Render a number the way messages show it
pub(crate) fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if number == 0.0 {
        "0".to_string()
    } else if number.abs() >= 1e21 || number.abs() < 1e-6 {
        let exponent = format!("{:e}", number);
        match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
            _ => exponent,
        }
    } else {
        format!("{}", number)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Number(number) => write!(f, "{}", format_number(*number)),
            Value::String(text) => write!(f, "{}", text),
            Value::Date(date) => write!(f, "{}", date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Function(callable) => write!(f, "{}", callable),
            Value::Array(_) | Value::Object(_) => match serde_json::to_string(self) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "[cyclic]"),
            },
            Value::Shared(_) => self.with_resolved(|inner| match inner {
                Value::Shared(_) => write!(f, "null"),
                Value::Array(_) | Value::Object(_) => match serde_json::to_string(self) {
                    Ok(json) => write!(f, "{}", json),
                    Err(_) => write!(f, "[cyclic]"),
                },
                other => write!(f, "{}", other),
            }),
        }
    }
}

struct Guarded<'a> {
    value: &'a Value,
    ancestors: &'a RefCell<Vec<usize>>,
}

impl Serialize for Guarded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value {
            Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(flag) => serializer.serialize_bool(*flag),
            Value::Number(number) if !number.is_finite() => serializer.serialize_unit(),
            Value::Number(number) if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 => {
                serializer.serialize_i64(*number as i64)
            }
            Value::Number(number) => serializer.serialize_f64(*number),
            Value::String(text) => serializer.serialize_str(text),
            Value::Date(date) => {
                serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Guarded {
                        value: item,
                        ancestors: self.ancestors,
                    })?;
                }
                seq.end()
            }
            Value::Object(map) => {
                // function-valued properties are dropped, as in JSON text
                let mut out = serializer.serialize_map(None)?;
                for (key, item) in map {
                    if item.with_resolved(|v| matches!(v, Value::Function(_))) {
                        continue;
                    }
                    out.serialize_entry(
                        key,
                        &Guarded {
                            value: item,
                            ancestors: self.ancestors,
                        },
                    )?;
                }
                out.end()
            }
            Value::Shared(node) => {
                let addr = node.addr();
                if self.ancestors.borrow().contains(&addr) {
                    return Err(S::Error::custom("cannot serialize a cyclic value"));
                }
                self.ancestors.borrow_mut().push(addr);
                let inner = node.read();
                let result = Guarded {
                    value: &inner,
                    ancestors: self.ancestors,
                }
                .serialize(serializer);
                self.ancestors.borrow_mut().pop();
                result
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ancestors = RefCell::new(Vec::new());
        Guarded {
            value: self,
            ancestors: &ancestors,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => Value::Number(number.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(key, item)| (key, Value::from(item))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

macro_rules! from_integer {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(number: $ty) -> Self {
                    Value::Number(number as f64)
                }
            }
        )+
    };
}

from_integer!(i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Value::Date(date)
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Function(callable)
    }
}

impl From<SharedValue> for Value {
    fn from(node: SharedValue) -> Self {
        Value::Shared(node)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cyclic() -> SharedValue {
        let node = SharedValue::new(Value::Object(Map::new()));
        let handle = node.clone();
        node.update(|value| {
            if let Value::Object(map) = value {
                map.insert("me".to_string(), Value::Shared(handle));
            }
        });
        node
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_serialize_whole_numbers_as_integers() {
        let value = Value::from(json!({"a": 5, "b": 1.5, "c": [true, null]}));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"a":5,"b":1.5,"c":[true,null]}"#);
    }

    #[test]
    fn test_serialize_drops_function_properties() {
        let mut map = Map::new();
        map.insert("f".into(), Value::from(Callable::new("f", |_| Value::Null)));
        map.insert("n".into(), Value::from(1));
        assert_eq!(serde_json::to_string(&Value::Object(map)).unwrap(), r#"{"n":1}"#);
    }

    #[test]
    fn test_serialize_rejects_cycles() {
        let value = Value::Shared(cyclic());
        assert!(serde_json::to_string(&value).is_err());
    }

    #[test]
    fn test_shared_diamond_serializes_twice() {
        let node = SharedValue::new(Value::from(7));
        let value = Value::from(vec![Value::Shared(node.clone()), Value::Shared(node)]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "[7,7]");
    }

    #[test]
    fn test_self_only_shared_loop_resolves_to_null() {
        let node = SharedValue::new(Value::Null);
        node.set(Value::Shared(node.clone()));
        assert!(Value::Shared(node).is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(5.0).to_string(), "5");
        assert_eq!(Value::from(0.25).to_string(), "0.25");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from("raw").to_string(), "raw");
        assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_numbers_switch_to_exponent_notation_at_the_edges() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_callable_identity() {
        let f = Callable::new("f", |args| args.first().cloned().unwrap_or_default());
        let same = f.clone();
        let other = Callable::new("f", |_| Value::Null);
        assert_eq!(f, same);
        assert_ne!(f, other);
        assert_eq!(f.call(&[Value::from(3)]), Value::from(3));
    }
}
