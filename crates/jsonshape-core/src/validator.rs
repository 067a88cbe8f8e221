//! Schema validation
//!
//! Walks a value against a [`Schema`] and accumulates every [`Issue`] it
//! finds; nothing is fail-fast within a node. With fallback substitution
//! enabled, missing slots whose schema declares a fallback are written in
//! place and the written value is validated, so the caller's value is
//! mutated.
//!
//! Paths are built as `.name` for object properties and `[i]` for array
//! and tuple positions, starting from `""` at the root.

use crate::classify::{is_integer, is_number, utf16_len};
use crate::equality::is_deep_equal;
use crate::error::Issue;
use crate::schema::{
    AnySchema, ArraySchema, BooleanSchema, FunctionSchema, Modifiers, NumberSchema, ObjectSchema, Schema,
    StringSchema, TupleSchema,
};
use crate::value::{format_number, Map, Value};
use tracing::{debug, trace};

/// Options controlling a validation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Missing values are acceptable everywhere
    pub partial: bool,
    /// Substitute declared fallbacks for missing values
    pub fallback: bool,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with partial mode on
    pub fn partial() -> Self {
        Self {
            partial: true,
            ..Self::default()
        }
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Validate the value in `slot` against `schema`
///
/// `None` is the missing value. A root fallback is written into `slot`.
pub fn validate(slot: &mut Option<Value>, schema: &Schema, options: &ValidateOptions) -> Vec<Issue> {
    debug!(
        schema = %schema.kind(),
        value = ?slot.as_ref().map(|v| v.kind()),
        partial = options.partial,
        fallback = options.fallback,
        "validating value"
    );

    let mut walker = Walker {
        options: *options,
        substitutions: 0,
    };
    let issues = walker.check(Slot::Root(slot), schema, "");

    debug!(
        issues = issues.len(),
        substitutions = walker.substitutions,
        "validation finished"
    );
    issues
}

/// Validate without substitution and without touching `value`
pub fn validate_value(value: &Value, schema: &Schema) -> Vec<Issue> {
    let mut slot = Some(value.clone());
    validate(&mut slot, schema, &ValidateOptions::default())
}

/// Location a value is read from and a fallback is written to
enum Slot<'a> {
    Root(&'a mut Option<Value>),
    Prop(&'a mut Map, &'a str),
    Index(&'a mut Vec<Value>, usize),
}

impl Slot<'_> {
    fn get_mut(&mut self) -> Option<&mut Value> {
        match self {
            Slot::Root(value) => value.as_mut(),
            Slot::Prop(map, key) => map.get_mut(*key),
            Slot::Index(items, index) => items.get_mut(*index),
        }
    }

    fn fill(&mut self, value: Value) {
        match self {
            Slot::Root(slot) => **slot = Some(value),
            Slot::Prop(map, key) => {
                map.insert((*key).to_string(), value);
            }
            Slot::Index(items, index) => {
                if *index < items.len() {
                    items[*index] = value;
                } else {
                    // holes before the position become null
                    items.resize(*index, Value::Null);
                    items.push(value);
                }
            }
        }
    }
}

struct Walker {
    options: ValidateOptions,
    substitutions: usize,
}

impl Walker {
    fn check(&mut self, mut slot: Slot<'_>, schema: &Schema, path: &str) -> Vec<Issue> {
        let modifiers = schema.modifiers();

        if let Some(value) = slot.get_mut() {
            if !value.is_null() {
                return self.check_value(value, schema, path);
            }
            return if modifiers.nullable {
                Vec::new()
            } else {
                vec![Issue::new(path, "value can't be null")]
            };
        }

        if modifiers.optional || self.options.partial {
            return Vec::new();
        }

        match &modifiers.fallback {
            Some(fallback) if self.options.fallback => {
                trace!(path, "substituting fallback");
                slot.fill(fallback.clone());
                self.substitutions += 1;
                self.check(slot, schema, path)
            }
            _ => vec![Issue::new(path, "value can't be undefined")],
        }
    }

    fn check_value(&mut self, value: &mut Value, schema: &Schema, path: &str) -> Vec<Issue> {
        if let Value::Shared(node) = &*value {
            // no lock is held while the walk runs, so the node's own
            // content may reach it again
            let node = node.clone();
            let mut snapshot = node.get();
            let before = self.substitutions;
            let issues = self.check_value(&mut snapshot, schema, path);
            if self.substitutions != before {
                node.set(snapshot);
            }
            return issues;
        }

        match schema {
            Schema::String(s) => check_string(value, s, path),
            Schema::Number(s) => check_number(value, s, false, path),
            Schema::Integer(s) => check_number(value, &s.0, true, path),
            Schema::Boolean(s) => check_boolean(value, s, path),
            Schema::Function(s) => check_function(value, s, path),
            Schema::Any(s) => check_any(value, s, path),
            Schema::Object(s) => self.check_object(value, s, path),
            Schema::Array(s) => self.check_array(value, s, path),
            Schema::Tuple(s) => self.check_tuple(value, s, path),
        }
    }

    fn check_object(&mut self, value: &mut Value, schema: &ObjectSchema, path: &str) -> Vec<Issue> {
        let Value::Object(map) = &mut *value else {
            return vec![Issue::new(path, "value is not an object")];
        };

        // key set as it was before any fallback was written
        let present: Vec<String> = map.keys().cloned().collect();
        let mut issues = Vec::new();

        if let Some(props) = &schema.props {
            for (name, prop) in props {
                let prop_path = format!("{}.{}", path, name);
                issues.extend(self.check(Slot::Prop(&mut *map, name), prop, &prop_path));
            }
        }

        if !schema.allows_arbitrary() {
            for key in present.iter().filter(|key| !schema.declares(key)) {
                issues.push(Issue::new(path, format!("arbitrary property \"{}\" is not allowed", key)));
            }
        }

        if let Some(entry) = &schema.entry {
            for key in &present {
                let entry_path = format!("{}.{}", path, key);
                issues.extend(self.check(Slot::Prop(&mut *map, key), entry, &entry_path));
            }
        }

        let value: &Value = value;
        if let Some(expected) = &schema.equal {
            if !is_deep_equal(expected, value) {
                issues.push(Issue::new(path, "value is not equal to expected object"));
            }
        }
        if let Some(candidates) = &schema.one_of {
            if !candidates.iter().any(|candidate| is_deep_equal(candidate, value)) {
                issues.push(Issue::new(path, "value is not one of expected objects"));
            }
        }
        issues.extend(hook_issues(&schema.modifiers, value, path));
        issues
    }

    fn check_array(&mut self, value: &mut Value, schema: &ArraySchema, path: &str) -> Vec<Issue> {
        let length = match &*value {
            Value::Array(items) => items.len(),
            _ => return vec![Issue::new(path, "value is not an array")],
        };

        let mut issues = Vec::new();
        if !schema.allow_empty && length == 0 {
            issues.push(Issue::new(path, "empty array is not allowed"));
        }
        if let Some(min) = schema.min_length {
            if length < min {
                issues.push(Issue::new(path, format!("array length is less than {}", min)));
            }
        }
        if let Some(max) = schema.max_length {
            if length > max {
                issues.push(Issue::new(path, format!("array length is greater than {}", max)));
            }
        }
        issues.extend(expected_issues(
            schema.equal.as_ref(),
            schema.one_of.as_deref(),
            value,
            path,
            "array",
        ));

        if let (Some(item), Value::Array(items)) = (schema.item.as_deref(), &mut *value) {
            for index in 0..length {
                let item_path = format!("{}[{}]", path, index);
                issues.extend(self.check(Slot::Index(&mut *items, index), item, &item_path));
            }
        }

        issues.extend(hook_issues(&schema.modifiers, value, path));
        issues
    }

    fn check_tuple(&mut self, value: &mut Value, schema: &TupleSchema, path: &str) -> Vec<Issue> {
        if !matches!(value, Value::Array(_)) {
            return vec![Issue::new(path, "value is not a tuple")];
        }

        let mut issues = expected_issues(
            schema.equal.as_ref(),
            schema.one_of.as_deref(),
            value,
            path,
            "tuple",
        );

        if let Value::Array(items) = &mut *value {
            if items.len() != schema.items.len() {
                issues.push(Issue::new(path, "wrong number of items in tuple"));
            }
            for (index, item) in schema.items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, index);
                issues.extend(self.check(Slot::Index(&mut *items, index), item, &item_path));
            }
        }

        issues.extend(hook_issues(&schema.modifiers, value, path));
        issues
    }
}

/// `oneOf` then `equal`, as arrays and tuples check them
fn expected_issues(
    equal: Option<&Value>,
    one_of: Option<&[Value]>,
    value: &Value,
    path: &str,
    noun: &str,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    if let Some(candidates) = one_of {
        if !candidates.iter().any(|candidate| is_deep_equal(candidate, value)) {
            issues.push(Issue::new(path, format!("value is not one of expected {}s", noun)));
        }
    }
    if let Some(expected) = equal {
        if !is_deep_equal(expected, value) {
            issues.push(Issue::new(path, format!("value is not equal to expected {}", noun)));
        }
    }
    issues
}

fn check_string(value: &Value, schema: &StringSchema, path: &str) -> Vec<Issue> {
    let Value::String(text) = value else {
        return vec![Issue::new(path, "value is not a string")];
    };

    let mut issues = Vec::new();
    let length = utf16_len(text);
    if !schema.allow_empty && text.is_empty() {
        issues.push(Issue::new(path, "empty string is not allowed"));
    }
    if let Some(min) = schema.min_length {
        if length < min {
            issues.push(Issue::new(path, format!("string length is less than {}", min)));
        }
    }
    if let Some(max) = schema.max_length {
        if length > max {
            issues.push(Issue::new(path, format!("string length is greater than {}", max)));
        }
    }
    if let Some(pattern) = &schema.matches {
        if !pattern.is_match(text) {
            issues.push(Issue::new(path, format!("string does not match regexp \"{}\"", pattern)));
        }
    }
    if let Some(expected) = &schema.equal {
        if expected != text {
            issues.push(Issue::new(path, format!("value is not equal to {}", expected)));
        }
    }
    if let Some(candidates) = &schema.one_of {
        if !candidates.contains(text) {
            issues.push(Issue::new(
                path,
                format!("value is not one of [{}]", candidates.join(", ")),
            ));
        }
    }
    issues.extend(hook_issues(&schema.modifiers, value, path));
    issues
}

fn check_number(value: &Value, schema: &NumberSchema, integer: bool, path: &str) -> Vec<Issue> {
    let accepted = if integer { is_integer(value) } else { is_number(value) };
    let number = match value.as_f64() {
        Some(number) if accepted => number,
        _ if integer => return vec![Issue::new(path, "value is not an integer")],
        _ => return vec![Issue::new(path, "value is not a number")],
    };

    let mut issues = Vec::new();
    if let Some(min) = schema.min_value {
        if number < min {
            issues.push(Issue::new(path, format!("value is less than {}", format_number(min))));
        }
    }
    if let Some(max) = schema.max_value {
        if number > max {
            issues.push(Issue::new(path, format!("value is greater than {}", format_number(max))));
        }
    }
    if let Some(expected) = schema.equal {
        if expected != number {
            issues.push(Issue::new(path, format!("value is not equal to {}", format_number(expected))));
        }
    }
    if let Some(candidates) = &schema.one_of {
        if !candidates.contains(&number) {
            let rendered: Vec<String> = candidates.iter().copied().map(format_number).collect();
            issues.push(Issue::new(path, format!("value is not one of [{}]", rendered.join(", "))));
        }
    }
    issues.extend(hook_issues(&schema.modifiers, value, path));
    issues
}

fn check_boolean(value: &Value, schema: &BooleanSchema, path: &str) -> Vec<Issue> {
    let Value::Bool(flag) = value else {
        return vec![Issue::new(path, "value is not a boolean")];
    };

    let mut issues = Vec::new();
    if let Some(expected) = schema.equal {
        if expected != *flag {
            issues.push(Issue::new(path, format!("value is not equal to {}", expected)));
        }
    }
    if let Some(candidates) = &schema.one_of {
        if !candidates.contains(flag) {
            let rendered: Vec<String> = candidates.iter().map(bool::to_string).collect();
            issues.push(Issue::new(path, format!("value is not one of [{}]", rendered.join(", "))));
        }
    }
    issues.extend(hook_issues(&schema.modifiers, value, path));
    issues
}

fn check_function(value: &Value, schema: &FunctionSchema, path: &str) -> Vec<Issue> {
    let Value::Function(callable) = value else {
        return vec![Issue::new(path, "value is not a function")];
    };

    let mut issues = Vec::new();
    if let Some(expected) = &schema.equal {
        if !expected.ptr_eq(callable) {
            issues.push(Issue::new(path, format!("value is not equal to {}", expected)));
        }
    }
    if let Some(candidates) = &schema.one_of {
        if !candidates.iter().any(|candidate| candidate.ptr_eq(callable)) {
            let rendered: Vec<String> = candidates.iter().map(ToString::to_string).collect();
            issues.push(Issue::new(path, format!("value is not one of [{}]", rendered.join(", "))));
        }
    }
    issues.extend(hook_issues(&schema.modifiers, value, path));
    issues
}

fn check_any(value: &Value, schema: &AnySchema, path: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    if let Some(expected) = &schema.equal {
        if !is_deep_equal(expected, value) {
            issues.push(Issue::new(path, format!("value is not equal to {}", expected)));
        }
    }
    if let Some(candidates) = &schema.one_of {
        if !candidates.iter().any(|candidate| is_deep_equal(candidate, value)) {
            let rendered: Vec<String> = candidates.iter().map(ToString::to_string).collect();
            issues.push(Issue::new(path, format!("value is not one of [{}]", rendered.join(", "))));
        }
    }
    issues.extend(hook_issues(&schema.modifiers, value, path));
    issues
}

/// Run the node's hook and re-root its issue paths under `path`
fn hook_issues(modifiers: &Modifiers, value: &Value, path: &str) -> Vec<Issue> {
    let Some(hook) = &modifiers.validate else {
        return Vec::new();
    };

    hook.call(value)
        .into_iter()
        .map(|issue| Issue {
            path: nest_path(path, &issue.path),
            message: issue.message,
        })
        .collect()
}

fn nest_path(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}.{}", parent, child),
    }
}
