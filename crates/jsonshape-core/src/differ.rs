//! Schema-guided structural diff
//!
//! [`compare`] walks a source and a destination value along a schema and
//! produces a tree of [`Diff`] nodes describing what was added, modified or
//! unset. Objects recurse per declared property, tuples per position, and
//! arrays per element according to the element schema:
//!
//! - scalar elements are diffed as sets (`unset` for elements only in the
//!   source, `add` for elements only in the destination)
//! - object elements with a `key` are correlated by that property
//! - other object and array elements are diffed by index
//! - tuple elements are not diffed
//!
//! Arrays without an `item` schema are untracked and never produce a diff.

use crate::equality::is_deep_equal;
use crate::schema::{ArraySchema, ObjectSchema, Schema, SchemaKind, TupleSchema};
use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// Options controlling a comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// A missing source value is not an addition
    pub src_partial: bool,
    /// A missing destination value is not a removal
    pub dst_partial: bool,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_src_partial(mut self, partial: bool) -> Self {
        self.src_partial = partial;
        self
    }

    pub fn with_dst_partial(mut self, partial: bool) -> Self {
        self.dst_partial = partial;
        self
    }
}

/// Kind of change recorded by a diff node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Modify,
    Unset,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Add => "add",
            Action::Modify => "modify",
            Action::Unset => "unset",
        })
    }
}

/// Nested diffs of a composite node
#[derive(Debug, Clone)]
pub enum DiffChildren<'s> {
    /// Object diffs keyed by declared property
    Props(IndexMap<String, Diff<'s>>),
    /// Tuple diffs by position; unchanged positions are `None`
    Tuple(Vec<Option<Diff<'s>>>),
    /// Array element diffs in emission order
    Items(Vec<Diff<'s>>),
}

/// A change between two values at one schema position
#[derive(Debug, Clone)]
pub struct Diff<'s> {
    pub kind: SchemaKind,
    pub schema: &'s Schema,
    pub action: Action,
    /// Source value, present for `modify` and `unset`
    pub old_value: Option<Value>,
    /// Destination value, present for `add` and `modify`
    pub new_value: Option<Value>,
    pub children: Option<DiffChildren<'s>>,
}

impl<'s> Diff<'s> {
    fn node(
        schema: &'s Schema,
        action: Action,
        src: Option<&Value>,
        dst: Option<&Value>,
        children: Option<DiffChildren<'s>>,
    ) -> Self {
        let (old_value, new_value) = match action {
            Action::Add => (None, dst.cloned()),
            Action::Unset => (src.cloned(), None),
            Action::Modify => (src.cloned(), dst.cloned()),
        };
        Self {
            kind: schema.kind(),
            schema,
            action,
            old_value,
            new_value,
            children,
        }
    }

    /// Every node of the tree as `(path, action)`, parents first
    pub fn paths(&self) -> Vec<(String, Action)> {
        let mut out = Vec::new();
        self.collect_paths(String::new(), &mut out);
        out
    }

    fn collect_paths(&self, path: String, out: &mut Vec<(String, Action)>) {
        match &self.children {
            Some(DiffChildren::Props(props)) => {
                out.push((path.clone(), self.action));
                for (name, child) in props {
                    child.collect_paths(format!("{}.{}", path, name), out);
                }
            }
            Some(DiffChildren::Tuple(positions)) => {
                out.push((path.clone(), self.action));
                for (index, child) in positions.iter().enumerate() {
                    if let Some(child) = child {
                        child.collect_paths(format!("{}[{}]", path, index), out);
                    }
                }
            }
            Some(DiffChildren::Items(items)) => {
                out.push((path.clone(), self.action));
                for (index, child) in items.iter().enumerate() {
                    child.collect_paths(format!("{}[{}]", path, index), out);
                }
            }
            None => out.push((path, self.action)),
        }
    }
}

impl Serialize for Diff<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("Diff", 5)?;
        out.serialize_field("type", &self.kind)?;
        out.serialize_field("action", &self.action)?;
        if let Some(old_value) = &self.old_value {
            out.serialize_field("oldValue", old_value)?;
        }
        if let Some(new_value) = &self.new_value {
            out.serialize_field("newValue", new_value)?;
        }
        match &self.children {
            Some(DiffChildren::Props(props)) => out.serialize_field("props", props)?,
            Some(DiffChildren::Tuple(positions)) => out.serialize_field("items", positions)?,
            Some(DiffChildren::Items(items)) => out.serialize_field("items", items)?,
            None => {}
        }
        out.end()
    }
}

/// Compare `src` against `dst` along `schema`
///
/// `None` on either side is the missing value. Returns `None` when nothing
/// changed.
pub fn compare<'s>(
    src: Option<&Value>,
    dst: Option<&Value>,
    schema: &'s Schema,
    options: &CompareOptions,
) -> Option<Diff<'s>> {
    debug!(
        schema = %schema.kind(),
        src_partial = options.src_partial,
        dst_partial = options.dst_partial,
        "comparing values"
    );

    let diff = Differ { options: *options }.diff(src, dst, schema);

    debug!(action = ?diff.as_ref().map(|diff| diff.action), "comparison finished");
    diff
}

#[derive(Clone, Copy)]
enum Member<'k> {
    Key(&'k str),
    Index(usize),
}

/// Run `f` on a property or position of `value`, looking through shared nodes
fn with_member<R>(value: Option<&Value>, member: Member<'_>, f: impl FnOnce(Option<&Value>) -> R) -> R {
    match value {
        None => f(None),
        Some(value) => value.with_resolved(|value| match (value, member) {
            (Value::Object(map), Member::Key(key)) => f(map.get(key)),
            (Value::Array(items), Member::Index(index)) => f(items.get(index)),
            _ => f(None),
        }),
    }
}

/// Run `f` on the elements of `value`; anything but an array has none
fn with_elements<R>(value: Option<&Value>, f: impl FnOnce(&[Value]) -> R) -> R {
    match value {
        None => f(&[]),
        Some(value) => value.with_resolved(|value| match value {
            Value::Array(items) => f(items),
            _ => f(&[]),
        }),
    }
}

fn key_of(value: &Value, key: &str) -> Option<Value> {
    with_member(Some(value), Member::Key(key), |member| member.cloned())
}

/// Missing keys on both sides correlate
fn same_key(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => is_deep_equal(a, b),
        _ => false,
    }
}

struct Differ {
    options: CompareOptions,
}

impl Differ {
    fn diff<'s>(&self, src: Option<&Value>, dst: Option<&Value>, schema: &'s Schema) -> Option<Diff<'s>> {
        match schema {
            Schema::Object(object) => self.diff_object(src, dst, schema, object),
            Schema::Tuple(tuple) => self.diff_tuple(src, dst, schema, tuple),
            Schema::Array(array) => self.diff_array(src, dst, schema, array),
            _ => self.diff_scalar(src, dst, schema),
        }
    }

    fn diff_scalar<'s>(&self, src: Option<&Value>, dst: Option<&Value>, schema: &'s Schema) -> Option<Diff<'s>> {
        match (src, dst) {
            (None, None) => None,
            (Some(a), Some(b)) if is_deep_equal(a, b) => None,
            (None, Some(_)) if self.options.src_partial => None,
            (None, Some(_)) => Some(Diff::node(schema, Action::Add, src, dst, None)),
            (Some(_), None) if self.options.dst_partial => None,
            (Some(_), None) => Some(Diff::node(schema, Action::Unset, src, dst, None)),
            (Some(_), Some(_)) => Some(Diff::node(schema, Action::Modify, src, dst, None)),
        }
    }

    /// Composite node: add/unset by missing side, modify only when something changed below
    fn wrap<'s>(
        &self,
        schema: &'s Schema,
        src: Option<&Value>,
        dst: Option<&Value>,
        children: DiffChildren<'s>,
        changed: bool,
    ) -> Option<Diff<'s>> {
        let action = match (src, dst) {
            (None, None) => return None,
            (None, Some(_)) if self.options.src_partial => return None,
            (None, Some(_)) => Action::Add,
            (Some(_), None) if self.options.dst_partial => return None,
            (Some(_), None) => Action::Unset,
            (Some(_), Some(_)) if changed => Action::Modify,
            (Some(_), Some(_)) => return None,
        };
        Some(Diff::node(schema, action, src, dst, Some(children)))
    }

    fn diff_object<'s>(
        &self,
        src: Option<&Value>,
        dst: Option<&Value>,
        schema: &'s Schema,
        object: &'s ObjectSchema,
    ) -> Option<Diff<'s>> {
        let mut props = IndexMap::new();
        if let Some(declared) = &object.props {
            for (name, prop) in declared {
                let diff = with_member(src, Member::Key(name), |before| {
                    with_member(dst, Member::Key(name), |after| self.diff(before, after, prop))
                });
                if let Some(diff) = diff {
                    props.insert(name.clone(), diff);
                }
            }
        }

        let changed = !props.is_empty();
        self.wrap(schema, src, dst, DiffChildren::Props(props), changed)
    }

    fn diff_tuple<'s>(
        &self,
        src: Option<&Value>,
        dst: Option<&Value>,
        schema: &'s Schema,
        tuple: &'s TupleSchema,
    ) -> Option<Diff<'s>> {
        let positions: Vec<Option<Diff<'s>>> = tuple
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                with_member(src, Member::Index(index), |before| {
                    with_member(dst, Member::Index(index), |after| self.diff(before, after, item))
                })
            })
            .collect();

        let changed = positions.iter().any(Option::is_some);
        self.wrap(schema, src, dst, DiffChildren::Tuple(positions), changed)
    }

    fn diff_array<'s>(
        &self,
        src: Option<&Value>,
        dst: Option<&Value>,
        schema: &'s Schema,
        array: &'s ArraySchema,
    ) -> Option<Diff<'s>> {
        let item = array.item.as_deref()?;

        let items = with_elements(src, |before| {
            with_elements(dst, |after| self.diff_elements(before, after, array, item))
        });
        if items.is_empty() {
            return None;
        }

        let action = match (src, dst) {
            (None, _) if self.options.src_partial => return None,
            (None, _) => Action::Add,
            (Some(_), None) if self.options.dst_partial => return None,
            (Some(_), None) => Action::Unset,
            (Some(_), Some(_)) => Action::Modify,
        };
        Some(Diff::node(schema, action, src, dst, Some(DiffChildren::Items(items))))
    }

    fn diff_elements<'s>(
        &self,
        src: &[Value],
        dst: &[Value],
        array: &'s ArraySchema,
        item: &'s Schema,
    ) -> Vec<Diff<'s>> {
        match (item, array.key.as_deref()) {
            (Schema::Object(_), Some(key)) => self.diff_keyed(src, dst, key, item),
            (Schema::Object(_) | Schema::Array(_), _) => self.diff_positional(src, dst, item),
            (Schema::Tuple(_), _) => Vec::new(),
            _ => diff_set(src, dst, item),
        }
    }

    fn diff_keyed<'s>(&self, src: &[Value], dst: &[Value], key: &str, item: &'s Schema) -> Vec<Diff<'s>> {
        let mut diffs = Vec::new();

        for before in src {
            let id = key_of(before, key);
            let counterpart = dst.iter().find(|after| same_key(&key_of(after, key), &id));
            if let Some(diff) = self.diff(Some(before), counterpart, item) {
                diffs.push(diff);
            }
        }

        for after in dst {
            let id = key_of(after, key);
            if src.iter().any(|before| same_key(&key_of(before, key), &id)) {
                continue;
            }
            if let Some(diff) = self.diff(None, Some(after), item) {
                diffs.push(diff);
            }
        }

        diffs
    }

    fn diff_positional<'s>(&self, src: &[Value], dst: &[Value], item: &'s Schema) -> Vec<Diff<'s>> {
        (0..src.len().max(dst.len()))
            .filter_map(|index| self.diff(src.get(index), dst.get(index), item))
            .collect()
    }
}

/// Scalar elements as sets
fn diff_set<'s>(src: &[Value], dst: &[Value], item: &'s Schema) -> Vec<Diff<'s>> {
    let removed = src
        .iter()
        .filter(|before| !dst.iter().any(|after| is_deep_equal(after, before)))
        .map(|before| Diff::node(item, Action::Unset, Some(before), None, None));
    let added = dst
        .iter()
        .filter(|after| !src.iter().any(|before| is_deep_equal(before, after)))
        .map(|after| Diff::node(item, Action::Add, None, Some(after), None));
    removed.chain(added).collect()
}
