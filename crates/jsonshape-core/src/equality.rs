//! Deep equality and cycle detection

use crate::value::Value;

/// Whether the value reaches one of its own shared nodes again along a path
///
/// The same node appearing twice on different branches is not a cycle.
pub fn is_cyclic(value: &Value) -> bool {
    fn walk(value: &Value, ancestors: &mut Vec<usize>) -> bool {
        match value {
            Value::Array(items) => items.iter().any(|item| walk(item, ancestors)),
            Value::Object(map) => map.values().any(|item| walk(item, ancestors)),
            Value::Shared(node) => {
                let addr = node.addr();
                if ancestors.contains(&addr) {
                    return true;
                }
                ancestors.push(addr);
                let cyclic = walk(&node.read(), ancestors);
                ancestors.pop();
                cyclic
            }
            _ => false,
        }
    }
    walk(value, &mut Vec::new())
}

/// Same reference, same shared node, or equal primitives
///
/// Dates compare by instant, functions by identity, and `NaN` never
/// equals anything.
pub(crate) fn is_identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x.ptr_eq(y),
        (Value::Shared(x), Value::Shared(y)) => x.ptr_eq(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => std::ptr::eq(a, b),
        _ => false,
    }
}

/// Structural equality
///
/// Identical values are equal even when cyclic; otherwise cyclic values are
/// never equal to anything. Objects compare entry by entry in insertion
/// order, so `{a, b}` and `{b, a}` differ.
pub fn is_deep_equal(a: &Value, b: &Value) -> bool {
    if is_identical(a, b) {
        return true;
    }
    if is_cyclic(a) || is_cyclic(b) {
        return false;
    }
    structural_eq(a, b)
}

fn structural_eq(a: &Value, b: &Value) -> bool {
    if is_identical(a, b) {
        return true;
    }
    a.with_resolved(|a| {
        b.with_resolved(|b| {
            if is_identical(a, b) {
                return true;
            }
            match (a, b) {
                (Value::Object(x), Value::Object(y)) => {
                    x.len() == y.len()
                        && x
                            .iter()
                            .zip(y.iter())
                            .all(|((kx, vx), (ky, vy))| kx == ky && structural_eq(vx, vy))
                }
                (Value::Array(x), Value::Array(y)) => {
                    x.len() == y.len() && x.iter().zip(y.iter()).all(|(vx, vy)| structural_eq(vx, vy))
                }
                _ => false,
            }
        })
    })
}
