//! Property-based tests for equality, validation and diffing
//!
//! These tests verify that the engine behaves consistently across a wide
//! range of generated documents.

use jsonshape_core::{compare, is_cyclic, is_deep_equal, validate, CompareOptions, Schema, ValidateOptions, Value};
use proptest::prelude::*;
use serde_json::Value as Json;

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i32>().prop_map(|n| Json::Number(n.into())),
        (-1.0e6..1.0e6f64).prop_map(|n| serde_json::json!(n)),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Json::String),
    ];

    leaf.prop_recursive(
        3,  // max depth
        24, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..5).prop_map(Json::Array),
                proptest::collection::hash_map("[a-z_][a-z0-9_]{0,8}", inner, 0..5)
                    .prop_map(|m| Json::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// A schema the given document conforms to
fn schema_for(document: &Json) -> Schema {
    match document {
        Json::Null => Schema::any().nullable().into(),
        Json::Bool(_) => Schema::boolean().into(),
        Json::Number(_) => Schema::number().into(),
        Json::String(_) => Schema::string().allow_empty().into(),
        Json::Array(items) => Schema::tuple(items.iter().map(schema_for)).into(),
        Json::Object(map) => map
            .iter()
            .fold(Schema::object().arbitrary(false), |schema, (key, item)| {
                schema.prop(key.clone(), schema_for(item))
            })
            .into(),
    }
}

proptest! {
    #[test]
    fn deep_equality_is_reflexive(document in json_value_strategy()) {
        let value = Value::from(document);
        prop_assert!(!is_cyclic(&value));
        prop_assert!(is_deep_equal(&value, &value.clone()));
    }

    #[test]
    fn deep_equality_is_symmetric(a in json_value_strategy(), b in json_value_strategy()) {
        let (a, b) = (Value::from(a), Value::from(b));
        prop_assert_eq!(is_deep_equal(&a, &b), is_deep_equal(&b, &a));
    }

    #[test]
    fn deep_equality_matches_json_equality_for_scalars(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(is_deep_equal(&Value::from(a), &Value::from(b)), a == b);
    }

    #[test]
    fn conforming_documents_have_no_issues(document in json_value_strategy()) {
        let schema = schema_for(&document);
        let original = Value::from(document);
        let mut slot = Some(original.clone());

        let issues = validate(&mut slot, &schema, &ValidateOptions::new().with_fallback(true));
        prop_assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        prop_assert_eq!(slot, Some(original));
    }

    #[test]
    fn comparing_a_value_with_itself_is_no_change(document in json_value_strategy()) {
        let schema = schema_for(&document);
        let value = Value::from(document);
        let copy = value.clone();
        prop_assert!(compare(Some(&value), Some(&copy), &schema, &CompareOptions::new()).is_none());
    }

    #[test]
    fn scalar_array_diff_counts_set_difference(
        before in proptest::collection::btree_set(0i32..20, 0..8),
        after in proptest::collection::btree_set(0i32..20, 0..8),
    ) {
        let schema: Schema = Schema::array().item(Schema::integer()).into();
        let src = Value::from(before.iter().copied().collect::<Vec<_>>());
        let dst = Value::from(after.iter().copied().collect::<Vec<_>>());

        let expected = before.symmetric_difference(&after).count();
        let diff = compare(Some(&src), Some(&dst), &schema, &CompareOptions::new());
        let actual = diff.map(|diff| diff.paths().len() - 1).unwrap_or(0);
        prop_assert_eq!(actual, expected);
    }
}
