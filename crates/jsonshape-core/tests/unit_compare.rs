//! Unit tests for schema-guided diffing

use jsonshape_core::{compare, Action, CompareOptions, Diff, DiffChildren, Schema, Value};
use serde_json::json;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn diff<'s>(src: serde_json::Value, dst: serde_json::Value, schema: &'s Schema) -> Option<Diff<'s>> {
    compare(Some(&v(src)), Some(&v(dst)), schema, &CompareOptions::new())
}

fn items<'a, 's>(diff: &'a Diff<'s>) -> &'a [Diff<'s>] {
    match &diff.children {
        Some(DiffChildren::Items(items)) => items,
        other => panic!("expected array children, got {:?}", other),
    }
}

#[cfg(test)]
mod scalars {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_modify_records_both_sides() {
        let schema: Schema = Schema::string().into();
        let result = diff(json!("a"), json!("b"), &schema).unwrap();
        assert_eq!(result.action, Action::Modify);
        assert_eq!(result.old_value, Some(v(json!("a"))));
        assert_eq!(result.new_value, Some(v(json!("b"))));
    }

    #[test]
    fn test_add_and_unset_respect_partial_sides() {
        let schema: Schema = Schema::number().into();
        let value = v(json!(1));

        let added = compare(None, Some(&value), &schema, &CompareOptions::new()).unwrap();
        assert_eq!(added.action, Action::Add);
        assert_eq!(added.old_value, None);

        let options = CompareOptions::new().with_src_partial(true);
        assert!(compare(None, Some(&value), &schema, &options).is_none());

        let unset = compare(Some(&value), None, &schema, &CompareOptions::new()).unwrap();
        assert_eq!(unset.action, Action::Unset);
        assert_eq!(unset.new_value, None);
    }

    #[test]
    fn test_null_is_a_value() {
        let schema: Schema = Schema::number().nullable().into();
        let result = diff(json!(null), json!(3), &schema).unwrap();
        assert_eq!(result.action, Action::Modify);
    }

    #[test]
    fn test_any_compares_deeply() {
        let schema: Schema = Schema::any().into();
        assert!(diff(json!({"a": [1, 2]}), json!({"a": [1, 2]}), &schema).is_none());
        assert!(diff(json!({"a": [1, 2]}), json!({"a": [2, 1]}), &schema).is_some());
    }
}

#[cfg(test)]
mod objects {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::object()
            .prop("name", Schema::string())
            .prop("port", Schema::integer())
            .into()
    }

    #[test]
    fn test_only_changed_props_are_reported() {
        let schema = schema();
        let result = diff(json!({"name": "a", "port": 1}), json!({"name": "a", "port": 2}), &schema).unwrap();

        assert_eq!(result.action, Action::Modify);
        assert_eq!(
            result.paths(),
            vec![(String::new(), Action::Modify), (".port".to_string(), Action::Modify)]
        );
    }

    #[test]
    fn test_undeclared_props_are_ignored() {
        let schema = schema();
        assert!(diff(
            json!({"name": "a", "port": 1, "extra": 1}),
            json!({"name": "a", "port": 1, "extra": 2}),
            &schema
        )
        .is_none());
    }

    #[test]
    fn test_missing_source_object_is_add_with_children() {
        let schema = schema();
        let after = v(json!({"name": "a", "port": 1}));
        let result = compare(None, Some(&after), &schema, &CompareOptions::new()).unwrap();

        assert_eq!(result.action, Action::Add);
        assert_eq!(
            result.paths(),
            vec![
                (String::new(), Action::Add),
                (".name".to_string(), Action::Add),
                (".port".to_string(), Action::Add),
            ]
        );
    }

    #[test]
    fn test_null_object_reads_as_empty() {
        let schema: Schema = Schema::object().prop("a", Schema::number()).nullable().into();
        let result = diff(json!(null), json!({"a": 1}), &schema).unwrap();
        assert_eq!(result.action, Action::Modify);
        assert_eq!(result.paths()[1], (".a".to_string(), Action::Add));
    }

    #[test]
    fn test_partial_destination_ignores_removed_props() {
        let schema = schema();
        let options = CompareOptions::new().with_dst_partial(true);
        let before = v(json!({"name": "a", "port": 1}));
        let after = v(json!({"name": "b"}));

        let result = compare(Some(&before), Some(&after), &schema, &options).unwrap();
        assert_eq!(
            result.paths(),
            vec![(String::new(), Action::Modify), (".name".to_string(), Action::Modify)]
        );
    }
}

#[cfg(test)]
mod arrays {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_items_are_a_set_difference() {
        let schema: Schema = Schema::array().item(Schema::number()).into();
        let result = diff(json!([1, 2, 3]), json!([2, 3, 4]), &schema).unwrap();

        assert_eq!(result.action, Action::Modify);
        let changes: Vec<_> = items(&result)
            .iter()
            .map(|item| (item.action, item.old_value.clone(), item.new_value.clone()))
            .collect();
        assert_eq!(
            changes,
            vec![
                (Action::Unset, Some(v(json!(1))), None),
                (Action::Add, None, Some(v(json!(4)))),
            ]
        );
    }

    #[test]
    fn test_reordered_scalar_items_are_unchanged() {
        let schema: Schema = Schema::array().item(Schema::string()).into();
        assert!(diff(json!(["a", "b"]), json!(["b", "a"]), &schema).is_none());
    }

    #[test]
    fn test_keyed_object_items_are_correlated() {
        let schema: Schema = Schema::array()
            .key("id")
            .item(
                Schema::object()
                    .prop("id", Schema::integer())
                    .prop("v", Schema::string()),
            )
            .into();
        let result = diff(
            json!([{"id": 1, "v": "a"}]),
            json!([{"id": 1, "v": "b"}, {"id": 2, "v": "c"}]),
            &schema,
        )
        .unwrap();

        let elements = items(&result);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].action, Action::Modify);
        assert_eq!(
            elements[0].paths(),
            vec![(String::new(), Action::Modify), (".v".to_string(), Action::Modify)]
        );
        assert_eq!(elements[1].action, Action::Add);
        assert_eq!(elements[1].new_value, Some(v(json!({"id": 2, "v": "c"}))));
    }

    #[test]
    fn test_keyed_items_removed_from_destination_are_unset() {
        let schema: Schema = Schema::array()
            .key("id")
            .item(Schema::object().prop("id", Schema::integer()))
            .into();
        let result = diff(json!([{"id": 1}, {"id": 2}]), json!([{"id": 2}]), &schema).unwrap();

        let elements = items(&result);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].action, Action::Unset);
        assert_eq!(elements[0].old_value, Some(v(json!({"id": 1}))));
    }

    #[test]
    fn test_unkeyed_object_items_are_positional() {
        let schema: Schema = Schema::array()
            .item(Schema::object().prop("n", Schema::number()))
            .into();
        let result = diff(json!([{"n": 1}, {"n": 2}]), json!([{"n": 1}, {"n": 3}, {"n": 4}]), &schema).unwrap();

        let actions: Vec<_> = items(&result).iter().map(|item| item.action).collect();
        assert_eq!(actions, vec![Action::Modify, Action::Add]);
    }

    #[test]
    fn test_tuple_items_are_not_diffed() {
        let schema: Schema = Schema::array().item(Schema::tuple([Schema::number()])).into();
        assert!(diff(json!([[1]]), json!([[2]]), &schema).is_none());
    }

    #[test]
    fn test_missing_source_array_is_add() {
        let schema: Schema = Schema::array().item(Schema::number()).into();
        let after = v(json!([1]));
        let result = compare(None, Some(&after), &schema, &CompareOptions::new()).unwrap();
        assert_eq!(result.action, Action::Add);
        assert_eq!(items(&result).len(), 1);
    }
}

#[cfg(test)]
mod serialization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_diff_serializes_items() {
        let schema: Schema = Schema::array().item(Schema::number()).into();
        let result = diff(json!([1]), json!([2]), &schema).unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "type": "array",
                "action": "modify",
                "oldValue": [1],
                "newValue": [2],
                "items": [
                    {"type": "number", "action": "unset", "oldValue": 1},
                    {"type": "number", "action": "add", "newValue": 2}
                ]
            })
        );
    }

    #[test]
    fn test_tuple_diff_serializes_unchanged_positions_as_null() {
        let schema: Schema = Schema::tuple([Schema::string(), Schema::string()]).into();
        let result = diff(json!(["a", "b"]), json!(["a", "c"]), &schema).unwrap();
        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["items"][0], json!(null));
        assert_eq!(encoded["items"][1]["action"], json!("modify"));
    }
}
