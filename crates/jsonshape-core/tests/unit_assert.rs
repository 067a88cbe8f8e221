//! Unit tests for the assert wrapper

use jsonshape_core::{assert, validate_value, AssertOptions, Error, Schema, Value};
use serde_json::json;

fn config_schema() -> Schema {
    Schema::object()
        .prop("host", Schema::string())
        .prop("port", Schema::integer().min_value(1.0).max_value(65535.0).fallback(80))
        .prop("tags", Schema::array().item(Schema::string()).allow_empty().optional())
        .into()
}

#[test]
fn test_valid_value_is_returned_unchanged() {
    let value = Value::from(json!({"host": "localhost", "port": 8080}));
    let result = assert(Some(value.clone()), &config_schema(), &AssertOptions::new()).unwrap();
    assert_eq!(result, Some(value));
}

#[test]
fn test_fallbacks_are_applied_to_returned_value() {
    let options = AssertOptions::new().with_fallback(true);
    let result = assert(Some(Value::from(json!({"host": "h"}))), &config_schema(), &options).unwrap();
    assert_eq!(result, Some(Value::from(json!({"host": "h", "port": 80}))));
}

#[test]
fn test_missing_root_without_fallback_fails() {
    let error = assert(None, &config_schema(), &AssertOptions::new()).unwrap_err();
    assert_eq!(error.message, "assertion failed: value can't be undefined");
}

#[test]
fn test_partial_accepts_missing_fields() {
    let options = AssertOptions::new().with_partial(true);
    assert!(assert(Some(Value::from(json!({}))), &config_schema(), &options).is_ok());
}

#[test]
fn test_failure_agrees_with_validate() {
    let schema = config_schema();
    let value = Value::from(json!({"host": 1, "port": 0, "tags": [1]}));
    let issues = validate_value(&value, &schema);

    let error = assert(Some(value), &schema, &AssertOptions::new().with_description("config")).unwrap_err();
    assert_eq!(error.issues, issues);
    assert!(error.message.starts_with("config assertion failed: "));
    for issue in &issues {
        assert!(error.message.contains(&issue.path));
        assert!(error.message.contains(&issue.message));
    }
}

#[test]
fn test_assertion_error_converts_into_crate_error() {
    let error = assert(Some(Value::from(1)), &Schema::string().into(), &AssertOptions::new()).unwrap_err();
    let error: Error = error.into();
    assert_eq!(error.to_string(), "assertion failed: value is not a string");
}
