//! Integration tests for flat-parameter extraction.

use std::collections::HashMap;

use jsonsift::{SchemaError, SchemaNode, SchemaTree, Validator};
use serde_json::json;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn order_tree() -> SchemaTree {
    let root = SchemaNode::object(
        "order",
        vec![
            SchemaNode::string("code").min(1).max(10),
            SchemaNode::number("qty").min(1),
            SchemaNode::boolean("rush").optional(),
            SchemaNode::object(
                "address",
                vec![SchemaNode::string("city"), SchemaNode::string("zip").optional()],
            )
            .unwrap()
            .optional(),
        ],
    )
    .unwrap();
    SchemaTree::resolve(root).unwrap()
}

#[test]
fn test_params_coerce_to_typed_json() {
    let tree = order_tree();
    let input = params(&[("code", "A-17"), ("qty", "3"), ("rush", "1")]);
    let out = Validator::new().extract_params(&tree, &input).unwrap();
    assert_eq!(out, json!({"code": "A-17", "qty": 3, "rush": true}));
}

#[test]
fn test_decimal_param_becomes_json_float() {
    let root = SchemaNode::object("p", vec![SchemaNode::number("price").min(0)]).unwrap();
    let tree = SchemaTree::resolve(root).unwrap();
    let out = Validator::new()
        .extract_params(&tree, &params(&[("price", "99.98")]))
        .unwrap();
    assert_eq!(out, json!({"price": 99.98}));
}

#[test]
fn test_boolean_literal_forms() {
    let root = SchemaNode::object("p", vec![SchemaNode::boolean("flag")]).unwrap();
    let tree = SchemaTree::resolve(root).unwrap();
    let v = Validator::new();

    for (text, expected) in [("true", true), ("1", true), ("false", false), ("0", false)] {
        let out = v.extract_params(&tree, &params(&[("flag", text)])).unwrap();
        assert_eq!(out, json!({"flag": expected}), "literal {:?}", text);
    }

    let err = v
        .extract_params(&tree, &params(&[("flag", "yes")]))
        .unwrap_err();
    assert!(matches!(err, SchemaError::FormatViolation { .. }));
}

#[test]
fn test_missing_required_param() {
    let tree = order_tree();
    let err = Validator::new()
        .extract_params(&tree, &params(&[("qty", "3")]))
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingRequiredField {
            path: "order.code".to_string()
        }
    );
}

#[test]
fn test_empty_string_counts_as_absent() {
    let tree = order_tree();
    let v = Validator::new();

    let err = v
        .extract_params(&tree, &params(&[("code", ""), ("qty", "3")]))
        .unwrap_err();
    assert_eq!(err.path(), "order.code");

    // absent optional is simply omitted from the output
    let out = v
        .extract_params(&tree, &params(&[("code", "x"), ("qty", "3"), ("rush", "")]))
        .unwrap();
    assert_eq!(out, json!({"code": "x", "qty": 3}));
}

#[test]
fn test_embedded_json_object_param() {
    let tree = order_tree();
    let input = params(&[
        ("code", "x"),
        ("qty", "2"),
        ("address", r#"{"city": "Oslo", "country": "NO"}"#),
    ]);
    let out = Validator::new().extract_params(&tree, &input).unwrap();
    // undeclared country is filtered out of the embedded object
    assert_eq!(
        out,
        json!({"code": "x", "qty": 2, "address": {"city": "Oslo"}})
    );
}

#[test]
fn test_embedded_json_parse_failure() {
    let tree = order_tree();
    let input = params(&[("code", "x"), ("qty", "2"), ("address", "{not json")]);
    let err = Validator::new().extract_params(&tree, &input).unwrap_err();
    match err {
        SchemaError::FormatViolation { path, message } => {
            assert_eq!(path, "order.address");
            assert_eq!(message, "is not valid JSON");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_embedded_json_contents_still_validated() {
    let tree = order_tree();
    let input = params(&[("code", "x"), ("qty", "2"), ("address", r#"{"zip": "1234"}"#)]);
    let err = Validator::new().extract_params(&tree, &input).unwrap_err();
    assert_eq!(err.path(), "order.address.city");
}

#[test]
fn test_embedded_json_array_param() {
    let root = SchemaNode::object(
        "p",
        vec![SchemaNode::array("ids", Some(SchemaNode::number("").min(1))).unwrap()],
    )
    .unwrap();
    let tree = SchemaTree::resolve(root).unwrap();
    let v = Validator::new();

    let out = v
        .extract_params(&tree, &params(&[("ids", "[1, 2, 3]")]))
        .unwrap();
    assert_eq!(out, json!({"ids": [1, 2, 3]}));

    let err = v
        .extract_params(&tree, &params(&[("ids", "[1, 0]")]))
        .unwrap_err();
    assert_eq!(err.path(), "p.ids[]");
}

#[test]
fn test_numeric_string_param_checked_against_bounds() {
    let tree = order_tree();
    let err = Validator::new()
        .extract_params(&tree, &params(&[("code", "x"), ("qty", "0")]))
        .unwrap_err();
    match err {
        SchemaError::RangeViolation { path, message } => {
            assert_eq!(path, "order.qty");
            assert!(message.contains("at least 1"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_decimal_bound_applies_to_param_text() {
    let root = SchemaNode::object(
        "p",
        vec![SchemaNode::number("ratio").min("7.18").max(20)],
    )
    .unwrap();
    let tree = SchemaTree::resolve(root).unwrap();
    let v = Validator::new();

    v.extract_params(&tree, &params(&[("ratio", "7.99999999")]))
        .unwrap();
    assert!(v
        .extract_params(&tree, &params(&[("ratio", "7.01")]))
        .is_err());
}

#[test]
fn test_rule_runs_for_absent_optional_param() {
    let root = SchemaNode::object(
        "p",
        vec![SchemaNode::string("note")
            .optional()
            .with_rule(|_: jsonsift::NodeView<'_>, v: &serde_json::Value| !v.is_null())],
    )
    .unwrap();
    let tree = SchemaTree::resolve(root).unwrap();
    let err = Validator::new()
        .extract_params(&tree, &params(&[]))
        .unwrap_err();
    assert_eq!(err.path(), "p.note");
}
