// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn params(pairs: &[(&str, ParameterValue)]) -> IndexMap<String, ParameterValue> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn whole_string_reference_to_string_list_stays_a_list() {
    let params = params(&[("files", ParameterValue::StringList(vec!["a.txt".into(), "b.txt".into()]))]);
    let out = substitute_value(&Value::String("{{ files }}".to_string()), &params).unwrap();
    assert_eq!(out, serde_json::json!(["a.txt", "b.txt"]));
}

#[test]
fn partial_reference_renders_string_list_as_joined_text() {
    let params = params(&[("files", ParameterValue::StringList(vec!["a.txt".into(), "b.txt".into()]))]);
    let out = substitute_value(&Value::String("prefix:{{files}}:suffix".to_string()), &params).unwrap();
    assert_eq!(out, serde_json::json!("prefix:a.txt,b.txt:suffix"));
}

#[test]
fn multiple_references_in_one_string_all_substitute() {
    let params = params(&[
        ("greeting", ParameterValue::String("hello".to_string())),
        ("target", ParameterValue::String("world".to_string())),
    ]);
    let out = substitute_value(&Value::String("{{greeting}}, {{ target }}!".to_string()), &params).unwrap();
    assert_eq!(out, serde_json::json!("hello, world!"));
}

#[test]
fn unresolved_reference_is_an_error() {
    let params = params(&[]);
    let err = substitute_value(&Value::String("{{missing}}".to_string()), &params).unwrap_err();
    assert!(matches!(err, ParseError::UnresolvedReference(name) if name == "missing"));
}

#[test]
fn recurses_into_nested_arrays_and_objects() {
    let params = params(&[("name", ParameterValue::String("doc".to_string()))]);
    let value = serde_json::json!({
        "a": ["{{name}}", "literal"],
        "b": { "c": "{{name}}" },
    });
    let out = substitute_value(&value, &params).unwrap();
    assert_eq!(out, serde_json::json!({"a": ["doc", "literal"], "b": {"c": "doc"}}));
}

#[test]
fn non_string_scalars_pass_through_unchanged() {
    let params = params(&[]);
    let value = serde_json::json!({"count": 3, "enabled": true, "nothing": null});
    let out = substitute_value(&value, &params).unwrap();
    assert_eq!(out, value);
}
