// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const DOC_JSON: &str = r#"{
    "schemaVersion": "2.2",
    "parameters": {
        "message": { "type": "String", "default": "hi" },
        "files": { "type": "StringList" }
    },
    "mainSteps": []
}"#;

#[test]
fn from_json_parses_schema_version_and_parameters() {
    let doc = DocumentContent::from_json(DOC_JSON).unwrap();
    assert_eq!(doc.schema_version, "2.2");
    assert_eq!(doc.parameters.len(), 2);
}

#[test]
fn from_yaml_parses_equivalently_to_json() {
    let yaml = "schemaVersion: '2.2'\nparameters:\n  message:\n    type: String\n    default: hi\nmainSteps: []\n";
    let doc = DocumentContent::from_yaml(yaml).unwrap();
    assert_eq!(doc.schema_version, "2.2");
    assert_eq!(doc.parameters.len(), 1);
}

#[test]
fn effective_parameters_fills_in_declared_defaults() {
    let doc = DocumentContent::from_json(DOC_JSON).unwrap();
    let mut supplied = IndexMap::new();
    supplied.insert("files".to_string(), ParameterValue::StringList(vec!["a".into()]));

    let effective = doc.effective_parameters(&supplied).unwrap();
    assert_eq!(effective.get("message"), Some(&ParameterValue::String("hi".to_string())));
    assert_eq!(effective.get("files"), Some(&ParameterValue::StringList(vec!["a".to_string()])));
}

#[test]
fn effective_parameters_rejects_missing_required_parameter() {
    let doc = DocumentContent::from_json(DOC_JSON).unwrap();
    let err = doc.effective_parameters(&IndexMap::new()).unwrap_err();
    assert!(matches!(err, ParseError::MissingRequiredParameter(name) if name == "files"));
}

#[test]
fn effective_parameters_rejects_type_mismatch() {
    let doc = DocumentContent::from_json(DOC_JSON).unwrap();
    let mut supplied = IndexMap::new();
    supplied.insert("files".to_string(), ParameterValue::String("not-a-list".to_string()));

    let err = doc.effective_parameters(&supplied).unwrap_err();
    assert!(matches!(err, ParseError::ParameterTypeMismatch { .. }));
}
