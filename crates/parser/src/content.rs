// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The raw, not-yet-validated document as received from the control plane.

use doc_core::{DocumentId, MessageId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Declared type of a document parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    StringList,
    /// A reference resolved through the external parameter-store interface
    /// (§6) rather than taken at face value; the declared/supplied value is
    /// the lookup key, not the secret itself.
    SecureString,
}

/// A concrete parameter value, either supplied by the caller or taken from
/// the document's declared default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    String(String),
    StringList(Vec<String>),
}

impl ParameterValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::String(_) => "String",
            ParameterValue::StringList(_) => "StringList",
        }
    }

    fn matches(&self, expected: ParameterType) -> bool {
        matches!(
            (self, expected),
            (ParameterValue::String(_), ParameterType::String)
                | (ParameterValue::String(_), ParameterType::SecureString)
                | (ParameterValue::StringList(_), ParameterType::StringList)
        )
    }

    /// Render this value for substitution into a template string. A
    /// `StringList` substituted into a scalar position joins with `,`,
    /// matching how the document format treats list-typed references used
    /// in string context.
    pub fn render(&self) -> String {
        match self {
            ParameterValue::String(s) => s.clone(),
            ParameterValue::StringList(items) => items.join(","),
        }
    }
}

/// One declared document parameter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDeclaration {
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ParameterDeclaration {
    fn default_value(&self, name: &str) -> Result<Option<ParameterValue>, ParseError> {
        let Some(raw) = &self.default else { return Ok(None) };
        let value: ParameterValue = serde_json::from_value(raw.clone())
            .map_err(|_| ParseError::Malformed(format!("invalid default for parameter {name:?}")))?;
        Ok(Some(value))
    }
}

/// A document as received from the control plane: schema version,
/// declared parameters, and the still-unvalidated `runtimeConfig` or
/// `mainSteps` body.
#[derive(Debug, Clone)]
pub struct DocumentContent {
    pub schema_version: String,
    pub parameters: IndexMap<String, ParameterDeclaration>,
    pub(crate) body: serde_json::Value,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "schemaVersion")]
    schema_version: String,
    #[serde(default)]
    parameters: IndexMap<String, ParameterDeclaration>,
    #[serde(flatten)]
    body: serde_json::Value,
}

impl DocumentContent {
    pub fn from_json(raw: &str) -> Result<Self, ParseError> {
        let doc: RawDocument = serde_json::from_str(raw)?;
        Ok(Self::from_raw(doc))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ParseError> {
        let doc: RawDocument = serde_yaml::from_str(raw)?;
        Ok(Self::from_raw(doc))
    }

    fn from_raw(doc: RawDocument) -> Self {
        Self { schema_version: doc.schema_version, parameters: doc.parameters, body: doc.body }
    }

    /// The effective parameter map: caller-supplied values, filled in with
    /// declared defaults for anything the caller did not pass.
    pub fn effective_parameters(
        &self,
        supplied: &IndexMap<String, ParameterValue>,
    ) -> Result<IndexMap<String, ParameterValue>, ParseError> {
        let mut effective = IndexMap::new();
        for (name, decl) in &self.parameters {
            let value = match supplied.get(name) {
                Some(value) => value.clone(),
                None => decl
                    .default_value(name)?
                    .ok_or_else(|| ParseError::MissingRequiredParameter(name.clone()))?,
            };
            if !value.matches(decl.param_type) {
                return Err(ParseError::ParameterTypeMismatch {
                    name: name.clone(),
                    expected: match decl.param_type {
                        ParameterType::String => "String",
                        ParameterType::StringList => "StringList",
                        ParameterType::SecureString => "SecureString",
                    },
                    actual: value.type_name(),
                });
            }
            effective.insert(name.clone(), value);
        }
        Ok(effective)
    }
}

/// Context the parser needs that is not part of the document body itself:
/// where to write plugin output, and identifiers to stamp onto the
/// resulting `Configuration`s.
#[derive(Debug, Clone)]
pub struct DocumentParserInfo {
    pub orchestration_directory: String,
    pub output_s3_bucket_name: String,
    pub output_s3_key_prefix: String,
    pub message_id: MessageId,
    pub document_id: DocumentId,
    pub default_working_directory: String,
    pub cloud_watch_log_group: Option<String>,
    pub cloud_watch_stream_prefix: Option<String>,
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
