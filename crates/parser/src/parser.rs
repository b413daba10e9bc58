// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a validated [`DocumentContent`] into an ordered sequence of
//! `PluginState`, per the schema dispatch in §4.9.

use doc_adapters::ParameterStore;
use doc_core::{PluginId, PluginState};
use doc_core::plugin::{Configuration, Preconditions};
use doc_core::document::SchemaVersion;
use indexmap::IndexMap;
use serde_json::Value;

use crate::content::{DocumentContent, DocumentParserInfo, ParameterType, ParameterValue};
use crate::error::ParseError;
use crate::substitution::substitute_value;

struct RawStep {
    /// Step name (v2+) or plugin name (v1.x) — becomes the `PluginID`.
    id: String,
    /// Plugin/action name — becomes `PluginName` and the `OutputS3KeyPrefix`
    /// suffix regardless of schema version.
    plugin_name: String,
    settings: Value,
    properties: Value,
    preconditions: Preconditions,
}

fn legacy_steps(body: &Value) -> Result<Vec<RawStep>, ParseError> {
    let runtime_config = body
        .get("runtimeConfig")
        .and_then(Value::as_object)
        .ok_or_else(|| ParseError::Malformed("missing runtimeConfig".to_string()))?;

    // Source map iteration order is undefined; normalize by plugin name.
    let mut names: Vec<&String> = runtime_config.keys().collect();
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| {
            let entry = &runtime_config[name];
            RawStep {
                id: name.clone(),
                plugin_name: name.clone(),
                settings: entry.get("settings").cloned().unwrap_or(Value::Null),
                properties: entry.get("properties").cloned().unwrap_or(Value::Null),
                preconditions: Preconditions::default(),
            }
        })
        .collect())
}

fn v2_steps(body: &Value, schema_version: SchemaVersion) -> Result<Vec<RawStep>, ParseError> {
    let main_steps = body
        .get("mainSteps")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::Malformed("missing mainSteps".to_string()))?;

    main_steps
        .iter()
        .map(|step| {
            let plugin_name = step
                .get("action")
                .and_then(Value::as_str)
                .ok_or_else(|| ParseError::Malformed("mainSteps entry missing action".to_string()))?
                .to_string();
            let id = step
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| plugin_name.clone());

            let preconditions = if schema_version.supports_preconditions() {
                let expressions = step
                    .get("precondition")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                            .collect()
                    })
                    .unwrap_or_default();
                Preconditions { expressions }
            } else {
                Preconditions::default()
            };

            Ok(RawStep {
                id,
                plugin_name,
                settings: step.get("settings").cloned().unwrap_or(Value::Null),
                properties: step.get("inputs").cloned().unwrap_or(Value::Null),
                preconditions,
            })
        })
        .collect()
}

/// Resolves every `SecureString`-declared parameter's effective value
/// through the external parameter-store interface (§6): the declared or
/// supplied value is the lookup key, and the looked-up plaintext replaces
/// it before substitution runs. Parameters declared as plain `String` or
/// `StringList` pass through untouched.
async fn resolve_secure_parameters(
    content: &DocumentContent,
    parameter_store: &dyn ParameterStore,
    mut effective_parameters: IndexMap<String, ParameterValue>,
) -> Result<IndexMap<String, ParameterValue>, ParseError> {
    for (name, decl) in &content.parameters {
        if decl.param_type != ParameterType::SecureString {
            continue;
        }
        let Some(ParameterValue::String(key)) = effective_parameters.get(name) else { continue };
        let resolved = parameter_store
            .get(key)
            .await
            .map_err(|source| ParseError::SecureParameter { name: name.clone(), source })?;
        effective_parameters.insert(name.clone(), ParameterValue::String(resolved));
    }
    Ok(effective_parameters)
}

/// Validates `content`'s schema version, resolves parameters (including
/// secure-parameter lookups through `parameter_store`), substitutes
/// references, and emits one [`PluginState`] per declared step, in
/// document order.
pub async fn parse_document(
    content: &DocumentContent,
    info: &DocumentParserInfo,
    supplied_parameters: &IndexMap<String, ParameterValue>,
    parameter_store: &dyn ParameterStore,
) -> Result<Vec<PluginState>, ParseError> {
    let schema_version = SchemaVersion::parse(&content.schema_version)
        .map_err(|_| ParseError::UnsupportedSchemaVersion(content.schema_version.clone()))?;

    let effective_parameters = content.effective_parameters(supplied_parameters)?;
    let effective_parameters =
        resolve_secure_parameters(content, parameter_store, effective_parameters).await?;

    let raw_steps = if schema_version.is_legacy_runtime_config() {
        legacy_steps(&content.body)?
    } else {
        v2_steps(&content.body, schema_version)?
    };

    raw_steps
        .into_iter()
        .map(|step| {
            let settings = substitute_value(&step.settings, &effective_parameters)?;
            let properties = substitute_value(&step.properties, &effective_parameters)?;

            Ok(PluginState::new(Configuration {
                plugin_name: step.plugin_name.clone(),
                plugin_id: PluginId::from_string(&step.id),
                settings,
                properties,
                orchestration_directory: format!("{}/{}", info.orchestration_directory, step.id),
                output_s3_key_prefix: format!("{}/{}", info.output_s3_key_prefix, step.plugin_name),
                preconditions: step.preconditions,
                is_precondition_enabled: schema_version.supports_preconditions(),
            }))
        })
        .collect()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
