// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small, non-recursive `{{ parameter-name }}` template scanner.
//!
//! This intentionally does not pull in a templating engine: document
//! parameter references are a narrow, single-level substitution grammar,
//! not a general template language.

use indexmap::IndexMap;
use serde_json::Value;

use crate::content::ParameterValue;
use crate::error::ParseError;

/// Walks a JSON value, substituting every `{{ name }}` reference found in
/// string positions. Arrays and objects recurse; other scalar kinds pass
/// through unchanged.
pub fn substitute_value(value: &Value, params: &IndexMap<String, ParameterValue>) -> Result<Value, ParseError> {
    match value {
        Value::String(s) => substitute_string(s, params),
        Value::Array(items) => {
            let substituted: Result<Vec<Value>, ParseError> =
                items.iter().map(|item| substitute_value(item, params)).collect();
            Ok(Value::Array(substituted?))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key.clone(), substitute_value(value, params)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

/// If `input`, once trimmed, is exactly one `{{ name }}` reference and
/// nothing else, returns the referenced parameter name.
fn whole_reference(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    trimmed.strip_prefix("{{")?.strip_suffix("}}").map(str::trim)
}

fn substitute_string(input: &str, params: &IndexMap<String, ParameterValue>) -> Result<Value, ParseError> {
    if let Some(name) = whole_reference(input) {
        let value =
            params.get(name).ok_or_else(|| ParseError::UnresolvedReference(name.to_string()))?;
        return Ok(match value {
            ParameterValue::String(s) => Value::String(s.clone()),
            ParameterValue::StringList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        });
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    loop {
        match rest.find("{{") {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => {
                out.push_str(&rest[..start]);
                let after_open = &rest[start + 2..];
                match after_open.find("}}") {
                    None => {
                        // Unterminated reference: leave the rest verbatim.
                        out.push_str(&rest[start..]);
                        break;
                    }
                    Some(end) => {
                        let name = after_open[..end].trim();
                        let value = params
                            .get(name)
                            .ok_or_else(|| ParseError::UnresolvedReference(name.to_string()))?;
                        out.push_str(&value.render());
                        rest = &after_open[end + 2..];
                    }
                }
            }
        }
    }
    Ok(Value::String(out))
}

#[cfg(test)]
#[path = "substitution_tests.rs"]
mod tests;
