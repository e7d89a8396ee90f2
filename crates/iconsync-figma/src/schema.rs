//! # Response Shape Validation
//!
//! Figma responses are checked against a JSON Schema (Draft 2020-12) before
//! they are decoded into typed records, so that every violation in a document
//! is reported at once, each with the JSON Pointer of the offending value.
//! Validation is all-or-nothing: if any violation is found the caller gets
//! [`FigmaApiError::SchemaValidation`] and no partially decoded data.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::FigmaApiError;

/// A single shape violation found in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON Pointer to the violating value, e.g. `/components/1:2/name`.
    /// Empty for the document root.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Schema of `GET /v1/files/{key}`. Only the component tables are checked.
pub(crate) fn file_response_schema() -> Value {
    json!({
        "type": "object",
        "required": ["componentSets", "components"],
        "properties": {
            "componentSets": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {"name": {"type": "string"}}
                }
            },
            "components": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "required": ["name", "componentSetId"],
                    "properties": {
                        "name": {"type": "string"},
                        "componentSetId": {"type": "string"}
                    }
                }
            }
        }
    })
}

/// Schema of `GET /v1/images/{key}`.
pub(crate) fn render_response_schema() -> Value {
    json!({
        "type": "object",
        "required": ["images"],
        "properties": {
            "images": {
                "type": "object",
                "additionalProperties": {"type": "string", "format": "uri"}
            }
        }
    })
}

/// Validate `body` against `schema`, then decode it into `T`.
pub(crate) fn decode<T: DeserializeOwned>(
    body: Value,
    schema: &Value,
    endpoint: &str,
) -> Result<T, FigmaApiError> {
    let issues = validate(&body, schema, endpoint)?;
    if !issues.is_empty() {
        return Err(FigmaApiError::SchemaValidation {
            endpoint: endpoint.to_string(),
            issues,
        });
    }

    serde_json::from_value(body).map_err(|e| FigmaApiError::Deserialization {
        endpoint: endpoint.to_string(),
        source: e,
    })
}

fn validate(
    body: &Value,
    schema: &Value,
    endpoint: &str,
) -> Result<Vec<SchemaIssue>, FigmaApiError> {
    let validator = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .should_validate_formats(true)
        .build(schema)
        .map_err(|e| FigmaApiError::SchemaCompile {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

    Ok(validator
        .iter_errors(body)
        .map(|err| SchemaIssue {
            path: err.instance_path.to_string(),
            message: err.to_string(),
        })
        .collect())
}
