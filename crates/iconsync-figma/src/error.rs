//! Figma API client error types.

use crate::schema::SchemaIssue;

/// Errors from Figma API calls and icon resolution.
///
/// Every variant aborts the whole fetch; no partial icon list is returned.
#[derive(Debug, thiserror::Error)]
pub enum FigmaApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Figma API returned a non-2xx status.
    #[error("Figma API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body was not valid JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Response JSON did not have the expected shape.
    #[error(
        "{endpoint} response failed schema validation with {} issue(s): {}",
        .issues.len(),
        join_issues(.issues)
    )]
    SchemaValidation {
        endpoint: String,
        issues: Vec<SchemaIssue>,
    },
    /// A built-in response schema failed to compile.
    #[error("failed to compile response schema for {endpoint}: {reason}")]
    SchemaCompile { endpoint: String, reason: String },
    /// A component references a component set that is absent or unnamed.
    #[error(
        "unable to get icon name: component set {component_set_id} \
         (referenced by component {component_id}) was not found"
    )]
    MissingComponentSet {
        component_id: String,
        component_set_id: String,
    },
    /// The render endpoint returned an id that was never requested.
    #[error("unable to find icon metadata for id {id}")]
    MissingMetadata { id: String },
    /// A rendered SVG could not be downloaded.
    #[error("unexpected {status} ({reason}) response while fetching image with id {id} from {url}")]
    ImageDownload {
        id: String,
        url: String,
        status: u16,
        reason: String,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
