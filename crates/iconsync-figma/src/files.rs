//! Typed client for the Figma files endpoint.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/v1/files/{file_key}` | File document plus component tables |
//!
//! Only the `components` and `componentSets` tables are read. Each component
//! record carries its variant assignments in `name` (e.g. `"Size=24,
//! Color=Red"`) and points to its owning set through `componentSetId`; the
//! set's `name` is the human-readable icon name.

use iconsync_core::{parse_icon_name, ComponentMetadata};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::FigmaApiError;
use crate::schema;

// -- Response types -----------------------------------------------------------

/// The slice of a files response the icon sync reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// Component sets keyed by node id.
    pub component_sets: IndexMap<String, ComponentSetRecord>,
    /// Components keyed by node id, in document order.
    pub components: IndexMap<String, ComponentRecord>,
}

/// A component set: one icon with all of its variants.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSetRecord {
    pub name: String,
}

/// A single component variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Variant assignments, e.g. `"Size=24, Color=Red"`.
    pub name: String,
    pub component_set_id: String,
}

// -- Client -------------------------------------------------------------------

/// Client for the Figma files endpoint.
#[derive(Debug, Clone)]
pub struct FilesClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl FilesClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch and resolve every component of a file.
    ///
    /// Calls `GET {base_url}/v1/files/{file_key}`. Components are returned in
    /// response order.
    pub async fn components(&self, file_key: &str) -> Result<Vec<ComponentMetadata>, FigmaApiError> {
        let endpoint = format!("GET /v1/files/{file_key}");
        let url = crate::endpoint_url(&self.base_url, &["v1", "files", file_key]);

        tracing::debug!(%endpoint, "fetching file metadata");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FigmaApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let body = crate::read_json(resp, &endpoint).await?;
        let file: FileResponse = schema::decode(body, &schema::file_response_schema(), &endpoint)?;
        let components = resolve_components(file)?;

        tracing::info!(count = components.len(), "resolved icon components");
        Ok(components)
    }
}

/// Join each component with its set's name.
///
/// The first component whose set is absent or unnamed aborts the resolution.
pub(crate) fn resolve_components(
    file: FileResponse,
) -> Result<Vec<ComponentMetadata>, FigmaApiError> {
    let FileResponse {
        component_sets,
        components,
    } = file;

    components
        .into_iter()
        .map(|(id, record)| {
            let name = component_sets
                .get(&record.component_set_id)
                .map(|set| set.name.as_str())
                .filter(|name| !name.is_empty())
                .ok_or_else(|| FigmaApiError::MissingComponentSet {
                    component_id: id.clone(),
                    component_set_id: record.component_set_id.clone(),
                })?;
            Ok(ComponentMetadata {
                properties: parse_icon_name(&record.name),
                name: name.to_string(),
                id,
            })
        })
        .collect()
}
