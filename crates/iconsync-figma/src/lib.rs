//! # iconsync-figma -- Typed Rust client for the Figma REST API
//!
//! Provides the two Figma endpoints the icon sync needs:
//! - **Files** via `GET /v1/files/{key}`: component and component-set tables
//! - **Images** via `GET /v1/images/{key}`: SVG render URLs, plus the
//!   download of each rendered SVG
//!
//! [`FigmaClient::fetch_icons`] ties them together into a list of
//! [`IconRecord`]s.
//!
//! ## Failure Model
//!
//! Fetching is all-or-nothing. Metadata and rendering run sequentially; SVG
//! downloads run concurrently, bounded by [`FigmaApiConfig::concurrency`].
//! The first failed download drops every in-flight download and the whole
//! fetch returns that error. There is no retry.

pub mod config;
pub mod error;
pub mod files;
pub mod images;
pub mod schema;

pub use config::{ConfigError, FigmaApiConfig};
pub use error::FigmaApiError;
pub use schema::SchemaIssue;

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use iconsync_core::{ComponentMetadata, IconRecord};

/// Header Figma reads personal access tokens from.
pub const TOKEN_HEADER: &str = "X-Figma-Token";

/// Top-level Figma API client. Holds sub-clients for each endpoint family.
#[derive(Debug, Clone)]
pub struct FigmaClient {
    files: files::FilesClient,
    images: images::ImagesClient,
    concurrency: usize,
}

impl FigmaClient {
    /// Create a new Figma API client from configuration.
    pub fn new(config: FigmaApiConfig) -> Result<Self, FigmaApiError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let api = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut token = reqwest::header::HeaderValue::from_str(config.access_token.as_str())
                    .map_err(|_| FigmaApiError::Config(ConfigError::InvalidToken))?;
                token.set_sensitive(true);
                headers.insert(TOKEN_HEADER, token);
                headers
            })
            .build()
            .map_err(|e| FigmaApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        // Render URLs are pre-signed; the token must not leak to them.
        let download = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FigmaApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            files: files::FilesClient::new(api.clone(), config.api_url.clone()),
            images: images::ImagesClient::new(api, download, config.api_url),
            concurrency: config.concurrency.max(1),
        })
    }

    /// Access the files client.
    pub fn files(&self) -> &files::FilesClient {
        &self.files
    }

    /// Access the images client.
    pub fn images(&self) -> &images::ImagesClient {
        &self.images
    }

    /// Fetch every icon component of a file with its rendered SVG.
    ///
    /// Icons are returned in the order of the render response.
    pub async fn fetch_icons(&self, file_key: &str) -> Result<Vec<IconRecord>, FigmaApiError> {
        let components = self.files.components(file_key).await?;
        let ids: Vec<&str> = components.iter().map(|c| c.id.as_str()).collect();
        let rendered = self.images.render_svg_urls(file_key, &ids).await?;

        let by_id: HashMap<&str, &ComponentMetadata> =
            components.iter().map(|c| (c.id.as_str(), c)).collect();
        let images = &self.images;

        let downloads = rendered.into_iter().enumerate().map(|(index, image)| {
            let metadata = by_id.get(image.id.as_str()).map(|m| (*m).clone());
            async move {
                let metadata = metadata.ok_or_else(|| FigmaApiError::MissingMetadata {
                    id: image.id.clone(),
                })?;
                let svg = images.download_svg(&image).await?;
                Ok::<_, FigmaApiError>((index, IconRecord::from_metadata(metadata, svg)))
            }
        });

        // try_collect returns on the first error, dropping unfinished downloads.
        let mut icons: Vec<(usize, IconRecord)> = stream::iter(downloads)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;
        icons.sort_by_key(|(index, _)| *index);

        tracing::info!(count = icons.len(), "fetched icons");
        Ok(icons.into_iter().map(|(_, icon)| icon).collect())
    }
}

/// Fetch every icon of `file_key` using the default API configuration.
pub async fn fetch_icons(access_token: &str, file_key: &str) -> Result<Vec<IconRecord>, FigmaApiError> {
    let config = FigmaApiConfig::with_token(access_token)?;
    FigmaClient::new(config)?.fetch_icons(file_key).await
}

/// Append path segments to a base URL.
pub(crate) fn endpoint_url(base_url: &url::Url, segments: &[&str]) -> url::Url {
    let mut url = base_url.clone();
    // Config guarantees a base-capable URL; otherwise segments are dropped
    // and the request fails with a transport or status error.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Check the status of an API response and parse its body as JSON.
pub(crate) async fn read_json(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<serde_json::Value, FigmaApiError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| FigmaApiError::Http {
        endpoint: endpoint.to_string(),
        source: e,
    })?;

    if !status.is_success() {
        return Err(FigmaApiError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| FigmaApiError::Deserialization {
        endpoint: endpoint.to_string(),
        source: e,
    })
}
