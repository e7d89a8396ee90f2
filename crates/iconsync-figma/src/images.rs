//! Typed client for the Figma image render endpoint.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/v1/images/{file_key}?ids=...&format=svg` | Render nodes, return download URLs |
//!
//! The render endpoint answers with `{"err": ..., "images": {id: url}}`.
//! Each URL is short-lived and serves the raw SVG without authentication,
//! so downloads go through a client that does not carry the API token.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::FigmaApiError;
use crate::schema;

/// Body of a render response.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderResponse {
    /// Figma's own error report, usually `null`.
    #[serde(default)]
    pub err: Option<Value>,
    /// Download URL per requested node id.
    pub images: IndexMap<String, Url>,
}

/// A rendered node and the URL its SVG can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// Figma node identifier.
    pub id: String,
    /// Transient download URL.
    pub url: Url,
}

/// Client for the Figma images endpoint and render URL downloads.
#[derive(Debug, Clone)]
pub struct ImagesClient {
    api: reqwest::Client,
    download: reqwest::Client,
    base_url: Url,
}

impl ImagesClient {
    pub(crate) fn new(api: reqwest::Client, download: reqwest::Client, base_url: Url) -> Self {
        Self {
            api,
            download,
            base_url,
        }
    }

    /// Ask Figma to render `ids` as SVG in a single batched call.
    ///
    /// Calls `GET {base_url}/v1/images/{file_key}?ids={ids}&format=svg`.
    /// Returns images in response order. No request is made for an empty
    /// id list.
    pub async fn render_svg_urls(
        &self,
        file_key: &str,
        ids: &[&str],
    ) -> Result<Vec<RenderedImage>, FigmaApiError> {
        if ids.is_empty() {
            tracing::debug!("no components to render");
            return Ok(Vec::new());
        }

        let endpoint = format!("GET /v1/images/{file_key}");
        let url = crate::endpoint_url(&self.base_url, &["v1", "images", file_key]);
        let joined = ids.join(",");

        tracing::debug!(%endpoint, count = ids.len(), "requesting SVG renders");

        let resp = self
            .api
            .get(url)
            .query(&[("ids", joined.as_str()), ("format", "svg")])
            .send()
            .await
            .map_err(|e| FigmaApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let body = crate::read_json(resp, &endpoint).await?;
        let response: RenderResponse =
            schema::decode(body, &schema::render_response_schema(), &endpoint)?;
        Ok(rendered_images(response, &endpoint))
    }

    /// Download the SVG markup behind a render URL.
    pub async fn download_svg(&self, image: &RenderedImage) -> Result<String, FigmaApiError> {
        let endpoint = format!("GET {}", image.url);

        let resp = self
            .download
            .get(image.url.clone())
            .send()
            .await
            .map_err(|e| FigmaApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FigmaApiError::ImageDownload {
                id: image.id.clone(),
                url: image.url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let svg = resp.text().await.map_err(|e| FigmaApiError::Http {
            endpoint,
            source: e,
        })?;
        tracing::debug!(id = %image.id, bytes = svg.len(), "downloaded SVG");
        Ok(svg)
    }
}

/// Flatten a render response into `(id, url)` pairs in response order.
pub(crate) fn rendered_images(response: RenderResponse, endpoint: &str) -> Vec<RenderedImage> {
    if let Some(Value::String(err)) = &response.err {
        tracing::warn!(%endpoint, "Figma reported a render error: {err}");
    }

    response
        .images
        .into_iter()
        .map(|(id, url)| RenderedImage { id, url })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ENDPOINT: &str = "GET /v1/images/abc";

    fn parse(body: Value) -> Result<Vec<RenderedImage>, FigmaApiError> {
        let response: RenderResponse =
            schema::decode(body, &schema::render_response_schema(), ENDPOINT)?;
        Ok(rendered_images(response, ENDPOINT))
    }

    #[test]
    fn parses_images_in_response_order() {
        let body = json!({
            "err": null,
            "images": {
                "1:9": "https://s3.example.com/render/9.svg",
                "1:1": "https://s3.example.com/render/1.svg"
            }
        });

        let images = parse(body).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id, "1:9");
        assert_eq!(images[0].url.as_str(), "https://s3.example.com/render/9.svg");
        assert_eq!(images[1].id, "1:1");
    }

    #[test]
    fn render_error_string_does_not_fail_the_call() {
        let body = json!({"err": "partial", "images": {}});
        assert!(parse(body).unwrap().is_empty());
    }

    #[test]
    fn null_url_is_a_schema_issue() {
        let body = json!({"err": null, "images": {"1:1": null}});
        match parse(body).unwrap_err() {
            FigmaApiError::SchemaValidation { issues, .. } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "/images/1:1");
            }
            other => panic!("expected SchemaValidation, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_url_is_a_schema_issue() {
        let body = json!({"images": {"1:1": "not a url", "1:2": "https://ok.example.com/x"}});
        match parse(body).unwrap_err() {
            FigmaApiError::SchemaValidation { issues, .. } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "/images/1:1");
            }
            other => panic!("expected SchemaValidation, got: {other:?}"),
        }
    }

    #[test]
    fn missing_images_table_is_a_schema_issue() {
        let body = json!({"err": "Render timeout"});
        assert!(matches!(
            parse(body),
            Err(FigmaApiError::SchemaValidation { .. })
        ));
    }
}
