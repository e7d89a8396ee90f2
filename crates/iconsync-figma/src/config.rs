//! Figma API client configuration.
//!
//! Defaults point to the public Figma API. Override via environment
//! variables or explicit construction for proxies and testing.

use url::Url;
use zeroize::Zeroizing;

/// Public Figma REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.figma.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of SVG downloads kept in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Configuration for connecting to the Figma API.
///
/// Custom `Debug` implementation redacts the `access_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct FigmaApiConfig {
    /// Base URL of the REST API. Always ends with `/`.
    pub api_url: Url,
    /// Personal access token, sent as `X-Figma-Token`.
    pub access_token: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum concurrent SVG downloads.
    pub concurrency: usize,
}

impl std::fmt::Debug for FigmaApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FigmaApiConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl FigmaApiConfig {
    /// Default configuration with the given access token.
    pub fn with_token(access_token: &str) -> Result<Self, ConfigError> {
        if access_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(Self {
            api_url: parse_base_url("FIGMA_API_URL", DEFAULT_API_URL)?,
            access_token: Zeroizing::new(access_token.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Load configuration from process environment variables.
    ///
    /// Variables:
    /// - `FIGMA_PAT` (required)
    /// - `FIGMA_API_URL` (default: `https://api.figma.com`)
    /// - `FIGMA_TIMEOUT_SECS` (default: 30)
    /// - `FIGMA_CONCURRENCY` (default: 16)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here with `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup("FIGMA_PAT")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let api_url = match lookup("FIGMA_API_URL") {
            Some(raw) => parse_base_url("FIGMA_API_URL", &raw)?,
            None => parse_base_url("FIGMA_API_URL", DEFAULT_API_URL)?,
        };

        let timeout_secs = match lookup("FIGMA_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("FIGMA_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let concurrency = match lookup("FIGMA_CONCURRENCY") {
            Some(raw) => parse_concurrency("FIGMA_CONCURRENCY", &raw)?,
            None => DEFAULT_CONCURRENCY,
        };

        Ok(Self {
            api_url,
            access_token: Zeroizing::new(access_token),
            timeout_secs,
            concurrency,
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url("local_mock", base_url)?,
            access_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
            concurrency: 4,
        })
    }
}

/// Parse a base URL, normalizing its path to end with `/` so that endpoint
/// segments append rather than replace the last segment.
fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a request timeout in seconds. Zero would fail every request.
fn parse_timeout(var: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidSetting {
            var: var.to_string(),
            value: raw.to_string(),
            expected: "a positive number of seconds",
        }),
    }
}

/// Parse a download concurrency limit. Zero would stall every download.
fn parse_concurrency(var: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidSetting {
            var: var.to_string(),
            value: raw.to_string(),
            expected: "a positive integer",
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "missing environment variable FIGMA_PAT. Generate a personal access token under \
         Figma account settings and pass it in the FIGMA_PAT environment variable"
    )]
    MissingToken,
    #[error("FIGMA_PAT contains characters that are not valid in an HTTP header")]
    InvalidToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value {value:?} for {var}: expected {expected}")]
    InvalidSetting {
        var: String,
        value: String,
        expected: &'static str,
    },
}
