//! # Sync Configuration
//!
//! Combines command-line flags with environment variables into a validated
//! [`SyncConfig`]. Resolution happens before any network call, so a missing
//! token or flag aborts the run without side effects.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Args;
use iconsync_figma::FigmaApiConfig;

use crate::sync::SyncPolicy;

/// Arguments for an icon sync run.
#[derive(Args, Debug, Default, Clone)]
pub struct SyncArgs {
    /// Figma file key, taken from the file URL
    /// (https://www.figma.com/design/FILE_KEY/...).
    #[arg(long = "file", value_name = "FILE_KEY")]
    pub file_key: Option<String>,

    /// Output directory, relative to the current working directory.
    #[arg(long = "out", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Delete the whole output directory before writing icons, instead of
    /// removing only stale icon files.
    #[arg(long)]
    pub clean: bool,

    /// Maximum concurrent SVG downloads and file writes
    /// (default: FIGMA_CONCURRENCY or 16).
    #[arg(long, value_name = "N")]
    pub concurrency: Option<NonZeroUsize>,
}

/// Fully validated settings for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Figma API connection settings, including the access token.
    pub api: FigmaApiConfig,
    /// Key of the Figma file to mirror.
    pub file_key: String,
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// How stale files are removed.
    pub policy: SyncPolicy,
}

impl SyncConfig {
    /// Validate `args` and environment variables (read through `lookup`).
    ///
    /// Checks run in a fixed order: token, file key, output directory.
    /// A relative output directory is resolved against `cwd`.
    pub fn resolve<F>(args: &SyncArgs, cwd: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut api = FigmaApiConfig::from_lookup(lookup)?;

        let file_key = args
            .file_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingFileKey)?;

        let output_dir = args
            .output_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| cwd.join(dir))
            .ok_or(ConfigError::MissingOutputDir)?;

        if let Some(concurrency) = args.concurrency {
            api.concurrency = concurrency.get();
        }

        let policy = if args.clean {
            SyncPolicy::CleanSlate
        } else {
            SyncPolicy::Incremental
        };

        Ok(Self {
            api,
            file_key,
            output_dir,
            policy,
        })
    }
}

/// Configuration errors reported before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Api(#[from] iconsync_figma::ConfigError),
    #[error(
        "missing file key. Pass the Figma file key via --file. For example, given the file URL \
         https://www.figma.com/design/FILE_KEY/Icon-Playground, pass: --file FILE_KEY"
    )]
    MissingFileKey,
    #[error(
        "missing output directory. Pass the path to the output directory relative to the \
         current working directory. For example: --out ./icons"
    )]
    MissingOutputDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token(var: &str) -> Option<String> {
        (var == "FIGMA_PAT").then(|| "figd_test".to_string())
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn args(file: Option<&str>, out: Option<&str>) -> SyncArgs {
        SyncArgs {
            file_key: file.map(String::from),
            output_dir: out.map(PathBuf::from),
            ..SyncArgs::default()
        }
    }

    #[test]
    fn resolves_relative_output_against_cwd() {
        let cfg = SyncConfig::resolve(
            &args(Some("KEY"), Some("icons")),
            Path::new("/work"),
            with_token,
        )
        .unwrap();
        assert_eq!(cfg.file_key, "KEY");
        assert_eq!(cfg.output_dir, PathBuf::from("/work/icons"));
        assert_eq!(cfg.policy, SyncPolicy::Incremental);
        assert_eq!(cfg.api.access_token.as_str(), "figd_test");
    }

    #[test]
    fn absolute_output_is_kept() {
        let cfg = SyncConfig::resolve(
            &args(Some("KEY"), Some("/tmp/icons")),
            Path::new("/work"),
            with_token,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/icons"));
    }

    #[test]
    fn token_is_checked_first() {
        let err = SyncConfig::resolve(&args(None, None), Path::new("/work"), no_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Api(iconsync_figma::ConfigError::MissingToken)
        ));
    }

    #[test]
    fn missing_file_key_is_reported() {
        let err =
            SyncConfig::resolve(&args(None, Some("icons")), Path::new("/work"), with_token)
                .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFileKey));
        assert!(err.to_string().contains("--file"));
    }

    #[test]
    fn missing_output_dir_is_reported() {
        let err = SyncConfig::resolve(&args(Some("KEY"), None), Path::new("/work"), with_token)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingOutputDir));
        assert!(err.to_string().contains("--out"));
    }

    #[test]
    fn clean_flag_selects_clean_slate_policy() {
        let mut a = args(Some("KEY"), Some("icons"));
        a.clean = true;
        let cfg = SyncConfig::resolve(&a, Path::new("/work"), with_token).unwrap();
        assert_eq!(cfg.policy, SyncPolicy::CleanSlate);
    }

    #[test]
    fn concurrency_flag_overrides_environment() {
        let mut a = args(Some("KEY"), Some("icons"));
        a.concurrency = NonZeroUsize::new(3);
        let cfg = SyncConfig::resolve(&a, Path::new("/work"), with_token).unwrap();
        assert_eq!(cfg.api.concurrency, 3);
    }
}
