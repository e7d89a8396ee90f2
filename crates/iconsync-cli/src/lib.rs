//! # iconsync-cli — Figma Icon Sync
//!
//! Provides the `iconsync` command-line interface, which mirrors the icon
//! components of a Figma file into a local directory of SVG files:
//!
//! ```bash
//! FIGMA_PAT=figd_... iconsync --file FILE_KEY --out ./icons
//! ```
//!
//! ## Run Order
//!
//! 1. Resolve configuration ([`SyncConfig::resolve`]). Fails before any
//!    network call.
//! 2. Capture the output directory ([`OutputDir::prepare`]).
//! 3. Fetch all icons ([`iconsync_figma::FigmaClient::fetch_icons`]).
//!    Any failure aborts the run with the directory untouched.
//! 4. Reconcile the directory ([`OutputDir::apply`]) and print a summary.

pub mod config;
pub mod sync;

pub use config::{ConfigError, SyncArgs, SyncConfig};
pub use sync::{OutputDir, SyncPolicy, SyncReport};

use anyhow::{Context, Result};
use iconsync_figma::FigmaClient;

/// Execute a full sync run.
pub async fn run_sync(config: &SyncConfig) -> Result<SyncReport> {
    let output = OutputDir::prepare(&config.output_dir, config.policy).await?;

    let client = FigmaClient::new(config.api.clone())?;
    let icons = client
        .fetch_icons(&config.file_key)
        .await
        .with_context(|| format!("failed to fetch icons from Figma file {}", config.file_key))?;

    let report = output.apply(&icons, config.api.concurrency).await?;
    report.print_summary();

    tracing::info!(
        synced = report.synced,
        removed = report.removed,
        path = %output.path().display(),
        "sync complete"
    );
    Ok(report)
}
