//! # iconsync CLI entry point
//!
//! Parses command-line arguments, initializes logging, and runs one sync.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use iconsync_cli::{run_sync, SyncArgs, SyncConfig};

/// Mirror the icon components of a Figma file into a directory of SVG files.
///
/// Requires a personal access token in the FIGMA_PAT environment variable.
#[derive(Parser, Debug)]
#[command(name = "iconsync", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    sync: SyncArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level. Logs go to stderr so
    // stdout carries only the sync report.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!("cannot determine current directory: {e}");
            return ExitCode::from(1);
        }
    };

    let config = match SyncConfig::resolve(&cli.sync, &cwd, |var| std::env::var(var).ok()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };

    tracing::debug!(?config, "resolved configuration");

    match run_sync(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
