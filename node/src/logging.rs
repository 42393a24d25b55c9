//! # Logging
//!
//! `agora-node` prints its results (script reports, inspected state,
//! templates, keys) as JSON on stdout, so every log line goes to stderr.
//! `RUST_LOG` takes precedence over `--log-level`.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Format of the stderr log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Colored, with source locations.
    Pretty,
    /// One JSON object per event, for piping `run` logs into a collector.
    Json,
}

/// Installs the global subscriber. Fails if one is already installed.
///
/// ```text
/// RUST_LOG=agora_contracts=debug,agora_protocol=trace agora-node run script.json
/// ```
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_current_span(true),
            )
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    tracing::debug!(?format, "logging initialized");
    Ok(())
}
