//! Tracing setup.
//!
//! The terminal belongs to the game screen, so log output goes to a file.
//! Nothing is installed unless a log file is requested.

use std::{fs::File, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a tracing subscriber writing to `path`.
///
/// Reads `RUST_LOG` env var. Defaults to `info` if unset.
///
/// # Example
/// ```bash
/// RUST_LOG=trap_world_core=debug cargo run -p trap_world_tui -- --log game.log
/// ```
pub fn init(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .compact(),
        )
        .try_init()
        .context("Failed to install tracing subscriber")
}
