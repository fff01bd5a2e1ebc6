//! Directory for release-build log files
//!
//! Lives under the platform cache directory, for example
//! `~/.cache/blueocean-dashboard/logs` on Linux and
//! `~/Library/Caches/blueocean-dashboard/logs` on macOS.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "blueocean-dashboard";

/// Log directory, created on first use
pub fn log_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join(APP_NAME)
        .join("logs");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    Ok(dir)
}
