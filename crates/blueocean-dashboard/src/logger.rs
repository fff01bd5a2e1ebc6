//! File-based logging using simplelog
//!
//! Log file location depends on build type:
//! - Debug builds: current working directory (for development convenience)
//! - Release builds: cache directory (~/.cache/blueocean-dashboard/logs/ on Linux)

use anyhow::{Context, Result};
use blueocean_config::DashboardConfig;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;

/// Get the log file path based on build type
fn log_file_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("dashboard-{}.log", timestamp);

    if cfg!(debug_assertions) {
        PathBuf::from(filename)
    } else {
        blueocean_config::log_dir()
            .map(|dir| dir.join(&filename))
            .unwrap_or_else(|_| PathBuf::from(filename))
    }
}

/// Level named by RUST_LOG, or `fallback` for anything unrecognised
fn parse_level(value: &str, fallback: LevelFilter) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => fallback,
    }
}

/// Initialize file-based logging
///
/// Creates a log file with timestamp, optionally mirrored to stderr.
/// Returns the path to the log file.
pub fn init(config: &DashboardConfig) -> Result<PathBuf> {
    let log_file = log_file_path();

    let level = std::env::var("RUST_LOG")
        .map(|v| parse_level(&v, config.level_filter()))
        .unwrap_or_else(|_| config.level_filter());

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // Fallback if local time offset fails
        .build();

    let file = File::create(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![WriteLogger::new(level, log_config.clone(), file)];
    if config.log_to_stderr {
        loggers.push(TermLogger::new(
            level,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers).context("Failed to initialize logger")?;

    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("warn", LevelFilter::Debug), LevelFilter::Warn);
        assert_eq!(parse_level("TRACE", LevelFilter::Debug), LevelFilter::Trace);
        assert_eq!(parse_level("verbose", LevelFilter::Info), LevelFilter::Info);
    }

    #[test]
    fn test_log_file_name_has_timestamp() {
        let path = log_file_path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("dashboard-"));
        assert!(name.ends_with(".log"));
    }
}
