//! Configuration and file management for the Blue Ocean dashboard
//!
//! This crate provides:
//! - Configuration file discovery (CWD, then home directory)
//! - The dashboard configuration and a record of where it came from
//! - The release-build log directory

pub mod config_file;
pub mod dashboard_config;
pub mod paths;

pub use config_file::{config_candidates, CONFIG_FILE};
pub use dashboard_config::{ConfigSource, DashboardConfig};
pub use paths::log_dir;
