//! Platform-specific configuration and data paths.

use crate::config::Config;
use crate::constants::{APP_NAME, LOG_FILE_NAME};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/signwatch/`
/// - macOS: `~/Library/Application Support/signwatch/`
/// - Windows: `%APPDATA%\signwatch\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the local data directory, where the log table lives by default.
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .ok_or(Error::DataDirNotFound)
}

/// Resolve the log table path: configured path, else the data directory.
pub fn log_file_path(config: &Config) -> Result<PathBuf> {
    match &config.log.path {
        Some(path) => Ok(path.clone()),
        None => Ok(data_dir()?.join(LOG_FILE_NAME)),
    }
}

/// Resolve the export directory: configured directory, else next to the log table.
pub fn export_dir(config: &Config) -> Result<PathBuf> {
    if let Some(dir) = &config.export.dir {
        return Ok(dir.clone());
    }
    let log_path = log_file_path(config)?;
    Ok(log_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf))
}
