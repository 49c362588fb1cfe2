//! Reading and writing the TOML configuration file.

use crate::config::Config;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Load the configuration at `path`; a missing file yields the defaults.
///
/// Relative `log.path`, `export.dir` and `annotate.font` entries are taken
/// relative to the file's directory, so a config travels with its data.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let mut config: Config = toml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        for entry in [
            &mut config.log.path,
            &mut config.export.dir,
            &mut config.annotate.font,
        ] {
            anchor(entry, base);
        }
    }
    Ok(config)
}

/// Load the configuration from the platform config directory.
///
/// A platform without a config directory runs on the defaults.
pub fn load_default_config() -> Result<Config> {
    match super::config_file_path() {
        Ok(path) => load_config_file(&path),
        Err(Error::ConfigDirNotFound) => Ok(Config::default()),
        Err(e) => Err(e),
    }
}

/// Write `config` to `path`, creating parent directories.
///
/// The file is written next to its destination and renamed into place, so
/// readers never see a partial config.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let write_error = |source| Error::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;

    let staging = path.with_extension("toml.tmp");
    std::fs::write(&staging, contents).map_err(write_error)?;
    std::fs::rename(&staging, path).map_err(write_error)
}

fn anchor(entry: &mut Option<PathBuf>, base: &Path) {
    if let Some(path) = entry
        && path.is_relative()
    {
        *path = base.join(&*path);
    }
}
