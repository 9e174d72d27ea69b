use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::config::Config;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Config file path, respecting XDG_CONFIG_HOME
pub fn default_config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("planner").join("config.toml")
}

/// Data directory, respecting XDG_DATA_HOME
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join("planner")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Parse a config file strictly. A missing file is an error here.
pub fn read_config_strict(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the config, falling back to defaults.
/// A corrupted file is backed up as `.toml.bak` and defaults are used.
pub fn read_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match read_config_strict(path) {
        Ok(config) => config,
        Err(ConfigError::ParseError(e)) => {
            let bak = path.with_extension("toml.bak");
            let _ = fs::copy(path, &bak);
            warn!(
                path = %path.display(),
                backup = %bak.display(),
                error = %e,
                "could not parse config, using defaults"
            );
            Config::default()
        }
        Err(e) => {
            warn!(error = %e, "could not read config, using defaults");
            Config::default()
        }
    }
}

/// Resolve the data directory: explicit override, then config, then XDG default
pub fn resolve_data_dir(override_dir: Option<&Path>, config: &Config) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .or_else(|| config.storage.dir.clone())
        .unwrap_or_else(default_data_dir)
}
