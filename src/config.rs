use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::presenter::ToggleResort;
use crate::store::SortField;

/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "OUTLINETODO_DIR";
/// Overrides the log filter, same syntax as `RUST_LOG`.
pub const LOG_ENV: &str = "OUTLINETODO_LOG";

const DEFAULT_DATA_DIR: &str = ".outlinetodo";
const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "todos";
const LOG_FILE: &str = "outlinetodo.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Sort used when the app starts.
    pub sort: SortField,
    pub toggle_resort: ToggleResort,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub list: ListConfig,
    pub log: LogConfig,
    #[serde(skip)]
    data_dir: PathBuf,
}

impl Config {
    /// Loads `config.toml` from the data directory picked by the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self::load_from(&data_dir)
    }

    /// Missing file means defaults.
    pub fn load_from(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str::<Config>(&content)
                .map_err(|source| ConfigError::Parse { path, source })?
        } else {
            Config::default()
        };
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.list.sort, SortField::Date);
        assert_eq!(config.list.toggle_resort, ToggleResort::WhenSortedByStatus);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.store_path(), dir.path().join("todos"));
        assert_eq!(config.log_path(), dir.path().join("outlinetodo.log"));
    }

    #[test]
    fn reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[list]\nsort = \"status\"\ntoggle_resort = \"never\"\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.list.sort, SortField::Status);
        assert_eq!(config.list.toggle_resort, ToggleResort::Never);
        assert_eq!(config.log, LogConfig::default());
        assert_eq!(config.data_dir(), dir.path());
    }

    #[test]
    fn rejects_unknown_sort() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[list]\nsort = \"priority\"\n").unwrap();

        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
