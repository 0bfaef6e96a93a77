//! YAML configuration.
//!
//! Every field is optional. A relative `todo_file` resolves against the
//! directory holding the config file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};
use crate::store::DEFAULT_TODO_FILENAME;

pub const DEFAULT_CONFIG_FILENAME: &str = "todos.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub todo_file: PathBuf,
    pub log_level: String,
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            todo_file: PathBuf::from(DEFAULT_TODO_FILENAME),
            log_level: "warn".to_string(),
            web: WebConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Config> {
        serde_yaml::from_str(yaml).map_err(|source| TodoError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`. When `required` is false a missing file yields defaults.
    pub fn load(path: &Path, required: bool) -> Result<Config> {
        let yaml = match fs::read_to_string(path) {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound && !required => {
                return Ok(Config::default())
            }
            Err(e) => return Err(TodoError::io("read", path, e)),
        };
        // An empty file deserializes to unit, not a mapping.
        let mut config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            Config::from_yaml(&yaml, path)?
        };
        if config.todo_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.todo_file = dir.join(&config.todo_file);
            }
        }
        Ok(config)
    }
}
