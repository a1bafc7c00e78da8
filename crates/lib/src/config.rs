//! Compiler configuration.
//!
//! Settings come from a JSON file, then environment overrides are applied on
//! top. A missing file is not an error: every field has a default.
//!
//! # File Location
//!
//! - An explicit path, when given
//! - Otherwise `$XDG_CONFIG_HOME/confrag/config.json`, falling back to
//!   `$HOME/.config/confrag/config.json`
//!
//! # Environment Overrides
//!
//! - `CONFRAG_DEFAULT_DESTINATION`
//! - `CONFRAG_REMOVE_MODE` (`force` or `compare_and_delete`)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{APP_NAME, DEFAULT_CHANNEL_CAPACITY, DEFAULT_COMPONENT_KIND, DEFAULT_DESTINATION};
use crate::store::RemoveMode;

const CONFIG_FILENAME: &str = "config.json";
const ENV_DEFAULT_DESTINATION: &str = "CONFRAG_DEFAULT_DESTINATION";
const ENV_REMOVE_MODE: &str = "CONFRAG_REMOVE_MODE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Component kind stamped on every destination.
  pub component_kind: String,
  /// Destination for producer services that do not name one.
  pub default_destination: String,
  /// How removal events treat the version they carry.
  pub remove_mode: RemoveMode,
  /// Depth of the processor's event channel.
  pub channel_capacity: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      component_kind: DEFAULT_COMPONENT_KIND.to_string(),
      default_destination: DEFAULT_DESTINATION.to_string(),
      remove_mode: RemoveMode::default(),
      channel_capacity: DEFAULT_CHANNEL_CAPACITY,
    }
  }
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid value for {var}: {message}")]
  Env { var: &'static str, message: String },

  #[error("channel_capacity must be greater than zero")]
  ZeroCapacity,
}

impl Config {
  /// Load configuration from `path`, or from the default location.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = match path {
      Some(p) => Some(p.to_path_buf()),
      None => default_config_path(),
    };

    let mut config = match path {
      Some(path) => Self::from_file(&path)?,
      None => Config::default(),
    };
    config.apply_env()?;

    if config.channel_capacity == 0 {
      return Err(ConfigError::ZeroCapacity);
    }
    Ok(config)
  }

  /// Read a config file. A missing file yields the defaults.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
      }
      Err(source) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
  }

  fn apply_env(&mut self) -> Result<(), ConfigError> {
    if let Some(destination) = std::env::var(ENV_DEFAULT_DESTINATION).ok().filter(|d| !d.is_empty()) {
      self.default_destination = destination;
    }
    if let Ok(mode) = std::env::var(ENV_REMOVE_MODE) {
      self.remove_mode = mode.parse().map_err(|message| ConfigError::Env {
        var: ENV_REMOVE_MODE,
        message,
      })?;
    }
    Ok(())
  }
}

/// Returns the default config file path, if a config home can be determined.
pub fn default_config_path() -> Option<PathBuf> {
  let config_home = std::env::var("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
    .ok()?;
  Some(config_home.join(APP_NAME).join(CONFIG_FILENAME))
}
