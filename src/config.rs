use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::mirror::DEFAULT_KEY_PREFIX;

/// API base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub mirror: MirrorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Per-request timeout; unset leaves the HTTP client's default
  pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
  /// Database file (default: $XDG_DATA_HOME/kpb/mirror.db)
  pub path: Option<PathBuf>,
  /// Namespace prefix for mirror keys
  #[serde(default = "default_key_prefix")]
  pub key_prefix: String,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      path: None,
      key_prefix: default_key_prefix(),
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_key_prefix() -> String {
  DEFAULT_KEY_PREFIX.to_string()
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./kpb.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/kpb/config.yaml
  ///
  /// Without a file the defaults are used. `KPB_API_URL` overrides the base URL.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var("KPB_API_URL") {
      config.api.base_url = url;
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("kpb.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("kpb").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file deserializes to null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  /// Check the API base URL is an absolute http(s) URL.
  pub fn validate(&self) -> Result<()> {
    let url = Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid api.base_url '{}': {}", self.api.base_url, e))?;
    match url.scheme() {
      "http" | "https" => Ok(()),
      other => Err(eyre!(
        "Unsupported api.base_url scheme '{}', expected http or https",
        other
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.mirror.key_prefix, "kpb_local_");
    assert!(config.mirror.path.is_none());
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_config() {
    let config = Config::from_yaml(
      r#"
api:
  base_url: https://bookings.example.com/api
  timeout_secs: 5
mirror:
  path: /tmp/kpb-mirror.db
"#,
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://bookings.example.com/api");
    assert_eq!(config.api.timeout_secs, Some(5));
    assert_eq!(config.mirror.path, Some(PathBuf::from("/tmp/kpb-mirror.db")));
    assert_eq!(config.mirror.key_prefix, "kpb_local_");
  }

  #[test]
  fn test_rejects_non_http_url() {
    let config = Config::from_yaml("api:\n  base_url: ftp://example.com/api\n").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let result = Config::load(Some(Path::new("/nonexistent/kpb.yaml")));
    assert!(result.is_err());
  }
}
