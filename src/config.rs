// src/config.rs

//! Engine configuration
//!
//! Settings are read from an optional TOML file. Anything missing falls back
//! to defaults, and `STENCIL_ROOT` overrides the root directory so tests and
//! scripted runs can point the engine at an isolated tree.
//!
//! ```toml
//! root_dir = "/opt/stencil"
//! connect_timeout_secs = 3
//! request_timeout_secs = 30
//!
//! [central]
//! name = "central"
//! url = "https://example.com/central/central-repository.json"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `root_dir`
pub const ROOT_ENV_VAR: &str = "STENCIL_ROOT";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Remote repository registered automatically on every refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralRepositoryConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application root; templates live under `<root>/templates`
    pub root_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Honor HTTP(S)_PROXY from the environment
    pub use_system_proxy: bool,
    pub central: Option<CentralRepositoryConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            use_system_proxy: true,
            central: None,
        }
    }
}

impl EngineConfig {
    /// Configuration rooted at `root_dir` with every other setting defaulted
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Load from an optional TOML file, then apply the environment override
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };

        if let Ok(root) = std::env::var(ROOT_ENV_VAR) {
            if !root.is_empty() {
                config.root_dir = PathBuf::from(root);
            }
        }

        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid configuration: {e}")))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_root_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("stencil")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::with_root("/tmp/stencil");
        assert_eq!(config.root_dir, PathBuf::from("/tmp/stencil"));
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.max_retries, 3);
        assert!(config.central.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            root_dir = "/srv/stencil"
            request_timeout_secs = 5

            [central]
            name = "central"
            url = "https://example.com/central-repository.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_dir, PathBuf::from("/srv/stencil"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.central.unwrap().name, "central");
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml_str("root_dir = [").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
