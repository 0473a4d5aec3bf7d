//! Client configuration file (`worksheets.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terminal::MIN_HEIGHT;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_FILE: &str = "worksheets.json";
pub const DEFAULT_BASE_URL: &str = "http://localhost:2900";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),

    #[error("base_url must start with http:// or https:// (got `{0}`)")]
    InvalidBaseUrl(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub version: u32,

    pub base_url: String,

    /// Worksheet opened when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_worksheet: Option<String>,

    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Rows when the terminal is not focused.
    pub min_height: u16,
    /// Rows when focused, until the user resizes it.
    pub default_height: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            min_height: MIN_HEIGHT,
            default_height: 12,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_worksheet: None,
            terminal: TerminalConfig::default(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let cfg: ClientConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self).context("serialize config")?;
        write_atomic(path, &bytes).with_context(|| format!("write {}", path.display()))
    }

    /// Applies command-line / environment overrides.
    pub fn with_overrides(mut self, server: Option<&str>, worksheet: Option<&str>) -> Self {
        if let Some(server) = server {
            self.base_url = server.trim_end_matches('/').to_string();
        }
        if let Some(worksheet) = worksheet {
            self.default_worksheet = Some(worksheet.to_string());
        }
        self
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
