//! Persistence for the flowctl connection config file.
//!
//! The file is a small JSON document with the instance credentials under an
//! `n8n` section:
//!
//! ```json
//! { "n8n": { "baseUrl": "https://n8n.example.com", "apiKey": "..." } }
//! ```
//!
//! It lives next to the invocation by default (`./config.json`) and can be
//! pointed elsewhere via the `--config` flag or `FLOWCTL_CONFIG_PATH`. The
//! store reads the whole document, merges updates shallowly into the `n8n`
//! section, and writes the document back pretty-printed, so foreign
//! top-level sections survive rewrites untouched.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use flowctl_types::ClientConfig;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "FLOWCTL_CONFIG_PATH";

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Error surfaced when reading or writing the config file fails.
///
/// Config problems are fatal at the CLI level: there is no recovery path
/// without valid credentials.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file '{path}' is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config file '{path}' has no 'n8n' section")]
    MissingSection { path: PathBuf },
}

/// Partial update applied over the `n8n` section; only present fields win.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ConfigUpdate {
    /// True when no field is set; callers treat this as a usage error.
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.api_key.is_none() && self.username.is_none() && self.password.is_none()
    }
}

/// The config document plus the path it was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    document: Map<String, Value>,
}

impl ConfigStore {
    /// Load and parse the document at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigStoreError> {
        let path = path.into();
        let raw = fs::read_to_string(&path).map_err(|source| ConfigStoreError::Io {
            path: path.clone(),
            source,
        })?;
        let document = serde_json::from_str(&raw).map_err(|source| ConfigStoreError::Malformed {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(Self { path, document })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The typed `n8n` section, for constructing the API client.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigStoreError> {
        let section = self.document.get("n8n").ok_or_else(|| ConfigStoreError::MissingSection {
            path: self.path.clone(),
        })?;
        serde_json::from_value(section.clone()).map_err(|source| ConfigStoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Shallow-merge `update` into the `n8n` section.
    ///
    /// Fields absent from the update keep their current values; sections
    /// other than `n8n` are left untouched.
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<(), ConfigStoreError> {
        let patch = match serde_json::to_value(update) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let section = self
            .document
            .entry("n8n".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(section) = section {
            for (key, value) in patch {
                section.insert(key, value);
            }
            Ok(())
        } else {
            Err(ConfigStoreError::MissingSection {
                path: self.path.clone(),
            })
        }
    }

    /// Write the document back pretty-printed.
    pub fn save(&self) -> Result<(), ConfigStoreError> {
        let data = serde_json::to_string_pretty(&self.document).map_err(|source| ConfigStoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, data).map_err(|source| ConfigStoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Resolve the config file path: explicit flag, then the environment
/// override, then the project-local default.
pub fn resolve_config_path(flag: Option<&str>) -> PathBuf {
    if let Some(path) = flag {
        return PathBuf::from(path);
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
