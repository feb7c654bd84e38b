//! Configuration management for buildcache

pub mod schema;

pub use schema::{CacheConfig, Config};

use crate::error::{BuildCacheError, BuildCacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the workspace-local config file
pub const LOCAL_CONFIG_FILE: &str = ".buildcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Manager for an explicitly given config file, which must exist
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Manager that looks for `.buildcache.toml` in the workspace
    pub fn discover(workspace: &Path) -> Self {
        let local = workspace.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            debug!("Found local config: {}", local.display());
            Self {
                config_path: Some(local),
            }
        } else {
            Self { config_path: None }
        }
    }

    /// Load configuration, falling back to defaults when no file is in use
    pub async fn load(&self) -> BuildCacheResult<Config> {
        match &self.config_path {
            Some(path) => self.load_from_file(path).await,
            None => {
                debug!("No config file, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> BuildCacheResult<Config> {
        if !path.exists() {
            return Err(BuildCacheError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            BuildCacheError::io(format!("reading config from {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| BuildCacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path in use, if any
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
