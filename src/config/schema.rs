//! Configuration schema for buildcache
//!
//! Configuration is read from `--config` or `<workspace>/.buildcache.toml`.

use crate::cache::ArchiveFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache settings
    pub cache: CacheConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Archive format: "tar" (default), "gzip" or "bzip2"
    pub archive: ArchiveFormat,

    /// Directories to cache, relative to the workspace or absolute
    pub mount: Vec<String>,

    /// Directory holding cache entries
    pub root: PathBuf,

    /// File name prefix of cache entries
    pub prefix: String,

    /// Archive program
    pub tool: String,

    /// Directory archives are extracted under
    pub extract_root: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            archive: ArchiveFormat::Tar,
            mount: vec![],
            root: PathBuf::from("/cache"),
            prefix: "cache".to_string(),
            tool: "tar".to_string(),
            extract_root: PathBuf::from("/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("archive = \"tar\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.root, PathBuf::from("/cache"));
        assert_eq!(config.cache.archive, ArchiveFormat::Tar);
        assert!(config.cache.mount.is_empty());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            archive = "gzip"
            mount = ["node_modules", "/root/.cache/pip"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.archive, ArchiveFormat::Gzip);
        assert_eq!(config.cache.mount, vec!["node_modules", "/root/.cache/pip"]);
        assert_eq!(config.cache.tool, "tar"); // default preserved
    }
}
