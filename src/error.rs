//! Error types for buildcache
//!
//! All modules use `BuildCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildcache operations
pub type BuildCacheResult<T> = Result<T, BuildCacheError>;

/// All errors that can occur in buildcache
#[derive(Error, Debug)]
pub enum BuildCacheError {
    // Cache errors
    #[error("Cache does not exist: {0}")]
    CacheMissing(PathBuf),

    #[error("Cache archive {path} could not be extracted (exit code {code})")]
    CacheCorrupt { path: PathBuf, code: i32 },

    #[error("File or directory {0} does not exist")]
    SourceMissing(PathBuf),

    #[error("Archive tool failed creating {path} (exit code {code})")]
    ToolInvocationFailed { path: PathBuf, code: i32 },

    #[error("Failed to purge {} cache file(s): {}", .failures.len(), describe_failures(.failures))]
    PurgeFailed { failures: Vec<(PathBuf, String)> },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

fn describe_failures(failures: &[(PathBuf, String)]) -> String {
    failures
        .iter()
        .map(|(path, reason)| format!("{} ({})", path.display(), reason))
        .collect::<Vec<_>>()
        .join(", ")
}

impl BuildCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether this is the expected first-run miss rather than a real failure
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::CacheMissing(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheCorrupt { .. } => Some("The entry was removed; the next successful push build rebuilds it"),
            Self::SourceMissing(_) => Some("Check that the mount path exists after the build step"),
            Self::CommandFailed { .. } => Some("Make sure tar is installed and on PATH, or set cache.tool"),
            Self::PurgeFailed { .. } => Some("Check permissions on the cache root"),
            Self::ConfigNotFound(_) => Some("Pass --config with an existing file or drop the flag"),
            _ => None,
        }
    }
}
