//! Archive format codec
//!
//! Maps the configured compression mode to the entry file suffix and the
//! archive tool flags, so orchestration never deals with tool arguments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// On-disk archive format of cache entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Uncompressed tar (also the fallback for unknown modes)
    #[default]
    Tar,
    /// gzip-compressed tar
    Gzip,
    /// bzip2-compressed tar
    Bzip2,
}

impl ArchiveFormat {
    /// Parse a configured mode; unknown or empty values fall back to plain tar
    pub fn from_mode(mode: &str) -> Self {
        match mode.trim().to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Self::Gzip,
            "bzip" | "bzip2" | "bz2" => Self::Bzip2,
            _ => Self::Tar,
        }
    }

    /// Canonical mode name, as written back to config
    pub fn as_mode(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }

    /// Suffix appended to entry file names
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
        }
    }

    /// Flags for `tar` when creating an archive; followed by the output file
    pub fn create_flags(&self) -> &'static str {
        match self {
            Self::Tar => "-cf",
            Self::Gzip => "-czf",
            Self::Bzip2 => "-cjf",
        }
    }

    /// Flags for `tar` when extracting an archive; followed by the input file
    pub fn extract_flags(&self) -> &'static str {
        match self {
            Self::Tar => "-xf",
            Self::Gzip => "-xzf",
            Self::Bzip2 => "-xjf",
        }
    }

    /// All formats, for matching entry file names
    pub fn all() -> &'static [Self] {
        &[Self::Tar, Self::Gzip, Self::Bzip2]
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mode())
    }
}

impl FromStr for ArchiveFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_mode(s))
    }
}

impl Serialize for ArchiveFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_mode())
    }
}

impl<'de> Deserialize<'de> for ArchiveFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mode = String::deserialize(deserializer)?;
        Ok(Self::from_mode(&mode))
    }
}
