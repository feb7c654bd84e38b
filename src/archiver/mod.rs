//! Archive tool abstraction
//!
//! The cache never touches archive contents itself; it asks an archive tool
//! to pack a directory into a file or to unpack a file under a root. The
//! production tool is `tar` run as a subprocess.

#[cfg(test)]
pub(crate) mod fake;
mod tar;

pub use self::tar::TarArchiver;

use crate::error::BuildCacheResult;
use async_trait::async_trait;
use std::path::Path;

/// Exit information of one archive tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code (-1 when terminated by a signal)
    pub code: i32,
    /// Captured stderr, for logging only
    pub stderr: String,
}

impl ToolOutput {
    pub fn success() -> Self {
        Self {
            code: 0,
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Abstract archive tool interface
///
/// A returned `Err` means the tool could not be run at all; a tool that ran
/// and failed reports a non-zero `ToolOutput::code`.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Pack `source` into the archive file `dest`
    async fn create(&self, source: &Path, dest: &Path) -> BuildCacheResult<ToolOutput>;

    /// Unpack `archive` below `dest_root`
    async fn extract(&self, archive: &Path, dest_root: &Path) -> BuildCacheResult<ToolOutput>;

    /// Human-readable tool name for display
    fn tool_name(&self) -> &str;
}
