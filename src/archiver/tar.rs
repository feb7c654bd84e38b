//! `tar` subprocess archiver

use crate::archiver::{Archiver, ToolOutput};
use crate::cache::ArchiveFormat;
use crate::error::{BuildCacheError, BuildCacheResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Archiver that shells out to a tar-compatible program
#[derive(Debug, Clone)]
pub struct TarArchiver {
    program: String,
    format: ArchiveFormat,
}

impl TarArchiver {
    /// Create an archiver running `program` with the flags of `format`
    pub fn new(program: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            program: program.into(),
            format,
        }
    }

    /// Arguments for packing `source` into `dest`
    pub fn create_args(&self, source: &Path, dest: &Path) -> Vec<OsString> {
        vec![
            self.format.create_flags().into(),
            dest.as_os_str().to_owned(),
            source.as_os_str().to_owned(),
        ]
    }

    /// Arguments for unpacking `archive` below `dest_root`
    pub fn extract_args(&self, archive: &Path, dest_root: &Path) -> Vec<OsString> {
        vec![
            self.format.extract_flags().into(),
            archive.as_os_str().to_owned(),
            "-C".into(),
            dest_root.as_os_str().to_owned(),
        ]
    }

    /// Run the tool and collect its exit status
    async fn exec(&self, args: &[OsString]) -> BuildCacheResult<ToolOutput> {
        debug!("Executing: {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BuildCacheError::command_failed(format!("{} {:?}", self.program, args), e))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Ok(ToolOutput {
            code: output.status.code().unwrap_or(-1),
            stderr,
        })
    }
}

#[async_trait]
impl Archiver for TarArchiver {
    async fn create(&self, source: &Path, dest: &Path) -> BuildCacheResult<ToolOutput> {
        self.exec(&self.create_args(source, dest)).await
    }

    async fn extract(&self, archive: &Path, dest_root: &Path) -> BuildCacheResult<ToolOutput> {
        self.exec(&self.extract_args(archive, dest_root)).await
    }

    fn tool_name(&self) -> &str {
        &self.program
    }
}
