//! In-memory stand-in for the archive tool used by unit tests
//!
//! Archives are JSON maps from absolute file path to file bytes, so a
//! create/extract pair reproduces a tree below any root without `tar`.

use crate::archiver::{Archiver, ToolOutput};
use crate::error::{BuildCacheError, BuildCacheResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Recorded archiver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { source: PathBuf, dest: PathBuf },
    Extract { archive: PathBuf, dest_root: PathBuf },
}

#[derive(Debug, Default)]
pub struct FakeArchiver {
    calls: Mutex<Vec<Call>>,
    fail_create: bool,
}

impl FakeArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archiver whose `create` writes a partial file and exits with 2
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn collect(dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, files)?;
        } else {
            files.insert(path.to_string_lossy().into_owned(), std::fs::read(&path)?);
        }
    }
    Ok(())
}

#[async_trait]
impl Archiver for FakeArchiver {
    async fn create(&self, source: &Path, dest: &Path) -> BuildCacheResult<ToolOutput> {
        self.record(Call::Create {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
        });

        if self.fail_create {
            std::fs::write(dest, b"half written").map_err(|e| BuildCacheError::io("fake create", e))?;
            return Ok(ToolOutput::failure(2, "fake: create failed"));
        }

        let mut files = BTreeMap::new();
        if let Err(e) = collect(source, &mut files) {
            return Ok(ToolOutput::failure(2, e.to_string()));
        }
        std::fs::write(dest, serde_json::to_vec(&files)?)
            .map_err(|e| BuildCacheError::io("fake create", e))?;
        Ok(ToolOutput::success())
    }

    async fn extract(&self, archive: &Path, dest_root: &Path) -> BuildCacheResult<ToolOutput> {
        self.record(Call::Extract {
            archive: archive.to_path_buf(),
            dest_root: dest_root.to_path_buf(),
        });

        let bytes = std::fs::read(archive).map_err(|e| BuildCacheError::io("fake extract", e))?;
        let files: BTreeMap<String, Vec<u8>> = match serde_json::from_slice(&bytes) {
            Ok(files) => files,
            Err(e) => return Ok(ToolOutput::failure(2, e.to_string())),
        };

        for (path, contents) in files {
            let relative = path.trim_start_matches('/');
            let target = dest_root.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| BuildCacheError::io("fake extract", e))?;
            }
            std::fs::write(&target, contents).map_err(|e| BuildCacheError::io("fake extract", e))?;
        }
        Ok(ToolOutput::success())
    }

    fn tool_name(&self) -> &str {
        "fake"
    }
}
