//! Cache entry storage under the cache root
//!
//! Entries are plain files named `<prefix>.<key>.<suffix>`. A rotated or
//! staged copy of an entry carries a `~<tag>` after the suffix, which keeps
//! it visible to retention without confusing it with another format.

use crate::cache::archive::ArchiveFormat;
use crate::cache::key::CacheKey;
use crate::error::{BuildCacheError, BuildCacheResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Separator between an entry name and its rotation tag
pub const ROTATION_SEPARATOR: char = '~';

/// Tag of the file an archive is written to before it replaces the entry
pub const PARTIAL_TAG: &str = "partial";

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// A cache entry file found under the cache root
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// Full path of the file
    pub path: PathBuf,
    /// Key encoded in the file name
    pub key: String,
    /// Archive format encoded in the suffix
    pub format: ArchiveFormat,
    /// Rotation tag, if this is not the current entry
    pub rotation: Option<String>,
    /// File size in bytes
    pub size_bytes: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Outcome of a retention pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Files that survived
    pub kept: Vec<PathBuf>,
    /// Files that were deleted
    pub removed: Vec<PathBuf>,
}

/// Directory of cache entries addressed by key
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    prefix: String,
}

impl CacheStore {
    /// Create a store rooted at `root` whose entries start with `prefix`
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry file path for a key in a format
    pub fn file_name(&self, key: &CacheKey, format: ArchiveFormat) -> PathBuf {
        self.root.join(self.entry_name(key, format))
    }

    /// Staging path an archive is written to before it becomes the entry
    pub fn partial_file_name(&self, key: &CacheKey, format: ArchiveFormat) -> PathBuf {
        self.root.join(format!(
            "{}{}{}",
            self.entry_name(key, format),
            ROTATION_SEPARATOR,
            PARTIAL_TAG
        ))
    }

    fn entry_name(&self, key: &CacheKey, format: ArchiveFormat) -> String {
        format!("{}.{}.{}", self.prefix, key, format.suffix())
    }

    /// Create the cache root if it does not exist
    pub async fn ensure_root(&self) -> BuildCacheResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            BuildCacheError::io(format!("creating cache root {}", self.root.display()), e)
        })
    }

    /// All files for a key, current entry and rotations, sorted by name
    ///
    /// Name order stands in for recency: the current entry always sorts
    /// before its `~tag` rotations. A missing cache root lists as empty.
    pub async fn list(&self, key: &CacheKey, format: ArchiveFormat) -> BuildCacheResult<Vec<PathBuf>> {
        let base = self.entry_name(key, format);
        let rotated = format!("{}{}", base, ROTATION_SEPARATOR);

        let mut files: Vec<PathBuf> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| *name == base || name.starts_with(&rotated))
            .map(|name| self.root.join(name))
            .collect();

        // TODO: order by modification time once older plugin releases that
        // rely on name order are gone
        files.sort();
        Ok(files)
    }

    /// Delete all but the first `keep` files for a key
    ///
    /// Every deletion is attempted; failures are collected and reported
    /// together as `PurgeFailed` after the pass.
    pub async fn purge(
        &self,
        key: &CacheKey,
        format: ArchiveFormat,
        keep: usize,
    ) -> BuildCacheResult<PurgeReport> {
        let files = self.list(key, format).await?;
        retain_first(files, keep, |file| async move { fs::remove_file(file).await }).await
    }

    /// Every recognizable entry under the cache root, sorted by name
    pub async fn entries(&self) -> BuildCacheResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();

        for name in self.file_names().await? {
            let Some((key, format, rotation)) = self.parse_entry_name(&name) else {
                continue;
            };
            let path = self.root.join(&name);
            let metadata = fs::metadata(&path)
                .await
                .map_err(|e| BuildCacheError::io(format!("reading metadata of {}", path.display()), e))?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            entries.push(CacheEntry {
                path,
                key,
                format,
                rotation,
                size_bytes: metadata.len(),
                modified,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Split `<prefix>.<key>.<suffix>[~tag]` into its parts
    fn parse_entry_name(&self, name: &str) -> Option<(String, ArchiveFormat, Option<String>)> {
        let rest = name.strip_prefix(&self.prefix)?.strip_prefix('.')?;
        let (key, rest) = rest.split_at_checked(CacheKey::HEX_LEN)?;
        let key = CacheKey::parse(key)?;
        let rest = rest.strip_prefix('.')?;

        let (suffix, rotation) = match rest.split_once(ROTATION_SEPARATOR) {
            Some((suffix, tag)) => (suffix, Some(tag.to_string())),
            None => (rest, None),
        };
        let format = ArchiveFormat::all()
            .iter()
            .copied()
            .find(|f| f.suffix() == suffix)?;

        Some((key.as_str().to_string(), format, rotation))
    }

    /// Names of regular files directly under the root
    async fn file_names(&self) -> BuildCacheResult<Vec<String>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BuildCacheError::io(
                    format!("reading cache root {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| BuildCacheError::io(format!("reading cache root {}", self.root.display()), e))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Keep the first `keep` files and hand the rest to `remove`
///
/// A file that is already gone counts as neither kept nor removed.
async fn retain_first<F, Fut>(files: Vec<PathBuf>, keep: usize, mut remove: F) -> BuildCacheResult<PurgeReport>
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    let mut report = PurgeReport::default();
    let mut failures = Vec::new();

    for (idx, file) in files.into_iter().enumerate() {
        if idx < keep {
            report.kept.push(file);
            continue;
        }

        debug!("Removing cache file {}", file.display());
        match remove(file.clone()).await {
            Ok(()) => report.removed.push(file),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!("Unable to remove {}: {}", file.display(), e);
                failures.push((file, e.to_string()));
            }
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        Err(BuildCacheError::PurgeFailed { failures })
    }
}
