//! Archive creation and post-rebuild retention

use super::{MountOutcome, Orchestrator};
use crate::cache::CacheKey;
use crate::context::BuildContext;
use crate::error::{BuildCacheError, BuildCacheResult};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolve a mount against the workspace into a clean absolute path
///
/// A relative workspace is taken from the current directory. `.` and `..`
/// are folded lexically without touching the filesystem, so symlinked
/// mounts keep the path the build sees.
pub fn normalize_mount(workspace: &Path, mount: &str) -> BuildCacheResult<PathBuf> {
    let joined = std::path::absolute(workspace.join(mount)).map_err(|e| {
        BuildCacheError::io(format!("resolving mount {} in {}", mount, workspace.display()), e)
    })?;
    let mut normalized = PathBuf::new();

    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

impl Orchestrator {
    /// Archive `source` into the entry for `key`
    ///
    /// The archive is staged next to the entry and only renamed over it
    /// after the tool exits cleanly, so a failed run leaves the previous
    /// entry in place.
    pub async fn rebuild(&self, key: &CacheKey, source: &Path) -> BuildCacheResult<PathBuf> {
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(BuildCacheError::SourceMissing(source.to_path_buf()));
        }

        self.store.ensure_root().await?;
        let entry = self.store.file_name(key, self.format);
        let staged = self.store.partial_file_name(key, self.format);

        debug!("Archiving {} into {}", source.display(), staged.display());
        let output = match self.archiver.create(source, &staged).await {
            Ok(output) => output,
            Err(e) => {
                discard(&staged).await;
                return Err(e);
            }
        };

        if !output.is_success() {
            if !output.stderr.is_empty() {
                debug!("{}: {}", self.archiver.tool_name(), output.stderr);
            }
            discard(&staged).await;
            return Err(BuildCacheError::ToolInvocationFailed {
                path: entry,
                code: output.code,
            });
        }

        tokio::fs::rename(&staged, &entry).await.map_err(|e| {
            BuildCacheError::io(format!("moving {} into place", staged.display()), e)
        })?;
        Ok(entry)
    }

    /// Rebuild the entry for a mount on the build branch, then keep only it
    pub async fn rebuild_mount(&self, ctx: &BuildContext, mount: &str) -> MountOutcome {
        let key = CacheKey::derive(mount, &ctx.branch, &ctx.matrix);
        info!("Building cache {}", mount);

        let rebuilt = match normalize_mount(&ctx.workspace, mount) {
            Ok(source) => self.rebuild(&key, &source).await,
            Err(e) => Err(e),
        };
        let path = match rebuilt {
            Ok(path) => path,
            Err(error) => {
                warn!("Unable to rebuild cache for {}: {}", mount, error);
                return MountOutcome::RebuildFailed { key, error };
            }
        };

        let (removed, purge_error) = match self.store.purge(&key, self.format, 1).await {
            Ok(report) => (report.removed.len(), None),
            Err(e) => {
                warn!("Unable to purge stale cache for {}: {}", mount, e);
                (0, Some(e))
            }
        };

        MountOutcome::Rebuilt {
            key,
            path,
            removed,
            purge_error,
        }
    }
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Unable to remove {}: {}", path.display(), e),
    }
}
