//! Restore with default-branch fallback

use super::{MountOutcome, Orchestrator};
use crate::cache::CacheKey;
use crate::context::BuildContext;
use crate::error::{BuildCacheError, BuildCacheResult};
use tracing::{debug, info, warn};

/// One failed restore attempt for a mount
#[derive(Debug)]
pub struct RestoreAttempt {
    pub branch: String,
    pub key: CacheKey,
    pub error: BuildCacheError,
}

impl Orchestrator {
    /// Extract the entry for `key` below the extraction root
    ///
    /// A missing entry is `CacheMissing`; an entry the tool cannot extract
    /// is `CacheCorrupt`.
    pub async fn restore(&self, key: &CacheKey, mount: &str) -> BuildCacheResult<()> {
        let archive = self.store.file_name(key, self.format);
        let exists = tokio::fs::try_exists(&archive).await.unwrap_or(false);
        if !exists {
            return Err(BuildCacheError::CacheMissing(archive));
        }

        debug!("Extracting {} for {}", archive.display(), mount);
        let output = self.archiver.extract(&archive, &self.extract_root).await?;
        if output.is_success() {
            Ok(())
        } else {
            if !output.stderr.is_empty() {
                debug!("{}: {}", self.archiver.tool_name(), output.stderr);
            }
            Err(BuildCacheError::CacheCorrupt {
                path: archive,
                code: output.code,
            })
        }
    }

    /// Restore a mount from its build branch, then from the default branch
    ///
    /// A failed attempt purges every file for that key, unless the archive
    /// tool could not be started at all (the entry was never tried).
    pub async fn restore_mount(&self, ctx: &BuildContext, mount: &str) -> MountOutcome {
        let mut attempts = Vec::new();

        for (idx, branch) in ctx.restore_branches().into_iter().enumerate() {
            let key = CacheKey::derive(mount, branch, &ctx.matrix);
            if idx == 0 {
                info!("Restoring cache {}", mount);
            } else {
                info!("Restoring cache {} from {} branch", mount, branch);
            }

            match self.restore(&key, mount).await {
                Ok(()) => {
                    return MountOutcome::Restored {
                        branch: branch.to_string(),
                        key,
                    }
                }
                Err(error) => {
                    if error.is_miss() {
                        info!("No cache for {} on {}", mount, branch);
                    } else {
                        warn!("Unable to restore {} from {}: {}", mount, branch, error);
                    }

                    if !matches!(error, BuildCacheError::CommandFailed { .. }) {
                        if let Err(e) = self.store.purge(&key, self.format, 0).await {
                            warn!("Unable to remove cache for {}: {}", mount, e);
                        }
                    }

                    attempts.push(RestoreAttempt {
                        branch: branch.to_string(),
                        key,
                        error,
                    });
                }
            }
        }

        MountOutcome::NotRestored { attempts }
    }
}
