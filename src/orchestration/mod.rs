//! Restore and rebuild orchestration
//!
//! Decides what this step does for the current job and drives each mount
//! through it, one mount at a time in configuration order:
//!
//! | Job status | Event | Phase |
//! |------------|-------|-------|
//! | pending / running | any | restore |
//! | succeeded | push | rebuild |
//! | anything else | | skip |
//!
//! Every failure stays local to its mount. Nothing here returns an error to
//! the caller; outcomes are reported per mount.

mod rebuild;
mod restore;

pub use rebuild::normalize_mount;
pub use restore::RestoreAttempt;

use crate::archiver::{Archiver, TarArchiver};
use crate::cache::{ArchiveFormat, CacheKey, CacheStore};
use crate::config::schema::CacheConfig;
use crate::context::{BuildContext, BuildEvent, JobState};
use crate::error::BuildCacheError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What this invocation does with the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Job is starting: extract cached mounts into the workspace
    Restore,
    /// Push build succeeded: archive mounts and drop stale entries
    Rebuild,
    /// Nothing to do for this job state
    Skip,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restore => write!(f, "restore"),
            Self::Rebuild => write!(f, "rebuild"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Pick the phase for a job and triggering event
///
/// Pull-request builds never write back to the shared cache.
pub fn plan(job: &JobState, event: &BuildEvent) -> Phase {
    if job.status.is_running() {
        Phase::Restore
    } else if job.status.is_success() && event.is_push() {
        Phase::Rebuild
    } else {
        Phase::Skip
    }
}

/// Result of processing one mount
#[derive(Debug)]
pub enum MountOutcome {
    /// Entry for `branch` was extracted
    Restored { branch: String, key: CacheKey },
    /// No usable entry on any candidate branch
    NotRestored { attempts: Vec<RestoreAttempt> },
    /// Fresh entry written; `purge_error` is set when retention failed
    Rebuilt {
        key: CacheKey,
        path: PathBuf,
        removed: usize,
        purge_error: Option<BuildCacheError>,
    },
    /// Entry could not be written; previous entries are untouched
    RebuildFailed { key: CacheKey, error: BuildCacheError },
}

impl MountOutcome {
    /// Whether the mount reached the phase's goal
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Restored { .. } | Self::Rebuilt { .. })
    }
}

/// Outcome for a mount, tagged with the mount as configured
#[derive(Debug)]
pub struct MountReport {
    pub mount: String,
    pub outcome: MountOutcome,
}

/// Drives restore and rebuild for mounts against one cache store
pub struct Orchestrator {
    store: CacheStore,
    archiver: Arc<dyn Archiver>,
    format: ArchiveFormat,
    extract_root: PathBuf,
}

impl Orchestrator {
    pub fn new(
        store: CacheStore,
        archiver: Arc<dyn Archiver>,
        format: ArchiveFormat,
        extract_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            archiver,
            format,
            extract_root: extract_root.into(),
        }
    }

    /// Build an orchestrator backed by the configured tar program
    pub fn from_config(config: &CacheConfig) -> Self {
        let archiver = TarArchiver::new(config.tool.clone(), config.archive);
        Self::new(
            CacheStore::new(&config.root, config.prefix.clone()),
            Arc::new(archiver),
            config.archive,
            &config.extract_root,
        )
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Run the planned phase over all mounts in order
    pub async fn run(&self, ctx: &BuildContext, job: &JobState, mounts: &[String]) -> Vec<MountReport> {
        let phase = plan(job, &ctx.event);
        info!(
            "Job {} on {} event: {} phase for {} mount(s)",
            job.status,
            ctx.event,
            phase,
            mounts.len()
        );

        if phase == Phase::Skip {
            return Vec::new();
        }

        if let Err(e) = tokio::fs::create_dir_all(&ctx.workspace).await {
            warn!("Unable to create workspace {}: {}", ctx.workspace.display(), e);
        }

        let mut reports = Vec::with_capacity(mounts.len());
        for mount in mounts {
            let outcome = match phase {
                Phase::Restore => self.restore_mount(ctx, mount).await,
                Phase::Rebuild => self.rebuild_mount(ctx, mount).await,
                Phase::Skip => unreachable!("skip returns before processing mounts"),
            };
            reports.push(MountReport {
                mount: mount.clone(),
                outcome,
            });
        }
        reports
    }
}
