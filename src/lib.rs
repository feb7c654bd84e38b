//! buildcache - CI build cache sidecar
//!
//! Persists selected workspace directories between builds. When a job
//! starts, cached mounts are extracted back into the workspace (falling back
//! to the repository's default branch); after a successful push build they
//! are archived again and stale entries are purged.

pub mod archiver;
pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestration;
pub mod ui;

pub use error::{BuildCacheError, BuildCacheResult};
