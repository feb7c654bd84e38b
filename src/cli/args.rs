//! CLI argument definitions using clap derive

use crate::cache::ArchiveFormat;
use crate::config::CacheConfig;
use crate::context::{BuildContext, BuildEvent, JobState, JobStatus};
use crate::error::{BuildCacheError, BuildCacheResult};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;

/// buildcache - CI build cache sidecar
///
/// Restores cached workspace directories when a job starts and rebuilds
/// them after a successful push build.
#[derive(Parser, Debug)]
#[command(name = "buildcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUILDCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log line format
    #[arg(long, global = true, env = "BUILDCACHE_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore or rebuild the cache for the current job
    Run(RunArgs),

    /// Print the cache key and entry file for a mount
    Key(KeyArgs),

    /// List entries under the cache root
    List(ListArgs),

    /// Remove stale entries for a mount
    Purge(PurgeArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Where the cache lives; shared by every command that touches it
///
/// Global so `config show --workspace <dir>` works after the action.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Workspace directory (mounts are relative to it)
    #[arg(long, global = true, env = "DRONE_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Cache root directory (overrides config)
    #[arg(long, global = true, env = "PLUGIN_ROOT")]
    pub root: Option<PathBuf>,

    /// Archive format: tar, gzip or bzip2 (overrides config)
    #[arg(long, global = true, env = "PLUGIN_ARCHIVE")]
    pub archive: Option<ArchiveFormat>,

    /// Older plugin spelling of --archive
    #[arg(long, global = true, env = "PLUGIN_COMPRESSION", hide = true)]
    pub compression: Option<ArchiveFormat>,
}

impl StoreArgs {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply(&self, cache: &mut CacheConfig) {
        if let Some(ref root) = self.root {
            cache.root = root.clone();
        }
        if let Some(archive) = self.archive.or(self.compression) {
            cache.archive = archive;
        }
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Directories to cache (overrides config)
    #[arg(long, env = "PLUGIN_MOUNT", value_delimiter = ',')]
    pub mount: Vec<String>,

    /// Branch being built
    #[arg(long, env = "DRONE_COMMIT_BRANCH", default_value = "")]
    pub branch: String,

    /// Repository default branch
    #[arg(long, env = "DRONE_REPO_BRANCH", default_value = "")]
    pub default_branch: String,

    /// Event that triggered the build (push, pull_request, tag, ...)
    #[arg(long, env = "DRONE_BUILD_EVENT", default_value = "")]
    pub event: BuildEvent,

    /// Job status (pending, running, success, failure, ...)
    #[arg(long, env = "DRONE_JOB_STATUS", default_value = "")]
    pub status: JobStatus,

    /// Build matrix axis (KEY=VALUE)
    #[arg(long, env = "BUILDCACHE_MATRIX", value_delimiter = ',', value_parser = parse_env_var)]
    pub matrix: Vec<(String, String)>,
}

impl RunArgs {
    /// Build context for this job
    pub fn build_context(&self) -> BuildCacheResult<BuildContext> {
        if self.branch.trim().is_empty() {
            return Err(BuildCacheError::InvalidArgument(
                "build branch is not set (--branch or DRONE_COMMIT_BRANCH)".to_string(),
            ));
        }

        Ok(BuildContext {
            workspace: self.store.workspace.clone(),
            branch: self.branch.clone(),
            default_branch: self.default_branch.clone(),
            event: self.event.clone(),
            matrix: collect_matrix(&self.matrix),
        })
    }

    /// Job state for this job
    pub fn job_state(&self) -> JobState {
        JobState::new(self.status)
    }
}

/// Selects the entries of one mount on one branch
#[derive(Args, Debug, Clone)]
pub struct KeyTarget {
    /// Mount path as configured
    #[arg(long)]
    pub mount: String,

    /// Branch
    #[arg(long, env = "DRONE_COMMIT_BRANCH")]
    pub branch: String,

    /// Build matrix axis (KEY=VALUE)
    #[arg(long, value_delimiter = ',', value_parser = parse_env_var)]
    pub matrix: Vec<(String, String)>,
}

impl KeyTarget {
    pub fn matrix(&self) -> HashMap<String, String> {
        collect_matrix(&self.matrix)
    }
}

/// Arguments for the key command
#[derive(Parser, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub target: KeyTarget,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the purge command
#[derive(Parser, Debug)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub target: KeyTarget,

    /// Number of entries to keep (0 removes everything for the key)
    #[arg(long, default_value = "1")]
    pub keep: usize,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show the configuration file path in use
    Path,
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

fn collect_matrix(pairs: &[(String, String)]) -> HashMap<String, String> {
    pairs.iter().cloned().collect()
}

/// Parse a matrix axis in KEY=VALUE format
fn parse_env_var(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE format: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
