//! Build and job context handed over by the CI

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Status of the job this step runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Other,
}

impl JobStatus {
    /// Parse the CI's status spelling; unknown values map to `Other`
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" | "succeeded" => Self::Succeeded,
            "failure" | "failed" | "error" | "killed" => Self::Failed,
            _ => Self::Other,
        }
    }

    /// Whether the job is starting or in progress
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Whether the job finished successfully
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Event that triggered the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Push,
    PullRequest,
    Tag,
    Deployment,
    Other(String),
}

impl BuildEvent {
    /// Parse the CI's event spelling
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Self::Push,
            "pull_request" | "pull-request" | "pr" => Self::PullRequest,
            "tag" => Self::Tag,
            "deployment" | "deploy" => Self::Deployment,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the build came from a direct push to the repository
    pub fn is_push(&self) -> bool {
        matches!(self, Self::Push)
    }
}

impl FromStr for BuildEvent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::PullRequest => write!(f, "pull_request"),
            Self::Tag => write!(f, "tag"),
            Self::Deployment => write!(f, "deployment"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Repository and build metadata for the current run
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Workspace directory; relative mounts resolve against it
    pub workspace: PathBuf,
    /// Branch being built
    pub branch: String,
    /// Repository default branch
    pub default_branch: String,
    /// Triggering event
    pub event: BuildEvent,
    /// Build matrix / environment axes
    pub matrix: HashMap<String, String>,
}

impl BuildContext {
    /// Branches to try when restoring, build branch first
    ///
    /// Holds at most two entries: the default branch is only added when it
    /// differs from the build branch and is not empty.
    pub fn restore_branches(&self) -> Vec<&str> {
        let mut branches = vec![self.branch.as_str()];
        if !self.default_branch.is_empty() && self.default_branch != self.branch {
            branches.push(self.default_branch.as_str());
        }
        branches
    }
}

/// State of the job this step runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobState {
    pub status: JobStatus,
}

impl JobState {
    pub fn new(status: JobStatus) -> Self {
        Self { status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(branch: &str, default_branch: &str) -> BuildContext {
        BuildContext {
            workspace: PathBuf::from("/drone/src"),
            branch: branch.to_string(),
            default_branch: default_branch.to_string(),
            event: BuildEvent::Push,
            matrix: HashMap::new(),
        }
    }

    #[test]
    fn job_status_labels() {
        assert_eq!(JobStatus::from_label("success"), JobStatus::Succeeded);
        assert_eq!(JobStatus::from_label("failure"), JobStatus::Failed);
        assert_eq!(JobStatus::from_label("Pending"), JobStatus::Pending);
        assert_eq!(JobStatus::from_label("skipped"), JobStatus::Other);
        assert!(JobStatus::Running.is_running());
        assert!(!JobStatus::Succeeded.is_running());
        assert!(JobStatus::Succeeded.is_success());
    }

    #[test]
    fn build_event_labels() {
        assert!(BuildEvent::from_label("push").is_push());
        assert_eq!(BuildEvent::from_label("pull_request"), BuildEvent::PullRequest);
        assert_eq!(BuildEvent::from_label("cron"), BuildEvent::Other("cron".to_string()));
        assert_eq!(BuildEvent::PullRequest.to_string(), "pull_request");
    }

    #[test]
    fn restore_branches_fall_back_to_default() {
        assert_eq!(ctx("feature", "main").restore_branches(), vec!["feature", "main"]);
        assert_eq!(ctx("main", "main").restore_branches(), vec!["main"]);
        assert_eq!(ctx("feature", "").restore_branches(), vec!["feature"]);
    }
}
