//! Terminal vs CI log detection

use std::io::IsTerminal;

/// Variables set by CI runners; any of them means plain log output
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "DRONE",
    "WOODPECKER_CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
];

/// How step output is rendered
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
}

impl UiContext {
    /// Fancy output only on a terminal outside CI
    pub fn detect() -> Self {
        let on_terminal = std::io::stdout().is_terminal();
        let in_ci = CI_ENV_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self {
            fancy: on_terminal && !in_ci,
        }
    }

    /// Plain `[OK]` / `[WARN]` lines regardless of environment
    pub fn non_interactive() -> Self {
        Self { fancy: false }
    }

    /// Whether to use cliclack log lines and spinners
    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}
