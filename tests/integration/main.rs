//! Integration tests for buildcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    const CI_VARS: &[&str] = &[
        "BUILDCACHE_CONFIG",
        "BUILDCACHE_MATRIX",
        "DRONE_WORKSPACE",
        "DRONE_COMMIT_BRANCH",
        "DRONE_REPO_BRANCH",
        "DRONE_BUILD_EVENT",
        "DRONE_JOB_STATUS",
        "PLUGIN_MOUNT",
        "PLUGIN_ARCHIVE",
        "PLUGIN_COMPRESSION",
        "PLUGIN_ROOT",
    ];

    fn buildcache() -> Command {
        let mut cmd = cargo_bin_cmd!("buildcache");
        for var in CI_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    fn tar_available() -> bool {
        std::process::Command::new("tar")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run_step(workspace: &Path, root: &Path, status: &str, event: &str, branch: &str) -> Command {
        let mut cmd = buildcache();
        cmd.arg("run")
            .arg("--workspace")
            .arg(workspace)
            .arg("--root")
            .arg(root)
            .args(["--archive", "gzip", "--mount", "deps"])
            .args(["--branch", branch, "--default-branch", "main"])
            .args(["--status", status, "--event", event]);
        cmd
    }

    #[test]
    fn help_displays() {
        buildcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Build cache sidecar for CI pipelines"));
    }

    #[test]
    fn version_displays() {
        buildcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildcache"));
    }

    #[test]
    fn pull_request_success_does_nothing() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join("ws");
        std::fs::create_dir_all(workspace.join("deps")).unwrap();
        let root = dir.path().join("cache");

        run_step(&workspace, &root, "success", "pull_request", "feature")
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to do"));

        assert!(!root.exists());
    }

    #[test]
    fn broken_config_never_fails_the_step() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("bad.toml");
        std::fs::write(&config, "[cache\n").unwrap();

        buildcache()
            .arg("--config")
            .arg(&config)
            .args(["run", "--branch", "main", "--status", "running", "--event", "push"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache step skipped"));
    }

    #[test]
    fn missing_branch_never_fails_the_step() {
        let dir = TempDir::new().unwrap();
        buildcache()
            .arg("run")
            .arg("--workspace")
            .arg(dir.path())
            .args(["--status", "running", "--mount", "deps"])
            .assert()
            .success()
            .stdout(predicate::str::contains("build branch is not set"));
    }

    #[test]
    fn restore_without_cache_succeeds() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join("ws");
        let root = dir.path().join("cache");

        run_step(&workspace, &root, "running", "push", "feature")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache available for deps"));
    }

    #[test]
    fn rebuild_then_restore_with_tar() {
        if !tar_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join("ws");
        let deps = workspace.join("deps");
        std::fs::create_dir_all(deps.join("pkg")).unwrap();
        std::fs::write(deps.join("pkg/index.js"), b"exports.ok = true;\n").unwrap();
        let root = dir.path().join("cache");

        run_step(&workspace, &root, "success", "push", "main")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached deps"));

        let entries: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("cache.") && entries[0].ends_with(".tar.gz"));

        std::fs::remove_dir_all(&deps).unwrap();

        // Feature branch has no entry of its own and falls back to main
        run_step(&workspace, &root, "running", "push", "feature")
            .assert()
            .success()
            .stdout(predicate::str::contains("Restored deps"));

        assert_eq!(
            std::fs::read(deps.join("pkg/index.js")).unwrap(),
            b"exports.ok = true;\n"
        );
    }

    #[test]
    fn rebuild_then_restore_with_relative_workspace() {
        if !tar_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let deps = dir.path().join("ws/deps");
        std::fs::create_dir_all(&deps).unwrap();
        std::fs::write(deps.join("f.txt"), b"cached\n").unwrap();
        let root = dir.path().join("cache");

        for status in ["success", "running"] {
            let mut cmd = run_step(Path::new("ws"), &root, status, "push", "main");
            cmd.current_dir(dir.path());
            cmd.assert().success();
            if status == "success" {
                std::fs::remove_dir_all(&deps).unwrap();
            }
        }

        // Lands back in <cwd>/ws/deps, not under a path relative to the extract root
        assert_eq!(std::fs::read(deps.join("f.txt")).unwrap(), b"cached\n");
    }

    #[test]
    fn legacy_compression_variable_selects_format() {
        let dir = TempDir::new().unwrap();
        buildcache()
            .env("PLUGIN_COMPRESSION", "gzip")
            .args(["key", "--mount", "deps", "--branch", "main", "--root"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(".tar.gz"));
    }

    #[test]
    fn config_path_accepts_workspace_after_action() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".buildcache.toml"), "[cache]\nmount = [\"deps\"]\n").unwrap();
        buildcache()
            .args(["config", "path", "--workspace"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(".buildcache.toml"));
    }

    #[test]
    fn key_prints_entry_file() {
        let dir = TempDir::new().unwrap();
        buildcache()
            .args(["key", "--mount", "/deps", "--branch", "main", "--archive", "gzip"])
            .arg("--root")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"file: .*cache\.[0-9a-f]{32}\.tar\.gz").unwrap())
            .stdout(predicate::str::contains("exists: no"));
    }

    #[test]
    fn list_empty_root_as_json() {
        let dir = TempDir::new().unwrap();
        buildcache()
            .args(["list", "--format", "json", "--root"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn purge_removes_entries_for_key() {
        let dir = TempDir::new().unwrap();
        let key_output = buildcache()
            .args(["key", "--mount", "deps", "--branch", "main", "--root"])
            .arg(dir.path())
            .output()
            .unwrap();
        let stdout = String::from_utf8(key_output.stdout).unwrap();
        let file = stdout
            .lines()
            .find_map(|l| l.trim().strip_prefix("file: "))
            .unwrap()
            .to_string();
        std::fs::write(&file, b"stale").unwrap();

        buildcache()
            .args(["purge", "--mount", "deps", "--branch", "main", "--keep", "0", "--root"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed"));

        assert!(!Path::new(&file).exists());
    }

    #[test]
    fn config_show_prints_defaults() {
        let dir = TempDir::new().unwrap();
        buildcache()
            .args(["config", "show", "--workspace"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("tool = \"tar\""));
    }

    #[test]
    fn missing_explicit_config_fails_operator_commands() {
        buildcache()
            .args(["--config", "/nonexistent/buildcache.toml", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }
}
