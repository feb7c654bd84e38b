//! Run command - the CI step itself
//!
//! Never fails the pipeline: configuration problems are reported and the
//! step is skipped, per-mount failures are reported and the next mount is
//! processed.

use crate::cli::args::RunArgs;
use crate::cli::commands::load_config;
use crate::error::BuildCacheResult;
use crate::orchestration::{plan, MountOutcome, MountReport, Orchestrator, Phase};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::Path;
use tracing::debug;

/// Execute the run command
pub async fn execute(args: RunArgs, config_path: Option<&Path>) -> BuildCacheResult<()> {
    let ctx = UiContext::detect();

    if let Err(e) = run_step(&ctx, &args, config_path).await {
        ui::step_error_detail(&ctx, "Cache step skipped", &e.to_string());
        if let Some(hint) = e.hint() {
            ui::remark(&ctx, hint);
        }
    }
    Ok(())
}

async fn run_step(ctx: &UiContext, args: &RunArgs, config_path: Option<&Path>) -> BuildCacheResult<()> {
    let config = load_config(config_path, &args.store).await?;
    let mut cache = config.cache;
    if !args.mount.is_empty() {
        cache.mount = args.mount.clone();
    }

    let build = args.build_context()?;
    let job = args.job_state();
    let phase = plan(&job, &build.event);
    debug!("Cache root {}, archive {}", cache.root.display(), cache.archive);

    if phase == Phase::Skip {
        ui::step_info(
            ctx,
            &format!("Nothing to do for a {} job on a {} event", job.status, build.event),
        );
        return Ok(());
    }

    if cache.mount.is_empty() {
        ui::step_warn_hint(ctx, "No mounts configured", "Set cache.mount or --mount");
        return Ok(());
    }

    let orchestrator = Orchestrator::from_config(&cache);
    let (verb, done) = match phase {
        Phase::Restore => ("Restoring", "Restore finished"),
        _ => ("Building", "Rebuild finished"),
    };

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start(&format!("{} cache for {} mount(s)", verb, cache.mount.len()));
    let reports = orchestrator.run(&build, &job, &cache.mount).await;

    let ok = reports.iter().filter(|r| r.outcome.is_ok()).count();
    let summary = format!("{}: {}/{} mount(s)", done, ok, reports.len());
    if ok == reports.len() {
        spinner.stop(&summary);
    } else {
        spinner.stop_warn(&summary);
    }

    for report in &reports {
        print_report(ctx, report);
    }
    Ok(())
}

fn print_report(ctx: &UiContext, report: &MountReport) {
    let mount = &report.mount;
    match &report.outcome {
        MountOutcome::Restored { branch, .. } => {
            ui::step_ok_detail(ctx, &format!("Restored {}", mount), &format!("from {}", branch));
        }
        MountOutcome::NotRestored { attempts } => {
            if attempts.iter().all(|a| a.error.is_miss()) {
                ui::step_info(ctx, &format!("No cache available for {}", mount));
            } else {
                for attempt in attempts.iter().filter(|a| !a.error.is_miss()) {
                    ui::step_warn_hint(
                        ctx,
                        &format!("Unable to restore {} from {}", mount, attempt.branch),
                        &attempt.error.to_string(),
                    );
                }
            }
        }
        MountOutcome::Rebuilt {
            path,
            removed,
            purge_error,
            ..
        } => {
            ui::step_ok_detail(ctx, &format!("Cached {}", mount), &path.display().to_string());
            if *removed > 0 {
                ui::remark(ctx, &format!("Removed {} stale file(s)", removed));
            }
            if let Some(e) = purge_error {
                ui::step_warn(ctx, &e.to_string());
            }
        }
        MountOutcome::RebuildFailed { error, .. } => {
            ui::step_error_detail(ctx, &format!("Unable to rebuild cache for {}", mount), &error.to_string());
            if let Some(hint) = error.hint() {
                ui::remark(ctx, hint);
            }
        }
    }
}
