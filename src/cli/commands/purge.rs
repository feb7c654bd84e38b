//! Purge command - apply retention for one key by hand

use crate::cache::{CacheKey, CacheStore};
use crate::cli::args::PurgeArgs;
use crate::config::Config;
use crate::error::BuildCacheResult;
use crate::ui::{self, UiContext};

/// Execute the purge command
pub async fn execute(args: PurgeArgs, config: &Config) -> BuildCacheResult<()> {
    let ctx = UiContext::detect();
    let target = &args.target;

    let key = CacheKey::derive(&target.mount, &target.branch, &target.matrix());
    let store = CacheStore::new(&config.cache.root, config.cache.prefix.clone());
    let report = store.purge(&key, config.cache.archive, args.keep).await?;

    if report.removed.is_empty() {
        ui::step_info(&ctx, &format!("Nothing to remove for {} on {}", target.mount, target.branch));
        return Ok(());
    }

    for path in &report.removed {
        ui::step_ok_detail(&ctx, "Removed", &path.display().to_string());
    }
    ui::remark(&ctx, &format!("{} file(s) kept", report.kept.len()));
    Ok(())
}
