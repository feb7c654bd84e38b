//! Key command - show which entry a mount maps to

use crate::cache::{CacheKey, CacheStore};
use crate::cli::args::KeyArgs;
use crate::config::Config;
use crate::error::BuildCacheResult;
use crate::ui::{self, UiContext};

/// Execute the key command
pub async fn execute(args: KeyArgs, config: &Config) -> BuildCacheResult<()> {
    let ctx = UiContext::detect();
    let target = &args.target;

    let key = CacheKey::derive(&target.mount, &target.branch, &target.matrix());
    let store = CacheStore::new(&config.cache.root, config.cache.prefix.clone());
    let path = store.file_name(&key, config.cache.archive);
    let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);

    ui::key_value(&ctx, "key", key.as_str());
    ui::key_value(&ctx, "file", &path.display().to_string());
    ui::key_value(&ctx, "exists", if exists { "yes" } else { "no" });
    Ok(())
}
