//! CLI command implementations

pub mod config;
pub mod key;
pub mod list;
pub mod purge;
pub mod run;

pub use config::execute as config;
pub use key::execute as key;
pub use list::execute as list;
pub use purge::execute as purge;
pub use run::execute as run;

use crate::cli::args::StoreArgs;
use crate::config::{Config, ConfigManager};
use crate::error::BuildCacheResult;
use std::path::Path;

/// Config manager for an explicit path, or workspace discovery
pub fn config_manager(explicit: Option<&Path>, store: &StoreArgs) -> ConfigManager {
    match explicit {
        Some(path) => ConfigManager::with_path(path.to_path_buf()),
        None => ConfigManager::discover(&store.workspace),
    }
}

/// Load configuration and apply command-line overrides
pub async fn load_config(explicit: Option<&Path>, store: &StoreArgs) -> BuildCacheResult<Config> {
    let mut config = config_manager(explicit, store).load().await?;
    store.apply(&mut config.cache);
    Ok(config)
}
