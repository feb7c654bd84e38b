//! Config command - show configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::cli::commands::config_manager;
use crate::config::Config;
use crate::error::BuildCacheResult;
use std::path::Path;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, explicit: Option<&Path>) -> BuildCacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(explicit, &args),
    }
    Ok(())
}

fn show_config(config: &Config) -> BuildCacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(explicit: Option<&Path>, args: &ConfigArgs) {
    match config_manager(explicit, &args.store).path() {
        Some(path) => println!("{}", path.display()),
        None => println!("(defaults, no config file)"),
    }
}
