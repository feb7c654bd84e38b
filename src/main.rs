//! buildcache - CI build cache sidecar
//!
//! CLI entry point that dispatches to subcommands.

use buildcache::cli::commands::load_config;
use buildcache::cli::{Cli, Commands, LogFormat};
use buildcache::error::BuildCacheResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BuildCacheResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("buildcache=warn"),
        1 => EnvFilter::new("buildcache=info"),
        _ => EnvFilter::new("buildcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    match cli.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    let config_path = cli.config.as_deref();

    // Run loads its own config so that a broken config never fails the pipeline
    match cli.command {
        Commands::Run(args) => buildcache::cli::commands::run(args, config_path).await,
        Commands::Key(args) => {
            let config = load_config(config_path, &args.store).await?;
            buildcache::cli::commands::key(args, &config).await
        }
        Commands::List(args) => {
            let config = load_config(config_path, &args.store).await?;
            buildcache::cli::commands::list(args, &config).await
        }
        Commands::Purge(args) => {
            let config = load_config(config_path, &args.store).await?;
            buildcache::cli::commands::purge(args, &config).await
        }
        Commands::Config(args) => {
            let config = load_config(config_path, &args.store).await?;
            buildcache::cli::commands::config(args, &config, config_path).await
        }
    }
}
