//! List command - show entries under the cache root

use crate::cache::{format_bytes, CacheEntry, CacheStore};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::BuildCacheResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> BuildCacheResult<()> {
    let store = CacheStore::new(&config.cache.root, config.cache.prefix.clone());
    let entries = store.entries().await?;

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, &format!("No cache entries in {}", store.root().display()));
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    println!(
        "{:<34} {:<8} {:<10} {:<10} {:<17}",
        style("KEY").bold(),
        style("FORMAT").bold(),
        style("STATE").bold(),
        style("SIZE").bold(),
        style("MODIFIED").bold()
    );
    println!("{}", "-".repeat(83));

    let mut total = 0;
    for entry in entries {
        let state = match entry.rotation.as_deref() {
            None => style("current".to_string()).green(),
            Some(tag) => style(tag.to_string()).yellow(),
        };
        total += entry.size_bytes;

        println!(
            "{:<34} {:<8} {:<10} {:<10} {:<17}",
            entry.key,
            entry.format,
            state,
            format_bytes(entry.size_bytes),
            entry.modified.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("Total: {} entr(ies), {}", entries.len(), format_bytes(total));
}

fn print_json(entries: &[CacheEntry]) -> BuildCacheResult<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

fn print_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.path.display());
    }
}
