//! `craftdex cache` command - Manage the craft metadata cache
//!
//! The cache is a YAML file mapping each craft path to its derived metadata
//! and the checksum of the content it was derived from. It is rebuilt on
//! demand by any scanning command, so clearing it is always safe.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{load_config, open_collection};
use crate::core::cache::CraftDataCache;
use crate::core::source::{CraftSource, SavesDirectory};

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Delete the cache file
    Clear,

    /// Drop entries for craft files that no longer exist
    Prune,

    /// Scan the saves tree and bring the cache up to date
    Sync,
}

pub fn run(cmd: CacheCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CacheCommands::Status => run_status(global),
        CacheCommands::Clear => run_clear(global),
        CacheCommands::Prune => run_prune(global),
        CacheCommands::Sync => run_sync(global),
    }
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let cache = CraftDataCache::open(config.cache_file())?;
    let stats = cache.stats();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&stats).into_diagnostic()?);
        }
        _ => {
            println!("{}", style("Cache Status").bold());
            println!("{}", style("─".repeat(40)).dim());
            println!("  Location:  {}", stats.path.display());
            println!("  Entries:   {}", style(stats.entries).cyan());
            println!("  File size: {} KB", style(stats.size_bytes / 1024).cyan());
        }
    }
    Ok(())
}

fn run_clear(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let path = config.cache_file();

    // A corrupt store must still be removable
    let removed = match CraftDataCache::open(&path) {
        Ok(mut cache) => cache.clear()?,
        Err(e) => {
            log::warn!("{}", e);
            if path.exists() {
                std::fs::remove_file(&path).into_diagnostic()?;
            }
            0
        }
    };

    if !global.quiet {
        println!(
            "{} Cache cleared ({} entries removed)",
            style("✓").green(),
            removed
        );
    }
    Ok(())
}

fn run_prune(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let mut cache = CraftDataCache::open(config.cache_file())?;
    let source = SavesDirectory::new(config.saves_dir(), config.extension());
    let live = source.craft_paths()?;

    let removed = cache.prune(&live)?;

    if !global.quiet {
        if removed == 0 {
            println!("{} Cache has no stale entries", style("✓").green());
        } else {
            println!(
                "{} Pruned {} stale entries",
                style("✓").green(),
                style(removed).yellow()
            );
        }
    }
    Ok(())
}

fn run_sync(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let mut collection = open_collection(&config)?;

    if !global.quiet && global.format != OutputFormat::Json {
        println!("{} Scanning {}...", style("→").blue(), config.saves_dir().display());
    }
    let stats = collection.load_all()?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }
        _ if global.quiet => {}
        _ => {
            println!(
                "{} Cache synced in {}ms",
                style("✓").green(),
                stats.duration_ms
            );
            println!("  Files scanned: {}", stats.files_scanned);
            println!("  Cache hits:    {}", style(stats.cache_hits).green());
            if stats.derived > 0 {
                println!("  Derived:       {}", style(stats.derived).yellow());
            }
            if stats.skipped > 0 {
                println!("  Skipped:       {}", style(stats.skipped).red());
            }
            if stats.pruned > 0 {
                println!("  Pruned:        {}", stats.pruned);
            }
        }
    }
    Ok(())
}
