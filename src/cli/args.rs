//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cache::CacheCommands, completions::CompletionsArgs, list::ListArgs, show::ShowArgs,
};

#[derive(Parser)]
#[command(name = "craftdex")]
#[command(author, version, about = "Index, filter and sort craft files")]
#[command(
    long_about = "Indexes a saves tree of craft files, caches the derived metadata (part count, stages, cost, mass) keyed by content checksum, and lists crafts with composable filters."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug detail (cache hits, misses, derivations)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Saves directory to scan
    #[arg(long, global = true, env = "CRAFTDEX_SAVES", value_name = "DIR")]
    pub saves: Option<PathBuf>,

    /// Cache store location
    #[arg(long, global = true, env = "CRAFTDEX_CACHE", value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Part catalog (YAML)
    #[arg(long, global = true, env = "CRAFTDEX_PARTS", value_name = "FILE")]
    pub parts: Option<PathBuf>,

    /// Tag file (YAML)
    #[arg(long, global = true, env = "CRAFTDEX_TAGS", value_name = "FILE")]
    pub tags: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List crafts, filtered and sorted
    List(ListArgs),

    /// Show one craft in detail
    Show(ShowArgs),

    /// Manage the craft metadata cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, detail for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just craft file paths, one per line
    Path,
}
