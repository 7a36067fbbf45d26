//! Shared helper functions for CLI commands
//!
//! Config resolution and collection setup used by every command that scans
//! the saves tree, plus small formatting utilities for table output.

use miette::Result;
use serde::Serialize;

use crate::cli::args::GlobalOpts;
use crate::core::collection::CraftCollection;
use crate::core::config::Config;
use crate::core::parts::PartCatalog;
use crate::core::source::SavesDirectory;
use crate::core::tags::TagIndex;
use crate::entities::craft::CraftData;

/// Serialized form of a craft for json/yaml output
#[derive(Serialize)]
pub struct CraftView<'a> {
    #[serde(flatten)]
    pub craft: &'a CraftData,
    pub tags: Vec<String>,
}

impl<'a> CraftView<'a> {
    pub fn new(collection: &CraftCollection, craft: &'a CraftData) -> Self {
        Self {
            craft,
            tags: collection.tags_of(craft),
        }
    }
}

/// Layered config with the CLI flags applied last
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    config.merge(Config {
        saves_dir: global.saves.clone(),
        cache_file: global.cache.clone(),
        parts_file: global.parts.clone(),
        tags_file: global.tags.clone(),
        ..Config::default()
    });
    config
}

/// Build a collection over the configured saves tree (not yet scanned)
pub fn open_collection(config: &Config) -> Result<CraftCollection> {
    let parts = PartCatalog::load(&config.parts_file())?;
    let tags = TagIndex::load(&config.tags_file())?;
    let source = SavesDirectory::new(config.saves_dir(), config.extension());

    Ok(CraftCollection::new(
        Box::new(source),
        Box::new(parts),
        Box::new(tags),
        config.collection_options(),
    ))
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Fixed two-decimal rendering used for cost and mass columns
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Yes/no flag column
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Mün Lander Mk3", 7), "Mün ...");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12.0), "12.00");
        assert_eq!(format_amount(12.3456), "12.35");
    }

    #[test]
    fn test_cli_flags_override_config() {
        let global = GlobalOpts {
            saves: Some(PathBuf::from("/flag/saves")),
            cache: Some(PathBuf::from("/flag/cache")),
            ..GlobalOpts::default()
        };
        let config = load_config(&global);
        assert_eq!(config.saves_dir(), PathBuf::from("/flag/saves"));
        assert_eq!(config.cache_file(), PathBuf::from("/flag/cache"));
    }
}
