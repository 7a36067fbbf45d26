//! Configuration management with layered hierarchy
//!
//! Later layers win: built-in defaults, the global user config, the
//! directory-local `.craftdex.yaml`, environment variables, then CLI flags
//! (applied by the command layer).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::collection::CollectionOptions;
use crate::core::criteria::SortKey;

/// Directory-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".craftdex.yaml";

const CACHE_FILE_NAME: &str = "craft_data.cache";

/// craftdex configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root of the saves tree to scan
    pub saves_dir: Option<PathBuf>,

    /// Durable cache store
    pub cache_file: Option<PathBuf>,

    /// Part catalog (YAML)
    pub parts_file: Option<PathBuf>,

    /// User tags (YAML)
    pub tags_file: Option<PathBuf>,

    /// Craft file extension, without the dot
    pub extension: Option<String>,

    /// Skip unreadable craft files instead of failing the scan
    pub skip_unreadable: Option<bool>,

    /// Drop cache entries for deleted craft files after each scan
    pub prune_cache: Option<bool>,

    /// Sort key used by `list` when none is given
    pub default_sort: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        if let Some(local) = Self::read_file(Path::new(LOCAL_CONFIG_FILE)) {
            config.merge(local);
        }

        config.merge(Self::from_env(|key| std::env::var(key).ok()));
        config
    }

    /// Parse a config file; missing or invalid files contribute nothing
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| log::warn!("cannot read config {}: {}", path.display(), e))
            .ok()?;
        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| log::warn!("ignoring invalid config {}: {}", path.display(), e))
            .ok()
    }

    /// Environment layer (`CRAFTDEX_SAVES`, `CRAFTDEX_CACHE`, `CRAFTDEX_PARTS`, `CRAFTDEX_TAGS`)
    pub fn from_env(var: impl Fn(&str) -> Option<String>) -> Config {
        let path = |key: &str| var(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        Config {
            saves_dir: path("CRAFTDEX_SAVES"),
            cache_file: path("CRAFTDEX_CACHE"),
            parts_file: path("CRAFTDEX_PARTS"),
            tags_file: path("CRAFTDEX_TAGS"),
            ..Config::default()
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("", "", "craftdex")
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.saves_dir.is_some() {
            self.saves_dir = other.saves_dir;
        }
        if other.cache_file.is_some() {
            self.cache_file = other.cache_file;
        }
        if other.parts_file.is_some() {
            self.parts_file = other.parts_file;
        }
        if other.tags_file.is_some() {
            self.tags_file = other.tags_file;
        }
        if other.extension.is_some() {
            self.extension = other.extension;
        }
        if other.skip_unreadable.is_some() {
            self.skip_unreadable = other.skip_unreadable;
        }
        if other.prune_cache.is_some() {
            self.prune_cache = other.prune_cache;
        }
        if other.default_sort.is_some() {
            self.default_sort = other.default_sort;
        }
    }

    /// Saves root, defaulting to the current directory
    pub fn saves_dir(&self) -> PathBuf {
        self.saves_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Cache store: configured, else the user cache dir, else inside the saves root
    pub fn cache_file(&self) -> PathBuf {
        if let Some(path) = &self.cache_file {
            return path.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
            .unwrap_or_else(|| self.saves_dir().join(format!(".{}", CACHE_FILE_NAME)))
    }

    pub fn parts_file(&self) -> PathBuf {
        self.parts_file
            .clone()
            .unwrap_or_else(|| self.data_file("parts.yaml"))
    }

    pub fn tags_file(&self) -> PathBuf {
        self.tags_file
            .clone()
            .unwrap_or_else(|| self.data_file("tags.yaml"))
    }

    fn data_file(&self, name: &str) -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join(name))
            .unwrap_or_else(|| self.saves_dir().join(format!(".craftdex-{}", name)))
    }

    pub fn extension(&self) -> &str {
        self.extension
            .as_deref()
            .map(|e| e.trim_start_matches('.'))
            .unwrap_or("craft")
    }

    pub fn skip_unreadable(&self) -> bool {
        self.skip_unreadable.unwrap_or(true)
    }

    pub fn prune_cache(&self) -> bool {
        self.prune_cache.unwrap_or(false)
    }

    /// Configured default sort; unknown keys fall back to name
    pub fn default_sort(&self) -> Option<SortKey> {
        self.default_sort.as_deref().map(SortKey::from_key)
    }

    pub fn collection_options(&self) -> CollectionOptions {
        CollectionOptions {
            cache_file: self.cache_file(),
            skip_unreadable: self.skip_unreadable(),
            prune_cache: self.prune_cache(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.saves_dir(), PathBuf::from("."));
        assert_eq!(config.extension(), "craft");
        assert!(config.skip_unreadable());
        assert!(!config.prune_cache());
        assert_eq!(config.default_sort(), None);
        assert!(config.cache_file().ends_with("craft_data.cache"));
    }

    #[test]
    fn test_merge_later_wins() {
        let mut config: Config =
            serde_yml::from_str("saves_dir: /a\nextension: craft\nprune_cache: true\n").unwrap();
        config.merge(serde_yml::from_str("saves_dir: /b\n").unwrap());
        assert_eq!(config.saves_dir(), PathBuf::from("/b"));
        assert!(config.prune_cache());
        assert_eq!(config.extension(), "craft");
    }

    #[test]
    fn test_env_layer() {
        let vars: HashMap<&str, &str> = [
            ("CRAFTDEX_SAVES", "/games/saves"),
            ("CRAFTDEX_CACHE", "/tmp/c.cache"),
            ("CRAFTDEX_TAGS", ""),
        ]
        .into_iter()
        .collect();
        let config = Config::from_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.saves_dir, Some(PathBuf::from("/games/saves")));
        assert_eq!(config.cache_file(), PathBuf::from("/tmp/c.cache"));
        assert_eq!(config.tags_file, None);
        assert_eq!(config.parts_file, None);
    }

    #[test]
    fn test_read_file_ignores_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(Config::read_file(&path).is_none());

        std::fs::write(&path, "skip_unreadable: [").unwrap();
        assert!(Config::read_file(&path).is_none());

        std::fs::write(&path, "default_sort: part_count\nextension: .craft\n").unwrap();
        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.default_sort(), Some(SortKey::PartCount));
        assert_eq!(config.extension(), "craft");
    }

    #[test]
    fn test_collection_options() {
        let config = Config {
            cache_file: Some(PathBuf::from("/x/cache")),
            skip_unreadable: Some(false),
            ..Config::default()
        };
        let options = config.collection_options();
        assert_eq!(options.cache_file, PathBuf::from("/x/cache"));
        assert!(!options.skip_unreadable);
        assert!(!options.prune_cache);
    }
}
