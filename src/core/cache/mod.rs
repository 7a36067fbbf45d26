//! Persistent cache of derived craft metadata
//!
//! The cache maps a craft file path to a flat string snapshot of its derived
//! fields plus the checksum of the content they were derived from. Entries are
//! only served while the checksum still matches, so a changed file is always
//! re-derived.
//!
//! The store is a YAML document, one entry per craft:
//!
//! ```yaml
//! craft_data:
//!   /saves/career/Ships/VAB/Rocket.craft:
//!     checksum: 9f86d08...
//!     name: Rocket
//!     part_count: '12'
//!     ...
//! ```
//!
//! Every write goes straight to disk (write-through) via a temp file and a
//! rename, so a crash mid-write leaves the previous store intact.

mod fields;

pub use fields::{Accessor, CoercionError, FieldMapping, FIELDS};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::craft::CraftData;

/// Flat snapshot of one craft: field name to string value
pub type CacheEntry = BTreeMap<String, String>;

const PATH_FIELD: &str = "path";
const CHECKSUM_FIELD: &str = "checksum";

/// Failure to load or persist the cache store
#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("failed to read craft cache {}", path.display())]
    #[diagnostic(code(craftdex::cache::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("craft cache {} is corrupt", path.display())]
    #[diagnostic(
        code(craftdex::cache::corrupt),
        help("delete the file or run `craftdex cache clear`")
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("failed to write craft cache {}", path.display())]
    #[diagnostic(code(craftdex::cache::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize craft cache")]
    #[diagnostic(code(craftdex::cache::serialize))]
    Serialize(#[source] serde_yml::Error),
}

#[derive(Debug, Default, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    craft_data: Option<BTreeMap<String, CacheEntry>>,
}

#[derive(Serialize)]
struct CacheDocumentRef<'a> {
    craft_data: &'a BTreeMap<String, CacheEntry>,
}

/// Cache statistics for `craftdex cache status`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Path-keyed store of derived craft metadata
#[derive(Debug)]
pub struct CraftDataCache {
    path: PathBuf,
    data: BTreeMap<String, CacheEntry>,
}

impl CraftDataCache {
    /// Load the store at `path`
    ///
    /// A missing or empty file yields an empty cache. A file that exists but
    /// cannot be read or parsed is an error; it is never silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let mut cache = Self {
            path: path.into(),
            data: BTreeMap::new(),
        };
        cache.load()?;
        Ok(cache)
    }

    /// Replace the in-memory contents with the persisted store
    pub fn load(&mut self) -> Result<(), CacheError> {
        if !self.path.exists() {
            log::debug!("no craft cache at {}, starting empty", self.path.display());
            self.data.clear();
            return Ok(());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| CacheError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        if content.trim().is_empty() {
            self.data.clear();
            return Ok(());
        }

        let document: CacheDocument =
            serde_yml::from_str(&content).map_err(|e| CacheError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;
        self.data = document.craft_data.unwrap_or_default();
        log::debug!(
            "loaded {} cached crafts from {}",
            self.data.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Populate `craft.info` from a fresh entry
    ///
    /// Returns false, leaving `craft` untouched, when there is no entry for
    /// the path, its checksum differs from `craft.checksum`, or any field
    /// fails to coerce.
    pub fn try_fetch(&self, craft: &mut CraftData) -> bool {
        let key = craft.key().into_owned();
        let Some(entry) = self.data.get(&key) else {
            log::debug!("cache miss for {}", key);
            return false;
        };

        if entry.get(CHECKSUM_FIELD) != Some(&craft.checksum) {
            log::debug!("cache entry for {} is stale", key);
            return false;
        }

        let mut scratch = craft.info.clone();
        for field in FIELDS {
            let applied = match entry.get(field.name) {
                Some(raw) => field.apply(&mut scratch, raw),
                None => Err(CoercionError::Missing { field: field.name }),
            };
            if let Err(e) = applied {
                log::warn!("ignoring cache entry for {}: {}", key, e);
                return false;
            }
        }

        craft.info = scratch;
        true
    }

    /// Record a snapshot of `craft` and persist the store immediately
    ///
    /// When persisting fails the in-memory store is rolled back, so it never
    /// runs ahead of the file.
    pub fn write(&mut self, craft: &CraftData) -> Result<(), CacheError> {
        let key = craft.key().into_owned();
        let previous = self.data.insert(key.clone(), snapshot(craft));
        if let Err(e) = self.save() {
            match previous {
                Some(entry) => self.data.insert(key, entry),
                None => self.data.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Persist the whole store atomically
    pub fn save(&self) -> Result<(), CacheError> {
        let yaml = serde_yml::to_string(&CacheDocumentRef {
            craft_data: &self.data,
        })
        .map_err(CacheError::Serialize)?;

        let write_err = |e| CacheError::Write {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = temp_path(&self.path);
        fs::write(&tmp, yaml).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }

    /// Drop entries whose path is not in `live`; returns how many were removed
    pub fn prune<I, P>(&mut self, live: I) -> Result<usize, CacheError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let live: std::collections::HashSet<String> = live
            .into_iter()
            .map(|p| p.as_ref().to_string_lossy().into_owned())
            .collect();

        let before = self.data.len();
        self.data.retain(|key, _| live.contains(key));
        let removed = before - self.data.len();

        if removed > 0 {
            log::info!("pruned {} stale cache entries", removed);
            self.save()?;
        }
        Ok(removed)
    }

    /// Remove every entry and delete the store file
    pub fn clear(&mut self) -> Result<usize, CacheError> {
        let removed = self.data.len();
        self.data.clear();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| CacheError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }
        Ok(removed)
    }

    /// Raw entry for a craft path
    pub fn get(&self, path: &Path) -> Option<&CacheEntry> {
        self.data.get(path.to_string_lossy().as_ref())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.data.len(),
            path: self.path.clone(),
            size_bytes: fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        }
    }
}

fn snapshot(craft: &CraftData) -> CacheEntry {
    let mut entry = CacheEntry::new();
    entry.insert(PATH_FIELD.to_string(), craft.key().into_owned());
    entry.insert(CHECKSUM_FIELD.to_string(), craft.checksum.clone());
    for field in FIELDS {
        entry.insert(field.name.to_string(), field.read(&craft.info));
    }
    entry
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
