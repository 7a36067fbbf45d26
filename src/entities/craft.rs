//! Craft entity - metadata for one craft file
//!
//! A [`CraftData`] is built from a path in one pass: the file is read and
//! digested, the derived fields come from the cache when its checksum still
//! matches, otherwise they are derived from the file and written back. Host
//! fields (timestamps, group, thumbnail) are always recomputed.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::cache::CraftDataCache;
use crate::core::checksum;
use crate::core::derive;
use crate::core::error::CraftError;
use crate::core::parts::PartTable;
use crate::core::source::CraftSource;
use crate::core::tags::TagLookup;

/// Building that produced a craft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
pub enum ConstructionType {
    #[serde(rename = "VAB")]
    Vab,
    #[serde(rename = "SPH")]
    Sph,
    #[default]
    Subassembly,
}

impl ConstructionType {
    /// Normalize the `type` value of a craft file; anything unrecognized is a subassembly
    pub fn from_craft_type(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("VAB") => ConstructionType::Vab,
            Some("SPH") => ConstructionType::Sph,
            _ => ConstructionType::Subassembly,
        }
    }
}

impl std::fmt::Display for ConstructionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructionType::Vab => write!(f, "VAB"),
            ConstructionType::Sph => write!(f, "SPH"),
            ConstructionType::Subassembly => write!(f, "Subassembly"),
        }
    }
}

impl std::str::FromStr for ConstructionType {
    type Err = String;

    /// Accepts the display labels, including the plural `Subassemblies`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vab" => Ok(ConstructionType::Vab),
            "sph" => Ok(ConstructionType::Sph),
            "subassembly" | "subassemblies" => Ok(ConstructionType::Subassembly),
            _ => Err(format!("Unknown construction type: {}", s)),
        }
    }
}

/// Dry/fuel split of a cost or mass figure
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Breakdown {
    pub dry: f64,
    pub fuel: f64,
    pub total: f64,
}

impl Breakdown {
    pub fn new(dry: f64, fuel: f64) -> Self {
        Self {
            dry,
            fuel,
            total: dry + fuel,
        }
    }

    /// Accumulate a component's share; `total` is refreshed on every call
    pub fn add(&mut self, dry: f64, fuel: f64) {
        self.dry += dry;
        self.fuel += fuel;
        self.total = self.dry + self.fuel;
    }
}

/// Fields that are derived from file content and therefore cacheable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftInfo {
    pub name: String,
    /// Alternate name (the `ship` value inside the file)
    pub alt_name: String,
    pub description: String,
    pub construction_type: ConstructionType,
    pub missing_parts: bool,
    pub locked_parts: bool,
    pub stage_count: u32,
    pub part_count: u32,
    pub cost: Breakdown,
    pub mass: Breakdown,
}

impl Default for CraftInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            alt_name: String::new(),
            description: String::new(),
            construction_type: ConstructionType::default(),
            missing_parts: false,
            locked_parts: false,
            stage_count: 1,
            part_count: 0,
            cost: Breakdown::default(),
            mass: Breakdown::default(),
        }
    }
}

/// Metadata record for one craft file
#[derive(Debug, Clone, Serialize)]
pub struct CraftData {
    pub path: PathBuf,
    pub checksum: String,
    #[serde(flatten)]
    pub info: CraftInfo,

    // Host fields, never cached
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub group: String,
    pub thumbnail: Option<PathBuf>,

    #[serde(skip)]
    pub selected: bool,
    /// Whether `info` was served by the cache during construction
    #[serde(skip)]
    pub from_cache: bool,
}

impl CraftData {
    /// An unpopulated record for `path` with the given content checksum
    pub fn new(path: impl Into<PathBuf>, checksum: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            path: path.into(),
            checksum: checksum.into(),
            info: CraftInfo::default(),
            created_at: now,
            updated_at: now,
            group: String::new(),
            thumbnail: None,
            selected: false,
            from_cache: false,
        }
    }

    /// Read, digest and populate a record for `path`
    ///
    /// Cache hits skip derivation entirely; misses derive from the file and
    /// write the fresh snapshot through to the cache.
    pub fn load(
        path: &Path,
        cache: &mut CraftDataCache,
        parts: &dyn PartTable,
        source: &dyn CraftSource,
    ) -> Result<Self, CraftError> {
        let content = source.read(path).map_err(|e| CraftError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut craft = CraftData::new(path, checksum::digest(&content));
        // Legacy saves may carry non-UTF-8 text; it is decoded lossily
        let content = String::from_utf8_lossy(&content);

        if cache.try_fetch(&mut craft) {
            craft.from_cache = true;
        } else {
            log::info!("Loading craft data from file for {}", path.display());
            let mut info = derive::derive(&content, &path.to_string_lossy(), parts)
                .map_err(|e| CraftError::Malformed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            info.name = file_stem(path);
            craft.info = info;
            cache.write(&craft)?;
        }

        let times = source.times(path).map_err(|e| CraftError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        craft.created_at = times.created;
        craft.updated_at = times.updated;
        craft.group = source.group(path);
        craft.thumbnail =
            source.thumbnail(&craft.group, craft.info.construction_type, &craft.info.name);

        Ok(craft)
    }

    /// Cache key for this record
    pub fn key(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Key used to look up user tags for this craft
    pub fn reference_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.group, self.info.construction_type, self.info.name
        )
    }

    pub fn tags(&self, lookup: &dyn TagLookup) -> Vec<String> {
        lookup.tags_for(&self.reference_key())
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
