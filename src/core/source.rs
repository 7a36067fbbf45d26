//! Host access to craft files
//!
//! [`CraftSource`] is everything the index needs from the environment that
//! owns the files. [`SavesDirectory`] implements it over a saves tree laid
//! out as `<root>/<save>/Ships/<VAB|SPH>/<name>.craft`.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::core::error::CraftError;
use crate::entities::craft::ConstructionType;

/// Creation and last-modification time of a craft file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Host collaborator supplying craft files and per-file host metadata
pub trait CraftSource {
    /// Every craft file path, recursively
    fn craft_paths(&self) -> Result<Vec<PathBuf>, CraftError>;

    /// Raw bytes of a craft file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn times(&self, path: &Path) -> io::Result<FileTimes>;

    /// Grouping label for a craft (its save folder)
    fn group(&self, path: &Path) -> String;

    /// Thumbnail image for a craft, when the host has one
    fn thumbnail(
        &self,
        group: &str,
        construction_type: ConstructionType,
        name: &str,
    ) -> Option<PathBuf>;
}

/// Craft files under a saves root directory
#[derive(Debug, Clone)]
pub struct SavesDirectory {
    root: PathBuf,
    extension: String,
}

impl SavesDirectory {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CraftSource for SavesDirectory {
    fn craft_paths(&self) -> Result<Vec<PathBuf>, CraftError> {
        let mut paths = Vec::new();

        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| CraftError::Scan {
                root: self.root.clone(),
                source: e,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path
                .extension()
                .map_or(false, |e| e.to_string_lossy() == self.extension.as_str())
            {
                paths.push(path.to_path_buf());
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn times(&self, path: &Path) -> io::Result<FileTimes> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        let created = metadata.created().unwrap_or(modified);
        Ok(FileTimes {
            created: DateTime::<Utc>::from(created),
            updated: DateTime::<Utc>::from(modified),
        })
    }

    fn group(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(|rel| rel.components().next())
            .and_then(|first| match first {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn thumbnail(
        &self,
        group: &str,
        construction_type: ConstructionType,
        name: &str,
    ) -> Option<PathBuf> {
        if group.is_empty() {
            return None;
        }
        let path = self
            .root
            .join(group)
            .join("thumbs")
            .join(format!("{}_{}_{}.png", group, construction_type, name));
        path.is_file().then_some(path)
    }
}
