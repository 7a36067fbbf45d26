//! User tags attached to crafts
//!
//! Tags are owned outside the index; the collection only asks which tags a
//! craft's reference key carries. [`TagIndex`] reads them from YAML shaped as
//! `tags: { <tag>: [<reference key>, ...] }`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;

/// Tags for a craft reference key
pub trait TagLookup {
    fn tags_for(&self, key: &str) -> Vec<String>;
}

#[derive(Debug, Default, Deserialize)]
struct TagFile {
    #[serde(default)]
    tags: BTreeMap<String, Vec<String>>,
}

/// Reverse index from reference key to the tags naming it
#[derive(Debug, Default)]
pub struct TagIndex {
    by_key: HashMap<String, BTreeSet<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tags, or an empty index if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read tags file {}", path.display()))?;
        Self::from_yaml(&content)
            .wrap_err_with(|| format!("invalid tags file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        let file: TagFile = serde_yml::from_str(content).into_diagnostic()?;
        let mut index = Self::new();
        for (tag, keys) in file.tags {
            for key in keys {
                index.tag(&key, &tag);
            }
        }
        Ok(index)
    }

    /// Attach `tag` to `key`
    pub fn tag(&mut self, key: &str, tag: &str) {
        self.by_key
            .entry(key.to_string())
            .or_default()
            .insert(tag.to_string());
    }
}

impl TagLookup for TagIndex {
    fn tags_for(&self, key: &str) -> Vec<String> {
        self.by_key
            .get(key)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }
}
