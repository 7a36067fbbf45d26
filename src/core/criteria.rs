//! Filter criteria for the craft collection
//!
//! Every criterion is optional; an absent criterion leaves its pipeline stage
//! out entirely.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entities::craft::ConstructionType;

/// How a list of tags is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    /// Record must carry every listed tag
    #[default]
    Reduce,
    /// Record must carry at least one listed tag
    Union,
}

/// Tag criterion, written as `{list: [..], reduce: bool}` in a criteria mapping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "TagMapping", into = "TagMapping")]
pub struct TagCriteria {
    pub tags: Vec<String>,
    pub mode: TagMode,
}

#[derive(Serialize, Deserialize)]
struct TagMapping {
    #[serde(default)]
    list: Vec<String>,
    #[serde(default = "reduce_by_default")]
    reduce: bool,
}

fn reduce_by_default() -> bool {
    true
}

impl From<TagMapping> for TagCriteria {
    fn from(mapping: TagMapping) -> Self {
        TagCriteria {
            tags: mapping.list,
            mode: if mapping.reduce {
                TagMode::Reduce
            } else {
                TagMode::Union
            },
        }
    }
}

impl From<TagCriteria> for TagMapping {
    fn from(criteria: TagCriteria) -> Self {
        TagMapping {
            list: criteria.tags,
            reduce: criteria.mode == TagMode::Reduce,
        }
    }
}

/// Sort keys for the filtered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    PartCount,
    StageCount,
    Mass,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    /// Parse a key, falling back to [`SortKey::Name`] for anything unknown
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or_else(|e| {
            log::warn!("{}, sorting by name", e);
            SortKey::Name
        })
    }

    /// Count and mass keys put larger values first unless reversed
    pub fn descending_by_default(self) -> bool {
        matches!(self, SortKey::PartCount | SortKey::StageCount | SortKey::Mass)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(SortKey::Name),
            "part_count" | "parts" => Ok(SortKey::PartCount),
            "stage_count" | "stages" => Ok(SortKey::StageCount),
            "mass" | "mass.total" | "mass_total" => Ok(SortKey::Mass),
            "created_at" | "created" => Ok(SortKey::CreatedAt),
            "updated_at" | "updated" => Ok(SortKey::UpdatedAt),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            SortKey::Name => "name",
            SortKey::PartCount => "part_count",
            SortKey::StageCount => "stage_count",
            SortKey::Mass => "mass",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        };
        f.write_str(key)
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(SortKey::from_key(&key))
    }
}

/// Criteria for [`CraftCollection::filter`](crate::core::collection::CraftCollection::filter)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Exact group (save folder) match
    pub group: Option<String>,
    /// Case-insensitive substring of the craft name
    pub search: Option<String>,
    /// Construction type labels; only labels mapped to `true` are kept
    #[serde(rename = "type")]
    pub types: Option<BTreeMap<String, bool>>,
    pub tags: Option<TagCriteria>,
    pub sort: Option<SortKey>,
    pub reverse_sort: bool,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Enable a construction type label
    pub fn with_type(mut self, label: impl Into<String>) -> Self {
        self.types
            .get_or_insert_with(BTreeMap::new)
            .insert(label.into(), true);
        self
    }

    pub fn tags<I, S>(mut self, tags: I, mode: TagMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(TagCriteria {
            tags: tags.into_iter().map(Into::into).collect(),
            mode,
        });
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse_sort = true;
        self
    }

    /// Construction types enabled by the type criterion
    ///
    /// Unknown labels are dropped with a warning.
    pub(crate) fn enabled_types(&self) -> Option<Vec<ConstructionType>> {
        let types = self.types.as_ref()?;
        let mut enabled = Vec::new();
        for (label, on) in types {
            if !*on {
                continue;
            }
            match label.parse::<ConstructionType>() {
                Ok(t) if !enabled.contains(&t) => enabled.push(t),
                Ok(_) => {}
                Err(e) => log::warn!("{}", e),
            }
        }
        Some(enabled)
    }
}
