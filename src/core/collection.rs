//! Craft collection - the loaded record set and its filtered view
//!
//! A [`CraftCollection`] owns every collaborator it needs (host source, part
//! table, tag lookup) and the cache, so there is no process-wide state. A scan
//! replaces the record set wholesale; filtering replaces the view wholesale.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::core::cache::CraftDataCache;
use crate::core::criteria::{FilterCriteria, SortKey, TagMode};
use crate::core::error::CraftError;
use crate::core::parts::PartTable;
use crate::core::source::CraftSource;
use crate::core::tags::TagLookup;
use crate::entities::craft::CraftData;

/// Scan behaviour
#[derive(Debug, Clone)]
pub struct CollectionOptions {
    /// Location of the durable cache store
    pub cache_file: PathBuf,
    /// Log and skip unreadable or malformed craft files instead of failing the scan
    pub skip_unreadable: bool,
    /// Drop cache entries for files that no longer exist after each scan
    pub prune_cache: bool,
}

/// Outcome of [`CraftCollection::load_all`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    pub files_scanned: usize,
    pub cache_hits: usize,
    pub derived: usize,
    pub skipped: usize,
    pub pruned: usize,
    pub duration_ms: u64,
}

pub struct CraftCollection {
    source: Box<dyn CraftSource>,
    parts: Box<dyn PartTable>,
    tags: Box<dyn TagLookup>,
    options: CollectionOptions,
    cache: Option<CraftDataCache>,
    all: Vec<CraftData>,
    filtered: Vec<usize>,
}

impl CraftCollection {
    pub fn new(
        source: Box<dyn CraftSource>,
        parts: Box<dyn PartTable>,
        tags: Box<dyn TagLookup>,
        options: CollectionOptions,
    ) -> Self {
        Self {
            source,
            parts,
            tags,
            options,
            cache: None,
            all: Vec::new(),
            filtered: Vec::new(),
        }
    }

    /// Scan the host for craft files and rebuild every record
    ///
    /// The cache is opened on first use; a corrupt store fails the scan.
    pub fn load_all(&mut self) -> Result<LoadStats, CraftError> {
        let start = Instant::now();

        let cache = match self.cache.take() {
            Some(cache) => cache,
            None => CraftDataCache::open(&self.options.cache_file)?,
        };
        let cache = self.cache.insert(cache);

        let paths = self.source.craft_paths()?;
        let mut stats = LoadStats {
            files_scanned: paths.len(),
            ..LoadStats::default()
        };

        let mut records = Vec::with_capacity(paths.len());
        for path in &paths {
            match CraftData::load(path, cache, self.parts.as_ref(), self.source.as_ref()) {
                Ok(craft) => {
                    if craft.from_cache {
                        stats.cache_hits += 1;
                    } else {
                        stats.derived += 1;
                    }
                    records.push(craft);
                }
                Err(e) if e.is_per_file() && self.options.skip_unreadable => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if self.options.prune_cache {
            stats.pruned = cache.prune(&paths)?;
        }

        self.all = records;
        self.filtered = (0..self.all.len()).collect();

        stats.duration_ms = start.elapsed().as_millis() as u64;
        log::debug!(
            "loaded {} crafts ({} cached, {} derived, {} skipped) in {}ms",
            self.all.len(),
            stats.cache_hits,
            stats.derived,
            stats.skipped,
            stats.duration_ms
        );
        Ok(stats)
    }

    /// Rebuild the view from every record
    ///
    /// Stages run in order (group, search, type, tags, sort) and each only
    /// narrows the result of the previous one.
    pub fn filter(&mut self, criteria: &FilterCriteria) {
        let mut view: Vec<usize> = (0..self.all.len()).collect();

        if let Some(group) = &criteria.group {
            view.retain(|&i| self.all[i].group == *group);
        }

        if let Some(search) = &criteria.search {
            let needle = search.to_lowercase();
            view.retain(|&i| self.all[i].name().to_lowercase().contains(&needle));
        }

        if let Some(types) = criteria.enabled_types() {
            view.retain(|&i| types.contains(&self.all[i].info.construction_type));
        }

        if let Some(tag_criteria) = &criteria.tags {
            view.retain(|&i| {
                let carried = self.all[i].tags(self.tags.as_ref());
                let mut wanted = tag_criteria.tags.iter();
                match tag_criteria.mode {
                    TagMode::Reduce => wanted.all(|t| carried.contains(t)),
                    TagMode::Union => wanted.any(|t| carried.contains(t)),
                }
            });
        }

        if let Some(key) = criteria.sort {
            view.sort_by(|&a, &b| compare(&self.all[a], &self.all[b], key));
            if criteria.reverse_sort {
                view.reverse();
            }
        }

        self.filtered = view;
    }

    /// Mark the record at `path` as the only selected one
    ///
    /// Every flag is cleared first; nothing is selected if the record is not
    /// in the current view.
    pub fn select(&mut self, path: &Path) {
        for craft in &mut self.all {
            craft.selected = false;
        }
        let index = self
            .filtered
            .iter()
            .copied()
            .find(|&i| self.all[i].path == path);
        if let Some(i) = index {
            self.all[i].selected = true;
        }
    }

    pub fn selected(&self) -> Option<&CraftData> {
        self.filtered().find(|craft| craft.selected)
    }

    /// Resolve a record in the view by path, then name, then name ignoring case
    pub fn find(&self, reference: &str) -> Option<&CraftData> {
        self.filtered()
            .find(|c| c.path == Path::new(reference))
            .or_else(|| self.filtered().find(|c| c.name() == reference))
            .or_else(|| {
                self.filtered()
                    .find(|c| c.name().eq_ignore_ascii_case(reference))
            })
    }

    /// Every record from the last scan, in scan order
    pub fn all(&self) -> &[CraftData] {
        &self.all
    }

    /// Records in the current view, in view order
    pub fn filtered(&self) -> impl Iterator<Item = &CraftData> + '_ {
        self.filtered.iter().map(move |&i| &self.all[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn cache(&self) -> Option<&CraftDataCache> {
        self.cache.as_ref()
    }

    /// User tags carried by `craft`
    pub fn tags_of(&self, craft: &CraftData) -> Vec<String> {
        craft.tags(self.tags.as_ref())
    }
}

/// Primary key in its default direction, then ascending name
fn compare(a: &CraftData, b: &CraftData, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Name => Ordering::Equal,
        SortKey::PartCount => a.info.part_count.cmp(&b.info.part_count),
        SortKey::StageCount => a.info.stage_count.cmp(&b.info.stage_count),
        SortKey::Mass => a.info.mass.total.total_cmp(&b.info.mass.total),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    let primary = if key.descending_by_default() {
        primary.reverse()
    } else {
        primary
    };
    primary.then_with(|| compare_names(a.name(), b.name()))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
