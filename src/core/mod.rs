//! Core module - cache, derivation and the craft collection

pub mod cache;
pub mod checksum;
pub mod collection;
pub mod config;
pub mod criteria;
pub mod derive;
pub mod error;
pub mod node;
pub mod parts;
pub mod source;
pub mod tags;

pub use cache::{CacheError, CacheStats, CraftDataCache};
pub use collection::{CollectionOptions, CraftCollection, LoadStats};
pub use config::Config;
pub use criteria::{FilterCriteria, SortKey, TagCriteria, TagMode};
pub use error::CraftError;
pub use node::{CraftNode, NodeSyntaxError};
pub use parts::{PartCatalog, PartCostMass, PartInfo, PartTable};
pub use source::{CraftSource, FileTimes, SavesDirectory};
pub use tags::{TagIndex, TagLookup};
