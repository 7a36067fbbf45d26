//! Entity type definitions
//!
//! - [`CraftData`] - metadata record for one craft file
//! - [`CraftInfo`] - the cacheable, content-derived part of a record

pub mod craft;

pub use craft::{Breakdown, ConstructionType, CraftData, CraftInfo};
