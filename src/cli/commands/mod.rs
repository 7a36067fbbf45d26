//! CLI command implementations

pub mod cache;
pub mod completions;
pub mod list;
pub mod show;
