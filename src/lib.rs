//! craftdex: craft file index
//!
//! Scans a saves tree of craft files, derives per-craft metadata (parts,
//! stages, cost, mass), caches it keyed by content checksum and answers
//! filtered, sorted queries over the whole set.

pub mod cli;
pub mod core;
pub mod entities;
