//! Errors raised while building craft records

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::cache::CacheError;
use crate::core::node::NodeSyntaxError;

/// Failure to build one craft record or to scan for craft files
#[derive(Debug, Error, Diagnostic)]
pub enum CraftError {
    #[error("failed to read craft file {}", path.display())]
    #[diagnostic(code(craftdex::craft::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("craft file {} could not be parsed", path.display())]
    #[diagnostic(code(craftdex::craft::malformed))]
    Malformed {
        path: PathBuf,
        #[source]
        #[diagnostic_source]
        source: NodeSyntaxError,
    },

    #[error("failed to scan {} for craft files", root.display())]
    #[diagnostic(
        code(craftdex::scan),
        help("check that the saves directory exists and is readable")
    )]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] CacheError),
}

impl CraftError {
    /// Errors confined to a single craft file; a scan may skip these and go on
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            CraftError::Unreadable { .. } | CraftError::Malformed { .. }
        )
    }
}
