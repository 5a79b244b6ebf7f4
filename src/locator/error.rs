//! Locator error types

use std::fmt;

use thiserror::Error;

use crate::core::types::ResourceIdentifier;

/// Internal reason behind a "resource not found" outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The metadata store has no entry for the identifier
    Metadata,
    /// The sharded path is missing or not a regular file
    File,
    /// The resolved path leaves the storage root
    OutsideRoot,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::Metadata => write!(f, "metadata"),
            NotFoundReason::File => write!(f, "file"),
            NotFoundReason::OutsideRoot => write!(f, "outside root"),
        }
    }
}

/// Resource resolution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("no metadata for resource {identifier}")]
    MetadataMissing { identifier: ResourceIdentifier },

    #[error("stored file missing for resource {identifier}")]
    FileMissing { identifier: ResourceIdentifier },

    #[error("resolved path for resource {identifier} escapes the storage root")]
    OutsideRoot { identifier: ResourceIdentifier },
}

impl LocateError {
    pub fn reason(&self) -> NotFoundReason {
        match self {
            LocateError::MetadataMissing { .. } => NotFoundReason::Metadata,
            LocateError::FileMissing { .. } => NotFoundReason::File,
            LocateError::OutsideRoot { .. } => NotFoundReason::OutsideRoot,
        }
    }
}

/// Metadata manifest loading failures
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
