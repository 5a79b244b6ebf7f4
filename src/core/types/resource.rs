//! Stored resource identifiers and metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Length of a resource identifier (SHA-1 content hash, hex encoded)
pub const IDENTIFIER_LENGTH: usize = 40;

/// Number of leading identifier characters used as nested shard directories
pub const SHARD_DEPTH: usize = 4;

/// Reasons a resource identifier is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier contains a path component character")]
    PathComponent,

    #[error("identifier must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("identifier is not a lowercase hex digest")]
    NotHex,
}

/// Content hash identifying a stored file
///
/// A value of this type is always exactly [`IDENTIFIER_LENGTH`] lowercase hex
/// characters. It can never contain `/`, `\`, `.` or NUL, so joining it (or
/// any prefix of it) onto a directory never leaves that directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceIdentifier(String);

impl ResourceIdentifier {
    /// Parse and validate an identifier.
    ///
    /// Path component characters are rejected before the hex check so the
    /// traversal guarantee holds independently of the digest format.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        if Self::has_path_component(value) {
            return Err(IdentifierError::PathComponent);
        }

        if value.len() != IDENTIFIER_LENGTH {
            return Err(IdentifierError::InvalidLength {
                expected: IDENTIFIER_LENGTH,
                actual: value.len(),
            });
        }

        if !value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(IdentifierError::NotHex);
        }

        Ok(Self(value.to_string()))
    }

    /// Check for characters that could alter a filesystem path
    pub fn has_path_component(value: &str) -> bool {
        value.contains(['/', '\\', '.', '\0'])
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative storage path: `a/b/c/d/abcd...`
    pub fn shard_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for c in self.0.chars().take(SHARD_DEPTH) {
            path.push(c.to_string());
        }
        path.push(&self.0);
        path
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ResourceIdentifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceIdentifier> for String {
    fn from(id: ResourceIdentifier) -> Self {
        id.0
    }
}

/// Metadata of a stored file, owned by the external metadata store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Media type sent as `Content-Type`
    pub media_type: String,
    /// Original filename sent in `Content-Disposition`
    pub filename: String,
    /// Size in bytes sent as `Content-Length`
    pub size: u64,
}

impl ResourceMetadata {
    /// Create new metadata
    pub fn new(media_type: impl Into<String>, filename: impl Into<String>, size: u64) -> Self {
        Self {
            media_type: media_type.into(),
            filename: filename.into(),
            size,
        }
    }
}
