//! Sharded path resolution below the storage root

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::error::LocateError;
use super::metadata::MetadataLookup;
use crate::core::types::{ResourceIdentifier, ResourceMetadata};

/// A stored file that exists, with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub identifier: ResourceIdentifier,
    /// Canonical absolute path of the file
    pub path: PathBuf,
    pub metadata: ResourceMetadata,
}

/// Maps identifiers to files under `root/a/b/c/d/<identifier>`
#[derive(Clone)]
pub struct ResourceLocator {
    root: PathBuf,
    metadata: Arc<dyn MetadataLookup>,
}

impl ResourceLocator {
    pub fn new(root: impl Into<PathBuf>, metadata: Arc<dyn MetadataLookup>) -> Self {
        Self {
            root: root.into(),
            metadata,
        }
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sharded path of an identifier, without touching the filesystem
    pub fn path_for(&self, identifier: &ResourceIdentifier) -> PathBuf {
        self.root.join(identifier.shard_path())
    }

    /// Resolve an identifier to an existing regular file inside the root.
    ///
    /// Metadata is looked up first; the file must then exist, be a regular
    /// file (after following links) and canonicalise to a path inside the
    /// canonical root.
    pub async fn resolve(
        &self,
        identifier: &ResourceIdentifier,
    ) -> Result<ResolvedResource, LocateError> {
        let metadata = self
            .metadata
            .find(identifier)
            .ok_or_else(|| LocateError::MetadataMissing { identifier: identifier.clone() })?;

        let relative = identifier.shard_path();
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(LocateError::OutsideRoot { identifier: identifier.clone() });
        }

        let path = self.root.join(relative);
        let file_missing = || LocateError::FileMissing { identifier: identifier.clone() };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(file_missing()),
        }

        let root_canonical = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|_| file_missing())?;
        let canonical = tokio::fs::canonicalize(&path)
            .await
            .map_err(|_| file_missing())?;

        if !canonical.starts_with(&root_canonical) {
            return Err(LocateError::OutsideRoot { identifier: identifier.clone() });
        }

        Ok(ResolvedResource {
            identifier: identifier.clone(),
            path: canonical,
            metadata,
        })
    }
}
