//! Resource metadata lookup

use std::collections::HashMap;
use std::path::Path;

use dashmap::DashMap;

use super::error::ManifestError;
use crate::core::types::{ResourceIdentifier, ResourceMetadata};

/// Read-only lookup of stored file metadata by content hash
pub trait MetadataLookup: Send + Sync {
    fn find(&self, identifier: &ResourceIdentifier) -> Option<ResourceMetadata>;
}

/// Concurrent in-memory metadata store
///
/// Can be populated from a JSON manifest mapping identifiers to metadata:
///
/// ```json
/// { "abcd...": { "mediaType": "application/pdf", "filename": "a.pdf", "size": 1024 } }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    entries: DashMap<ResourceIdentifier, ResourceMetadata>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a manifest file
    pub async fn from_manifest(path: &Path) -> Result<Self, ManifestError> {
        let content = tokio::fs::read_to_string(path).await?;
        let store = Self::new();
        let count = store.load_manifest(&content)?;
        tracing::info!(entries = count, "Loaded resource metadata manifest");
        Ok(store)
    }

    /// Merge manifest JSON into the store, returning the number of entries read
    pub fn load_manifest(&self, json: &str) -> Result<usize, ManifestError> {
        let manifest: HashMap<ResourceIdentifier, ResourceMetadata> = serde_json::from_str(json)?;
        let count = manifest.len();
        for (identifier, metadata) in manifest {
            self.entries.insert(identifier, metadata);
        }
        Ok(count)
    }

    pub fn insert(&self, identifier: ResourceIdentifier, metadata: ResourceMetadata) {
        self.entries.insert(identifier, metadata);
    }

    pub fn remove(&self, identifier: &ResourceIdentifier) -> Option<ResourceMetadata> {
        self.entries.remove(identifier).map(|(_, metadata)| metadata)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataLookup for InMemoryMetadataStore {
    fn find(&self, identifier: &ResourceIdentifier) -> Option<ResourceMetadata> {
        self.entries.get(identifier).map(|entry| entry.clone())
    }
}
