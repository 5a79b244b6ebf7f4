//! Tests for resource location

use super::*;
use crate::core::types::{ResourceIdentifier, ResourceMetadata};
use crate::testing::{self, IDENTIFIER, OTHER_IDENTIFIER};
use std::sync::Arc;
use tempfile::TempDir;

fn id(value: &str) -> ResourceIdentifier {
    ResourceIdentifier::parse(value).unwrap()
}

fn store_with(identifier: &str) -> Arc<InMemoryMetadataStore> {
    let store = InMemoryMetadataStore::new();
    store.insert(id(identifier), ResourceMetadata::new("text/plain", "notes.txt", 5));
    Arc::new(store)
}

#[tokio::test]
async fn test_resolve_existing_file() {
    let dir = TempDir::new().unwrap();
    let written = testing::write_resource(dir.path(), IDENTIFIER, b"hello");
    let locator = ResourceLocator::new(dir.path(), store_with(IDENTIFIER));

    let resolved = locator.resolve(&id(IDENTIFIER)).await.unwrap();

    assert_eq!(resolved.path, written.canonicalize().unwrap());
    assert_eq!(resolved.metadata, ResourceMetadata::new("text/plain", "notes.txt", 5));
    assert_eq!(resolved.identifier.as_str(), IDENTIFIER);
}

#[tokio::test]
async fn test_path_for_uses_four_level_shard() {
    let locator = ResourceLocator::new("/data/resources", store_with(IDENTIFIER));
    assert_eq!(
        locator.path_for(&id(IDENTIFIER)),
        std::path::PathBuf::from(format!("/data/resources/a/b/c/d/{IDENTIFIER}"))
    );
}

#[tokio::test]
async fn test_missing_metadata() {
    let dir = TempDir::new().unwrap();
    testing::write_resource(dir.path(), IDENTIFIER, b"hello");
    let locator = ResourceLocator::new(dir.path(), Arc::new(InMemoryMetadataStore::new()));

    let err = locator.resolve(&id(IDENTIFIER)).await.unwrap_err();
    assert_eq!(err.reason(), NotFoundReason::Metadata);
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let locator = ResourceLocator::new(dir.path(), store_with(IDENTIFIER));

    let err = locator.resolve(&id(IDENTIFIER)).await.unwrap_err();
    assert_eq!(err.reason(), NotFoundReason::File);
}

#[tokio::test]
async fn test_directory_is_not_a_file() {
    let dir = TempDir::new().unwrap();
    let locator = ResourceLocator::new(dir.path(), store_with(IDENTIFIER));
    std::fs::create_dir_all(locator.path_for(&id(IDENTIFIER))).unwrap();

    let err = locator.resolve(&id(IDENTIFIER)).await.unwrap_err();
    assert_eq!(err.reason(), NotFoundReason::File);
}

#[tokio::test]
async fn test_missing_root() {
    let dir = TempDir::new().unwrap();
    let locator = ResourceLocator::new(dir.path().join("does-not-exist"), store_with(IDENTIFIER));

    let err = locator.resolve(&id(IDENTIFIER)).await.unwrap_err();
    assert_eq!(err.reason(), NotFoundReason::File);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escaping_root_is_rejected() {
    let root = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let secret = outside.path().join("secret.txt");
    std::fs::write(&secret, b"top secret").unwrap();

    let locator = ResourceLocator::new(root.path(), store_with(IDENTIFIER));
    let link = locator.path_for(&id(IDENTIFIER));
    std::fs::create_dir_all(link.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(&secret, &link).unwrap();

    let err = locator.resolve(&id(IDENTIFIER)).await.unwrap_err();
    assert_eq!(err.reason(), NotFoundReason::OutsideRoot);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_shard_directory_escaping_root_is_rejected() {
    let root = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    testing::write_resource(outside.path(), IDENTIFIER, b"elsewhere");

    // root/a -> outside/a
    std::os::unix::fs::symlink(outside.path().join("a"), root.path().join("a")).unwrap();

    let locator = ResourceLocator::new(root.path(), store_with(IDENTIFIER));
    let err = locator.resolve(&id(IDENTIFIER)).await.unwrap_err();
    assert_eq!(err.reason(), NotFoundReason::OutsideRoot);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_root_is_allowed() {
    let real = TempDir::new().unwrap();
    let links = TempDir::new().unwrap();
    testing::write_resource(real.path(), IDENTIFIER, b"hello");
    let root = links.path().join("storage");
    std::os::unix::fs::symlink(real.path(), &root).unwrap();

    let locator = ResourceLocator::new(&root, store_with(IDENTIFIER));
    assert!(locator.resolve(&id(IDENTIFIER)).await.is_ok());
}

#[tokio::test]
async fn test_metadata_store_operations() {
    let store = InMemoryMetadataStore::new();
    assert!(store.is_empty());

    store.insert(id(IDENTIFIER), ResourceMetadata::new("image/png", "a.png", 10));
    assert_eq!(store.len(), 1);
    assert_eq!(store.find(&id(IDENTIFIER)).unwrap().filename, "a.png");
    assert!(store.find(&id(OTHER_IDENTIFIER)).is_none());

    assert!(store.remove(&id(IDENTIFIER)).is_some());
    assert!(store.find(&id(IDENTIFIER)).is_none());
}

#[tokio::test]
async fn test_manifest_loading() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("manifest.json");
    std::fs::write(
        &manifest,
        format!(
            r#"{{
                "{IDENTIFIER}": {{ "mediaType": "application/pdf", "filename": "report.pdf", "size": 2048 }},
                "{OTHER_IDENTIFIER}": {{ "mediaType": "image/png", "filename": "logo.png", "size": 12 }}
            }}"#
        ),
    )
    .unwrap();

    let store = InMemoryMetadataStore::from_manifest(&manifest).await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(
        store.find(&id(IDENTIFIER)),
        Some(ResourceMetadata::new("application/pdf", "report.pdf", 2048))
    );
}

#[tokio::test]
async fn test_manifest_rejects_unsafe_identifiers() {
    let store = InMemoryMetadataStore::new();
    let result = store.load_manifest(
        r#"{ "../../etc/passwd": { "mediaType": "text/plain", "filename": "p", "size": 1 } }"#,
    );
    assert!(matches!(result, Err(ManifestError::Json(_))));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_manifest_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = InMemoryMetadataStore::from_manifest(&dir.path().join("nope.json")).await;
    assert!(matches!(result, Err(ManifestError::Io(_))));
}
