//! Resource location
//!
//! Resolves a content identifier to a stored file:
//! - metadata comes from a [`MetadataLookup`]
//! - the file lives at `root/a/b/c/d/<identifier>`
//! - the resolved file must stay inside the root, links included

mod error;
mod metadata;
mod resolver;
#[cfg(test)]
mod tests;

pub use error::{LocateError, ManifestError, NotFoundReason};
pub use metadata::{InMemoryMetadataStore, MetadataLookup};
pub use resolver::{ResolvedResource, ResourceLocator};
