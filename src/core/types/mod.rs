//! Core data types for protected resource access
//!
//! This module defines the identifiers and metadata shared by the token,
//! locator and delivery layers.

pub mod resource;

// Re-export commonly used types
pub use resource::{IdentifierError, ResourceIdentifier, ResourceMetadata, IDENTIFIER_LENGTH};
