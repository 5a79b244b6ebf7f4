//! Core module
//!
//! This module contains the pieces shared by every stage of the access
//! pipeline:
//! - Error types and their HTTP mapping
//! - Resource identifiers and metadata

pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{AccessError, ErrorCategory, Result};
pub use types::{ResourceIdentifier, ResourceMetadata};
