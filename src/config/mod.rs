//! Configuration Management Module
//!
//! Loads the server configuration from a JSON file:
//! - `access`: storage root, delivery strategy, signing secret
//! - `server`: listener and denial disclosure policy
//! - `security`: session cookie for context binding
//! - `metadataManifest`, `logging`
//!
//! `PROTECTED_RESOURCE_SECRET` overrides the secret from the file.

mod storage;

pub use storage::{
    AccessConfig, ConfigError, ConfigResult, SecuritySection, ServerConfig, ServerSection,
    CONFIG_PATH_ENV, SECRET_ENV,
};
