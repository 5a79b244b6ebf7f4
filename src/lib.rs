//! Protected Resource - signed, expiring capability URLs for stored files
//!
//! This crate provides:
//! - HMAC-SHA256 authenticated capability tokens
//! - Expiration and security context binding checks
//! - Traversal-safe lookup of content-addressed files
//! - Pluggable delivery (streamed, ranged, X-Sendfile, X-Accel-Redirect)
//! - An axum middleware and standalone server answering `__protectedResource`

pub mod config;
pub mod core;
pub mod delivery;
pub mod events;
pub mod guard;
pub mod locator;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod token;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use config::{ConfigError, ServerConfig};
pub use core::error::{AccessError, ErrorCategory, Result};
pub use core::types::{ResourceIdentifier, ResourceMetadata};
pub use delivery::{DeliveryDispatcher, DeliveryStrategy, ResponseSink, StrategyRegistry};
pub use events::{AccessEvent, EventSink, TracingEventSink};
pub use guard::{Clock, ContextFingerprintProvider, SystemClock};
pub use locator::{InMemoryMetadataStore, MetadataLookup, ResourceLocator};
pub use pipeline::{AccessOutcome, AccessPipeline};
pub use server::{protected_resource_filter, ProtectedResourceServer};
pub use token::{TokenAuthenticator, TokenPayload};
