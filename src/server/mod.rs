//! HTTP surface
//!
//! [`protected_resource_filter`] is an axum middleware that can wrap any
//! router. [`ProtectedResourceServer`] runs it standalone with a `/health`
//! route.
//!
//! Responses produced by the filter always carry:
//! - `X-Content-Type-Options: nosniff`
//! - `Cache-Control: private, no-store`

mod app;
mod filter;

pub use app::{ProtectedResourceServer, ServerError};
pub use filter::{protected_resource_filter, FilterState, TokenParams, TOKEN_PARAMETER};
