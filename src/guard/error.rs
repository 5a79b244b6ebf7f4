//! Guard error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures of the expiration and context binding checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("invalid expiration timestamp: {reason}")]
    InvalidTimestamp { reason: String },

    #[error("security context does not match token binding")]
    ContextMismatch,
}
