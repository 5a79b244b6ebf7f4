//! Token error types

use thiserror::Error;

/// Token verification and decoding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Tag missing, malformed, or computed with another secret
    #[error("invalid token signature")]
    InvalidSignature,

    /// Authenticated payload could not be decoded
    #[error("malformed token payload: {reason}")]
    MalformedPayload { reason: String },
}

impl TokenError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TokenError::MalformedPayload { reason: reason.into() }
    }
}
