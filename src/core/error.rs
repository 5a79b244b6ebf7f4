//! Error types for protected resource access
//!
//! Every failure of the access pipeline converges into [`AccessError`], which
//! carries a stable numeric code for diagnostics and maps onto an HTTP status.
//! Messages never contain the secret key, raw token bytes or filesystem paths.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::guard::GuardError;
use crate::locator::{LocateError, NotFoundReason};
use crate::token::TokenError;

/// Result type alias for access pipeline operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Terminal failure of a single access request
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("security context does not match token binding")]
    ContextMismatch,

    #[error("resource not found ({reason})")]
    ResourceNotFound { reason: NotFoundReason },

    #[error("no delivery strategy configured")]
    UnconfiguredStrategy,

    #[error("unknown delivery strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error("delivery failed: {reason}")]
    DeliveryFailed { reason: String },
}

/// Coarse error category, used for logging and response selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Token could not be trusted or no longer grants access (403)
    Denied,
    /// Token is valid but the resource is missing (404)
    NotFound,
    /// Server side misconfiguration or delivery failure (500)
    Internal,
}

impl AccessError {
    /// Stable numeric code for diagnostics
    pub fn code(&self) -> u32 {
        match self {
            AccessError::InvalidSignature => 1001,
            AccessError::MalformedPayload { .. } => 1002,
            AccessError::Expired { .. } => 1003,
            AccessError::ContextMismatch => 1004,
            AccessError::ResourceNotFound { .. } => 1005,
            AccessError::UnconfiguredStrategy => 1006,
            AccessError::UnknownStrategy { .. } => 1007,
            AccessError::DeliveryFailed { .. } => 1008,
        }
    }

    /// Short machine readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AccessError::InvalidSignature => "invalid_signature",
            AccessError::MalformedPayload { .. } => "malformed_payload",
            AccessError::Expired { .. } => "expired",
            AccessError::ContextMismatch => "context_mismatch",
            AccessError::ResourceNotFound { .. } => "resource_not_found",
            AccessError::UnconfiguredStrategy => "unconfigured_strategy",
            AccessError::UnknownStrategy { .. } => "unknown_strategy",
            AccessError::DeliveryFailed { .. } => "delivery_failed",
        }
    }

    /// Error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            AccessError::InvalidSignature
            | AccessError::MalformedPayload { .. }
            | AccessError::Expired { .. }
            | AccessError::ContextMismatch => ErrorCategory::Denied,
            AccessError::ResourceNotFound { .. } => ErrorCategory::NotFound,
            AccessError::UnconfiguredStrategy
            | AccessError::UnknownStrategy { .. }
            | AccessError::DeliveryFailed { .. } => ErrorCategory::Internal,
        }
    }

    /// HTTP status surfaced to the caller
    pub fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Denied => StatusCode::FORBIDDEN,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Unless `disclose` is set, every error of a category gets the same text
    /// so callers cannot tell an expired token from a forged one.
    pub fn public_message(&self, disclose: bool) -> String {
        if disclose {
            return format!("#{} {}", self.code(), self);
        }

        match self.category() {
            ErrorCategory::Denied => "Access denied".to_string(),
            ErrorCategory::NotFound => "Resource not found".to_string(),
            ErrorCategory::Internal => "Internal server error".to_string(),
        }
    }

    /// Build the error response
    pub fn to_response(&self, disclose: bool) -> Response {
        let mut response = (self.status_code(), self.public_message(disclose)).into_response();
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        );
        response
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

impl From<TokenError> for AccessError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => AccessError::InvalidSignature,
            TokenError::MalformedPayload { reason } => AccessError::MalformedPayload { reason },
        }
    }
}

impl From<GuardError> for AccessError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Expired { expired_at } => AccessError::Expired { expired_at },
            GuardError::InvalidTimestamp { reason } => AccessError::MalformedPayload {
                reason: format!("invalid expirationDateTime: {reason}"),
            },
            GuardError::ContextMismatch => AccessError::ContextMismatch,
        }
    }
}

impl From<LocateError> for AccessError {
    fn from(err: LocateError) -> Self {
        AccessError::ResourceNotFound { reason: err.reason() }
    }
}

impl From<DeliveryError> for AccessError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Unconfigured => AccessError::UnconfiguredStrategy,
            DeliveryError::UnknownStrategy { name } => AccessError::UnknownStrategy { name },
            other => AccessError::DeliveryFailed { reason: other.to_string() },
        }
    }
}
