//! Security context binding checks

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::error::GuardError;
use crate::events::{AccessEvent, EventSink};
use crate::token::TokenPayload;

/// Fingerprint reported for requests without an authenticated session
pub const ANONYMOUS_FINGERPRINT: &str = "anonymous";

/// Derives the opaque security context fingerprint of a request
///
/// The value must be the same one the issuer embedded as
/// `securityContextHash` when the session was current.
pub trait ContextFingerprintProvider: Send + Sync {
    fn fingerprint(&self, headers: &HeaderMap) -> String;
}

/// Every request shares the anonymous fingerprint
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousContext;

impl ContextFingerprintProvider for AnonymousContext {
    fn fingerprint(&self, _headers: &HeaderMap) -> String {
        ANONYMOUS_FINGERPRINT.to_string()
    }
}

/// Fixed fingerprint, for hosts that resolve the context elsewhere
#[derive(Debug, Clone)]
pub struct StaticFingerprint(pub String);

impl ContextFingerprintProvider for StaticFingerprint {
    fn fingerprint(&self, _headers: &HeaderMap) -> String {
        self.0.clone()
    }
}

/// SHA-256 hex digest of a session cookie's value
#[derive(Debug, Clone)]
pub struct SessionCookieFingerprint {
    cookie_name: String,
}

impl SessionCookieFingerprint {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self { cookie_name: cookie_name.into() }
    }

    /// Fingerprint for a known session value
    pub fn digest(session: &str) -> String {
        hex::encode(Sha256::digest(session.as_bytes()))
    }

    fn session_value<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

impl ContextFingerprintProvider for SessionCookieFingerprint {
    fn fingerprint(&self, headers: &HeaderMap) -> String {
        match self.session_value(headers) {
            Some(session) => Self::digest(session),
            None => ANONYMOUS_FINGERPRINT.to_string(),
        }
    }
}

/// Rejects tokens bound to a different security context
pub struct ContextBindingGuard;

impl ContextBindingGuard {
    /// Compare the payload's `securityContextHash` against `fingerprint`.
    ///
    /// A mismatch is reported to `events` exactly once before failing.
    pub fn check(
        payload: &TokenPayload,
        fingerprint: &str,
        events: &dyn EventSink,
    ) -> Result<(), GuardError> {
        let Some(expected) = payload.security_context_hash.as_deref() else {
            return Ok(());
        };

        if bool::from(expected.as_bytes().ct_eq(fingerprint.as_bytes())) {
            return Ok(());
        }

        events.emit(&AccessEvent::ContextBindingFailed {
            identifier: payload.resource_identifier.clone(),
        });
        Err(GuardError::ContextMismatch)
    }
}
