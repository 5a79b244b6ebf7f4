//! Payload guards
//!
//! Checks run on an authenticated, decoded payload:
//! - [`ExpirationGuard`]: `expirationDateTime` against the injected [`Clock`]
//! - [`ContextBindingGuard`]: `securityContextHash` against the request's
//!   security context fingerprint

mod binding;
mod error;
mod expiration;

pub use binding::{
    AnonymousContext, ContextBindingGuard, ContextFingerprintProvider, SessionCookieFingerprint,
    StaticFingerprint, ANONYMOUS_FINGERPRINT,
};
pub use error::GuardError;
pub use expiration::{Clock, ExpirationGuard, FixedClock, SystemClock};
