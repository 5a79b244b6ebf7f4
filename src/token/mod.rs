//! Capability tokens
//!
//! A token is `base64url(payloadJSON) "." hex(HMAC-SHA256(secret, base64url(payloadJSON)))`.
//! [`TokenAuthenticator`] checks the tag first; only then does
//! [`TokenCodec`] look inside the payload.

mod authenticator;
mod codec;
mod error;
#[cfg(test)]
mod tests;

pub use authenticator::{TokenAuthenticator, MAX_TOKEN_LENGTH, TAG_HEX_LENGTH, TAG_SEPARATOR};
pub use codec::{TokenCodec, TokenPayload};
pub use error::TokenError;

#[cfg(test)]
pub(crate) use authenticator::HmacSha256;
#[cfg(test)]
pub(crate) use codec::PAYLOAD_ENGINE;
