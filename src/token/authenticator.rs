//! HMAC authentication of raw tokens

use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::error::TokenError;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Separator between the encoded payload and the hex tag
pub const TAG_SEPARATOR: char = '.';

/// Upper bound on accepted token length, checked before any decoding
pub const MAX_TOKEN_LENGTH: usize = 8 * 1024;

/// Length of the hex encoded HMAC-SHA256 tag
pub const TAG_HEX_LENGTH: usize = 64;

/// Verifies `payload.tag` tokens against a shared secret
///
/// The tag is `hex(HMAC-SHA256(secret, payload))` where `payload` is the
/// encoded segment exactly as transmitted.
#[derive(Clone)]
pub struct TokenAuthenticator {
    keyed: HmacSha256,
}

impl TokenAuthenticator {
    /// Create an authenticator keyed with the shared secret
    ///
    /// HMAC pads or hashes keys to its block size, so keying cannot fail for
    /// any secret length.
    pub fn new(secret: &SecretString) -> Self {
        let keyed = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .expect("HMAC accepts keys of any length");
        Self { keyed }
    }

    /// Verify the tag and return the still-encoded payload segment.
    ///
    /// The tag must be exactly [`TAG_HEX_LENGTH`] lowercase hex characters.
    /// Nothing in the payload is looked at before this succeeds. The tag
    /// comparison is constant time.
    pub fn verify<'a>(&self, raw_token: &'a str) -> Result<&'a str, TokenError> {
        if raw_token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::InvalidSignature);
        }

        let (encoded, tag_hex) = raw_token
            .rsplit_once(TAG_SEPARATOR)
            .ok_or(TokenError::InvalidSignature)?;

        if encoded.is_empty() || tag_hex.is_empty() {
            return Err(TokenError::InvalidSignature);
        }

        // Exactly one encoding per tag: uppercase digits are a different token
        if tag_hex.len() != TAG_HEX_LENGTH
            || !tag_hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(TokenError::InvalidSignature);
        }

        let tag = hex::decode(tag_hex).map_err(|_| TokenError::InvalidSignature)?;

        let mut mac = self.keyed.clone();
        mac.update(encoded.as_bytes());
        mac.verify_slice(&tag).map_err(|_| TokenError::InvalidSignature)?;

        Ok(encoded)
    }
}

impl fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("algorithm", &"HMAC-SHA256")
            .finish_non_exhaustive()
    }
}
