//! Token payload decoding

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Deserialize;

use super::error::TokenError;
use crate::core::types::ResourceIdentifier;

/// URL-safe base64; padding is optional on decode
pub(crate) const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Wire shape of the payload; every field optional so that a missing
/// identifier is reported as such rather than as a generic JSON error
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    resource_identifier: Option<String>,
    #[serde(default)]
    expiration_date_time: Option<String>,
    #[serde(default)]
    security_context_hash: Option<String>,
}

/// Decoded, authenticated token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    /// Content hash of the stored file
    pub resource_identifier: ResourceIdentifier,
    /// RFC 3339 expiration timestamp, unparsed (absent: never expires)
    pub expiration_date_time: Option<String>,
    /// Security context fingerprint the token is bound to (absent: unbound)
    pub security_context_hash: Option<String>,
}

/// Decoder for the payload segment of a token
pub struct TokenCodec;

impl TokenCodec {
    /// Decode base64url JSON into a [`TokenPayload`]
    pub fn decode(encoded: &str) -> Result<TokenPayload, TokenError> {
        let bytes = PAYLOAD_ENGINE
            .decode(encoded)
            .map_err(|e| TokenError::malformed(format!("base64: {e}")))?;

        // Only the error class and position: serde messages echo input values
        let raw: RawPayload = serde_json::from_slice(&bytes).map_err(|e| {
            TokenError::malformed(format!(
                "json: {:?} error at column {}",
                e.classify(),
                e.column()
            ))
        })?;

        let identifier = raw
            .resource_identifier
            .ok_or_else(|| TokenError::malformed("missing resourceIdentifier"))?;

        let resource_identifier = ResourceIdentifier::parse(&identifier)
            .map_err(|e| TokenError::malformed(format!("resourceIdentifier: {e}")))?;

        Ok(TokenPayload {
            resource_identifier,
            expiration_date_time: raw.expiration_date_time,
            security_context_hash: raw.security_context_hash,
        })
    }
}
