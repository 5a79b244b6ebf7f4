//! Tests for token authentication and decoding

use super::*;
use crate::testing::{self, IDENTIFIER, SECRET};
use secrecy::SecretString;
use serde_json::json;

fn authenticator() -> TokenAuthenticator {
    TokenAuthenticator::new(&testing::secret())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_verify_returns_encoded_payload() {
        let token = testing::issue(IDENTIFIER, None, None);
        let encoded = authenticator().verify(&token).unwrap();
        assert!(token.starts_with(encoded));
        assert!(!encoded.contains(TAG_SEPARATOR));
    }

    #[test]
    fn test_verify_rejects_missing_separator() {
        let token = testing::issue(IDENTIFIER, None, None).replace(TAG_SEPARATOR, "");
        assert_eq!(authenticator().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_empty_segments() {
        let auth = authenticator();
        assert_eq!(auth.verify(""), Err(TokenError::InvalidSignature));
        assert_eq!(auth.verify("."), Err(TokenError::InvalidSignature));
        assert_eq!(auth.verify("abc."), Err(TokenError::InvalidSignature));

        let tag = testing::sign("", SECRET);
        assert_eq!(auth.verify(&format!(".{tag}")), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_non_hex_tag() {
        let token = testing::issue(IDENTIFIER, None, None);
        let (encoded, _) = token.rsplit_once(TAG_SEPARATOR).unwrap();
        let forged = format!("{encoded}.not-hex-at-all");
        assert_eq!(authenticator().verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_truncated_tag() {
        let token = testing::issue(IDENTIFIER, None, None);
        let truncated = &token[..token.len() - 2];
        assert_eq!(authenticator().verify(truncated), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token =
            testing::issue_raw(&json!({ "resourceIdentifier": IDENTIFIER }), "other secret");
        assert_eq!(authenticator().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_payload_swap() {
        // Valid tag from one token glued onto another payload
        let a = testing::issue(IDENTIFIER, None, None);
        let b = testing::issue(testing::OTHER_IDENTIFIER, None, None);
        let (payload_b, _) = b.rsplit_once(TAG_SEPARATOR).unwrap();
        let (_, tag_a) = a.rsplit_once(TAG_SEPARATOR).unwrap();
        let spliced = format!("{payload_b}.{tag_a}");
        assert_eq!(authenticator().verify(&spliced), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_uppercased_tag_letter() {
        let token = testing::issue(IDENTIFIER, None, None);
        let (encoded, tag) = token.rsplit_once(TAG_SEPARATOR).unwrap();
        let position = tag.find(|c: char| c.is_ascii_alphabetic()).unwrap();

        let mut flipped = tag.to_string();
        flipped.replace_range(position..=position, &tag[position..=position].to_ascii_uppercase());
        assert_ne!(flipped, tag);

        let forged = format!("{encoded}.{flipped}");
        assert_eq!(authenticator().verify(&forged), Err(TokenError::InvalidSignature));

        let shouted = format!("{encoded}.{}", tag.to_ascii_uppercase());
        assert_eq!(authenticator().verify(&shouted), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_padded_tag() {
        let token = testing::issue(IDENTIFIER, None, None);
        let padded = format!("{token}00");
        assert_eq!(authenticator().verify(&padded), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_any_secret_length_is_accepted() {
        let long = "k".repeat(200);
        for secret in ["", "k", long.as_str()] {
            let auth = TokenAuthenticator::new(&SecretString::new(secret.to_string()));
            let token = testing::issue_raw(&json!({ "resourceIdentifier": IDENTIFIER }), secret);
            assert!(auth.verify(&token).is_ok(), "secret of {} bytes", secret.len());
        }
    }

    #[test]
    fn test_verify_rejects_oversized_token() {
        let token = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert_eq!(authenticator().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_authenticator_debug_hides_key() {
        let auth = TokenAuthenticator::new(&SecretString::new("super-secret".to_string()));
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_decode_full_payload() {
        let token = testing::issue(IDENTIFIER, Some("2099-01-01T00:00:00Z"), Some("ctx"));
        let encoded = authenticator().verify(&token).unwrap();
        let payload = TokenCodec::decode(encoded).unwrap();

        assert_eq!(payload.resource_identifier.as_str(), IDENTIFIER);
        assert_eq!(payload.expiration_date_time.as_deref(), Some("2099-01-01T00:00:00Z"));
        assert_eq!(payload.security_context_hash.as_deref(), Some("ctx"));
    }

    #[test]
    fn test_decode_optional_fields_absent() {
        let token = testing::issue(IDENTIFIER, None, None);
        let payload = TokenCodec::decode(authenticator().verify(&token).unwrap()).unwrap();
        assert!(payload.expiration_date_time.is_none());
        assert!(payload.security_context_hash.is_none());
    }

    #[test]
    fn test_decode_accepts_padded_base64() {
        use base64::Engine;
        let padded = base64::engine::general_purpose::URL_SAFE
            .encode(json!({ "resourceIdentifier": IDENTIFIER }).to_string());
        let payload = TokenCodec::decode(&padded).unwrap();
        assert_eq!(payload.resource_identifier.as_str(), IDENTIFIER);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let err = TokenCodec::decode("!!!not base64!!!").unwrap_err();
        assert!(matches!(err, TokenError::MalformedPayload { .. }));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        use base64::Engine;
        let encoded = PAYLOAD_ENGINE.encode("{not json");
        let err = TokenCodec::decode(&encoded).unwrap_err();
        assert!(matches!(err, TokenError::MalformedPayload { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_identifier() {
        use base64::Engine;
        let encoded = PAYLOAD_ENGINE.encode(json!({ "expirationDateTime": null }).to_string());
        assert_eq!(
            TokenCodec::decode(&encoded),
            Err(TokenError::MalformedPayload {
                reason: "missing resourceIdentifier".to_string()
            })
        );
    }

    #[test]
    fn test_decode_rejects_malformed_identifier() {
        use base64::Engine;
        for bad in ["../../../etc/passwd", "abcd", "ABCD1234ABCD1234ABCD1234ABCD1234ABCD1234"] {
            let encoded = PAYLOAD_ENGINE.encode(json!({ "resourceIdentifier": bad }).to_string());
            assert!(
                matches!(TokenCodec::decode(&encoded), Err(TokenError::MalformedPayload { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_decode_error_does_not_echo_payload_values() {
        use base64::Engine;
        let payload = json!({ "resourceIdentifier": 12345, "securityContextHash": "leak-me" });
        let encoded = PAYLOAD_ENGINE.encode(payload.to_string());
        let err = TokenCodec::decode(&encoded).unwrap_err();
        assert!(!err.to_string().contains("leak-me"));
        assert!(!err.to_string().contains("12345"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_any_tag_byte_flip_is_rejected(
            position in 0usize..64,
            replacement in prop::sample::select(b"0123456789abcdefABCDEFg. %".to_vec()),
        ) {
            let token = testing::issue(IDENTIFIER, Some("2099-01-01T00:00:00Z"), None);
            let (encoded, tag) = token.rsplit_once(TAG_SEPARATOR).unwrap();
            let mut tag = tag.as_bytes().to_vec();
            prop_assume!(tag[position] != replacement);
            tag[position] = replacement;

            let forged = format!("{encoded}.{}", String::from_utf8(tag).unwrap());
            prop_assert_eq!(authenticator().verify(&forged), Err(TokenError::InvalidSignature));
        }

        #[test]
        fn prop_any_payload_byte_flip_is_rejected(position in 0usize..32, flip in 1u8..=255) {
            let token = testing::issue(IDENTIFIER, None, None);
            let (encoded, tag) = token.rsplit_once(TAG_SEPARATOR).unwrap();
            let mut bytes = encoded.as_bytes().to_vec();
            let index = position % bytes.len();
            bytes[index] ^= flip;
            // Keep the mutated payload valid UTF-8 and free of separators
            let mutated = String::from_utf8_lossy(&bytes).replace(TAG_SEPARATOR, "_");
            prop_assume!(mutated != encoded);

            let forged = format!("{mutated}.{tag}");
            prop_assert_eq!(authenticator().verify(&forged), Err(TokenError::InvalidSignature));
        }

        #[test]
        fn prop_wrong_secret_is_rejected(secret in "[ -~]{1,64}") {
            prop_assume!(secret != SECRET);
            let token = testing::issue_raw(&json!({ "resourceIdentifier": IDENTIFIER }), &secret);
            prop_assert_eq!(authenticator().verify(&token), Err(TokenError::InvalidSignature));
        }

        #[test]
        fn prop_signed_identifiers_round_trip(identifier in "[0-9a-f]{40}") {
            let token = testing::issue(&identifier, None, None);
            let encoded = authenticator().verify(&token).unwrap();
            let payload = TokenCodec::decode(encoded).unwrap();
            prop_assert_eq!(payload.resource_identifier.as_str(), identifier.as_str());
        }
    }
}
