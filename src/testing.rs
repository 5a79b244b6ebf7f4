//! Shared test fixtures: token issuing, sharded storage setup and log capture

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use hmac::Mac;
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::json;

use crate::core::types::ResourceIdentifier;
use crate::token::{HmacSha256, PAYLOAD_ENGINE, TAG_SEPARATOR};

pub const SECRET: &str = "correct horse battery staple";
pub const IDENTIFIER: &str = "abcd1234abcd1234abcd1234abcd1234abcd1234";
pub const OTHER_IDENTIFIER: &str = "0123456789abcdef0123456789abcdef01234567";

pub fn secret() -> SecretString {
    SecretString::new(SECRET.to_string())
}

/// Hex HMAC tag over an encoded payload
pub fn sign(encoded: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(encoded.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Encode and sign an arbitrary JSON payload
pub fn issue_raw(payload: &serde_json::Value, secret: &str) -> String {
    let encoded = PAYLOAD_ENGINE.encode(payload.to_string());
    format!("{encoded}{TAG_SEPARATOR}{}", sign(&encoded, secret))
}

/// Issue a token with the shared test secret
pub fn issue(identifier: &str, expiration: Option<&str>, context_hash: Option<&str>) -> String {
    let mut payload = json!({ "resourceIdentifier": identifier });
    if let Some(expiration) = expiration {
        payload["expirationDateTime"] = json!(expiration);
    }
    if let Some(context_hash) = context_hash {
        payload["securityContextHash"] = json!(context_hash);
    }
    issue_raw(&payload, SECRET)
}

/// Write a file at its sharded location below `root`
pub fn write_resource(root: &Path, identifier: &str, contents: &[u8]) -> PathBuf {
    let id = ResourceIdentifier::parse(identifier).unwrap();
    let path = root.join(id.shard_path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Collects formatted `tracing` output in memory
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route every level to this capture for the current thread
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
