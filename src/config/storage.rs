//! Server configuration file
//!
//! JSON file with every field defaulted, plus environment overrides for
//! values that should not live on disk.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::delivery::{DeliveryError, StrategyRegistry, DEFAULT_X_ACCEL_PREFIX};
use crate::guard::{AnonymousContext, ContextFingerprintProvider, SessionCookieFingerprint};
use crate::logging::LoggingConfig;

/// Environment variable replacing `access.secret`
pub const SECRET_ENV: &str = "PROTECTED_RESOURCE_SECRET";

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "PROTECTED_RESOURCE_CONFIG";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid delivery configuration: {0}")]
    Strategy(#[from] DeliveryError),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete server configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Storage root, strategy and signing secret
    #[serde(default)]
    pub access: AccessConfig,

    /// Listener and response policy
    #[serde(default)]
    pub server: ServerSection,

    /// Security context resolution
    #[serde(default)]
    pub security: SecuritySection,

    /// JSON manifest of resource metadata, keyed by identifier
    #[serde(default)]
    pub metadata_manifest: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Access settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    /// Storage root holding the sharded files
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Name of the delivery strategy
    #[serde(default)]
    pub serve_strategy: Option<String>,

    /// HMAC key shared with the token issuer
    #[serde(default = "empty_secret")]
    pub secret: SecretString,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("/data/resources")
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            serve_strategy: None,
            secret: empty_secret(),
        }
    }
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Put the error code and reason in denial bodies
    #[serde(default)]
    pub disclose_denial_reason: bool,

    /// Internal location prefix for `x-accel-redirect`
    #[serde(default = "default_x_accel_prefix")]
    pub x_accel_prefix: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_x_accel_prefix() -> String {
    DEFAULT_X_ACCEL_PREFIX.to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            disclose_denial_reason: false,
            x_accel_prefix: default_x_accel_prefix(),
        }
    }
}

impl ServerSection {
    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Security context settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySection {
    /// Cookie carrying the session; its digest is the context fingerprint
    #[serde(default)]
    pub session_cookie: Option<String>,
}

impl ServerConfig {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("protected-resource")
            .join("config.json")
    }

    /// Load configuration from file and apply environment overrides
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::load_from_file(path).await?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&content)
    }

    /// Parse configuration JSON
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(SECRET_ENV).filter(|s| !s.is_empty()) {
            self.access.secret = SecretString::new(secret);
        }
    }

    /// Built-in strategies for the configured storage root
    pub fn registry(&self) -> StrategyRegistry {
        StrategyRegistry::with_defaults(&self.access.base_path, self.server.x_accel_prefix.clone())
    }

    /// Security context fingerprint source
    pub fn fingerprint_provider(&self) -> Arc<dyn ContextFingerprintProvider> {
        match &self.security.session_cookie {
            Some(cookie) => Arc::new(SessionCookieFingerprint::new(cookie.clone())),
            None => Arc::new(AnonymousContext),
        }
    }

    /// Reject configurations that could not serve a single request
    pub fn validate(&self, registry: &StrategyRegistry) -> ConfigResult<()> {
        if self.access.secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "access.secret is empty (set it in the file or via {SECRET_ENV})"
            )));
        }

        if !self.access.base_path.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "access.basePath {:?} is not a directory",
                self.access.base_path
            )));
        }

        match self.access.serve_strategy.as_deref().map(str::trim) {
            None | Some("") => Err(DeliveryError::Unconfigured.into()),
            Some(name) if !registry.contains(name) => Err(DeliveryError::UnknownStrategy {
                name: name.to_string(),
            }
            .into()),
            Some(_) => Ok(()),
        }
    }
}
