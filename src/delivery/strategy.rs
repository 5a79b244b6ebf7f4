//! Delivery strategies and their registry

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use tokio_util::io::ReaderStream;

use super::error::DeliveryError;
use super::range::RangeStrategy;
use super::sink::ResponseSink;

/// Chunk size for streamed file bodies (64 KiB)
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

pub const READFILE: &str = "readfile";
pub const RANGE: &str = "range";
pub const X_SENDFILE: &str = "x-sendfile";
pub const X_ACCEL_REDIRECT: &str = "x-accel-redirect";

/// Default internal location prefix for `X-Accel-Redirect`
pub const DEFAULT_X_ACCEL_PREFIX: &str = "/protected";

/// Writes a resolved file into the response
///
/// Called after `Content-Type`, `Content-Disposition` and `Content-Length`
/// have been set on the sink. The strategy decides the status code and body.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    async fn serve(&self, path: &Path, sink: &mut ResponseSink) -> Result<(), DeliveryError>;
}

/// Streams the whole file
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadfileStrategy;

impl ReadfileStrategy {
    pub(crate) async fn open_body(path: &Path) -> Result<Body, DeliveryError> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Body::from_stream(ReaderStream::with_capacity(file, STREAM_CHUNK_SIZE)))
    }
}

#[async_trait]
impl DeliveryStrategy for ReadfileStrategy {
    async fn serve(&self, path: &Path, sink: &mut ResponseSink) -> Result<(), DeliveryError> {
        let body = Self::open_body(path).await?;
        sink.set_status(StatusCode::OK);
        sink.set_body(body);
        Ok(())
    }
}

/// Hands the file to a fronting server through `X-Sendfile`
///
/// The body is left empty; the fronting server computes the length itself,
/// so `Content-Length` is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct XSendfileStrategy;

#[async_trait]
impl DeliveryStrategy for XSendfileStrategy {
    async fn serve(&self, path: &Path, sink: &mut ResponseSink) -> Result<(), DeliveryError> {
        let value = path
            .to_str()
            .and_then(|p| HeaderValue::from_str(p).ok())
            .ok_or(DeliveryError::InvalidHeader { name: "X-Sendfile" })?;

        sink.set_header(HeaderName::from_static("x-sendfile"), value);
        sink.remove_header(&header::CONTENT_LENGTH);
        sink.set_status(StatusCode::OK);
        sink.set_body(Body::empty());
        Ok(())
    }
}

/// Hands the file to nginx through `X-Accel-Redirect`
///
/// The redirect target is `<prefix>/<path relative to the storage root>`,
/// which nginx maps onto the root with an `internal` location.
#[derive(Debug, Clone)]
pub struct XAccelRedirectStrategy {
    root: PathBuf,
    prefix: String,
}

impl XAccelRedirectStrategy {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    async fn redirect_target(&self, path: &Path) -> Result<String, DeliveryError> {
        let root = tokio::fs::canonicalize(&self.root).await?;
        let relative = path.strip_prefix(&root).map_err(|_| DeliveryError::OutsideRoot)?;

        let mut target = self.prefix.trim_end_matches('/').to_string();
        for component in relative.components() {
            let part = component
                .as_os_str()
                .to_str()
                .ok_or(DeliveryError::InvalidHeader { name: "X-Accel-Redirect" })?;
            target.push('/');
            target.push_str(part);
        }
        Ok(target)
    }
}

#[async_trait]
impl DeliveryStrategy for XAccelRedirectStrategy {
    async fn serve(&self, path: &Path, sink: &mut ResponseSink) -> Result<(), DeliveryError> {
        let target = self.redirect_target(path).await?;
        let value = HeaderValue::from_str(&target)
            .map_err(|_| DeliveryError::InvalidHeader { name: "X-Accel-Redirect" })?;

        sink.set_header(HeaderName::from_static("x-accel-redirect"), value);
        sink.remove_header(&header::CONTENT_LENGTH);
        sink.set_status(StatusCode::OK);
        sink.set_body(Body::empty());
        Ok(())
    }
}

/// Named delivery strategies available to the dispatcher
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn DeliveryStrategy>>,
}

impl StrategyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in strategies for a storage root
    pub fn with_defaults(root: impl Into<PathBuf>, x_accel_prefix: impl Into<String>) -> Self {
        Self::new()
            .with(READFILE, Arc::new(ReadfileStrategy))
            .with(RANGE, Arc::new(RangeStrategy))
            .with(X_SENDFILE, Arc::new(XSendfileStrategy))
            .with(X_ACCEL_REDIRECT, Arc::new(XAccelRedirectStrategy::new(root, x_accel_prefix)))
    }

    /// Register a strategy, replacing any previous one of the same name
    pub fn register(&mut self, name: impl Into<String>, strategy: Arc<dyn DeliveryStrategy>) {
        self.strategies.insert(name.into(), strategy);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, strategy: Arc<dyn DeliveryStrategy>) -> Self {
        self.register(name, strategy);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DeliveryStrategy>> {
        self.strategies.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
