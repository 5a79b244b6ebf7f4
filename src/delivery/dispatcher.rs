//! Strategy selection and response metadata

use std::sync::Arc;

use axum::http::{header, HeaderValue};

use super::error::DeliveryError;
use super::sink::ResponseSink;
use super::strategy::{DeliveryStrategy, StrategyRegistry};
use crate::core::types::ResourceMetadata;
use crate::locator::ResolvedResource;

/// Invokes the configured delivery strategy for a resolved resource
#[derive(Debug, Clone)]
pub struct DeliveryDispatcher {
    strategy_name: Option<String>,
    registry: Arc<StrategyRegistry>,
}

impl DeliveryDispatcher {
    pub fn new(strategy_name: Option<String>, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            strategy_name,
            registry,
        }
    }

    /// Configured strategy name
    pub fn strategy_name(&self) -> Option<&str> {
        self.strategy_name.as_deref()
    }

    /// Resolve the configured strategy from the registry
    pub fn strategy(&self) -> Result<Arc<dyn DeliveryStrategy>, DeliveryError> {
        let name = self
            .strategy_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(DeliveryError::Unconfigured)?;

        self.registry
            .get(name)
            .ok_or_else(|| DeliveryError::UnknownStrategy { name: name.to_string() })
    }

    /// Check the configuration ahead of the first request
    pub fn validate(&self) -> Result<(), DeliveryError> {
        self.strategy().map(|_| ())
    }

    /// Set the metadata headers and let the strategy serve the file.
    ///
    /// The strategy is resolved before anything is written, so a
    /// configuration error leaves the sink untouched.
    pub async fn dispatch(
        &self,
        resource: &ResolvedResource,
        sink: &mut ResponseSink,
    ) -> Result<(), DeliveryError> {
        let strategy = self.strategy()?;
        apply_metadata_headers(&resource.metadata, sink)?;
        strategy.serve(&resource.path, sink).await
    }
}

/// `Content-Type`, `Content-Disposition` and `Content-Length` from metadata
pub fn apply_metadata_headers(
    metadata: &ResourceMetadata,
    sink: &mut ResponseSink,
) -> Result<(), DeliveryError> {
    let content_type = HeaderValue::from_str(&metadata.media_type)
        .map_err(|_| DeliveryError::InvalidHeader { name: "Content-Type" })?;
    let disposition = HeaderValue::from_bytes(content_disposition(&metadata.filename).as_bytes())
        .map_err(|_| DeliveryError::InvalidHeader { name: "Content-Disposition" })?;

    sink.set_header(header::CONTENT_TYPE, content_type);
    sink.set_header(header::CONTENT_DISPOSITION, disposition);
    sink.set_header(header::CONTENT_LENGTH, HeaderValue::from(metadata.size));
    Ok(())
}

/// `attachment;filename="<name>"` with the name as a quoted string
pub fn content_disposition(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars().filter(|c| !c.is_control()) {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    format!("attachment;filename=\"{quoted}\"")
}
