//! Access pipeline orchestration

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, error, info, warn};

use super::stage::{AccessOutcome, PipelineStage};
use crate::core::error::{AccessError, ErrorCategory, Result};
use crate::delivery::{DeliveryDispatcher, ResponseSink};
use crate::events::{AccessEvent, EventSink, TracingEventSink};
use crate::guard::{
    AnonymousContext, Clock, ContextBindingGuard, ContextFingerprintProvider, ExpirationGuard,
    SystemClock,
};
use crate::locator::ResourceLocator;
use crate::token::{TokenAuthenticator, TokenCodec};

/// Verifies a token and delivers the resource it names
///
/// All collaborators are shared read-only, so one pipeline serves any number
/// of concurrent requests.
#[derive(Clone)]
pub struct AccessPipeline {
    authenticator: Arc<TokenAuthenticator>,
    clock: Arc<dyn Clock>,
    fingerprints: Arc<dyn ContextFingerprintProvider>,
    locator: ResourceLocator,
    dispatcher: DeliveryDispatcher,
    events: Arc<dyn EventSink>,
}

impl AccessPipeline {
    /// Start building a pipeline.
    ///
    /// Defaults: wall clock, anonymous security context, tracing event sink.
    pub fn builder(
        authenticator: TokenAuthenticator,
        locator: ResourceLocator,
        dispatcher: DeliveryDispatcher,
    ) -> AccessPipelineBuilder {
        AccessPipelineBuilder {
            authenticator,
            locator,
            dispatcher,
            clock: Arc::new(SystemClock),
            fingerprints: Arc::new(AnonymousContext),
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn dispatcher(&self) -> &DeliveryDispatcher {
        &self.dispatcher
    }

    /// Handle one request.
    ///
    /// `token` is the raw `__protectedResource` argument; `None` means the
    /// request is not a protected resource request. The first failing stage
    /// ends the request.
    pub async fn handle(&self, token: Option<&str>, headers: &HeaderMap) -> Result<AccessOutcome> {
        let Some(token) = token else {
            return Ok(AccessOutcome::NotInvolved);
        };

        let mut stage = PipelineStage::Authenticating;
        match self.run(token, headers, &mut stage).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                match (&err, err.category()) {
                    (AccessError::ResourceNotFound { reason }, _) => warn!(
                        code = err.code(),
                        kind = err.kind(),
                        stage = %stage,
                        reason = %reason,
                        "Protected resource not found"
                    ),
                    (_, ErrorCategory::Internal) => error!(
                        code = err.code(),
                        kind = err.kind(),
                        stage = %stage,
                        error = %err,
                        "Protected resource delivery failed"
                    ),
                    _ => warn!(
                        code = err.code(),
                        kind = err.kind(),
                        stage = %stage,
                        "Protected resource access denied"
                    ),
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        token: &str,
        headers: &HeaderMap,
        stage: &mut PipelineStage,
    ) -> Result<AccessOutcome> {
        *stage = PipelineStage::Authenticating;
        let encoded = self.authenticator.verify(token)?;

        *stage = PipelineStage::Decoding;
        let payload = TokenCodec::decode(encoded)?;

        *stage = PipelineStage::CheckingExpiration;
        ExpirationGuard::check(&payload, self.clock.now())?;

        *stage = PipelineStage::CheckingContextBinding;
        let fingerprint = self.fingerprints.fingerprint(headers);
        ContextBindingGuard::check(&payload, &fingerprint, self.events.as_ref())?;

        *stage = PipelineStage::Locating;
        let resource = self.locator.resolve(&payload.resource_identifier).await?;
        debug!(identifier = %resource.identifier, "Resolved protected resource");

        *stage = PipelineStage::Dispatching;
        let mut sink = ResponseSink::new(headers.clone());
        self.dispatcher.dispatch(&resource, &mut sink).await?;

        *stage = PipelineStage::Served;
        let strategy = self.dispatcher.strategy_name().unwrap_or_default().to_string();
        info!(
            identifier = %resource.identifier,
            strategy = %strategy,
            status = sink.status().as_u16(),
            "Served protected resource"
        );
        self.events.emit(&AccessEvent::ResourceServed {
            identifier: resource.identifier,
            filename: resource.metadata.filename,
            strategy,
        });

        Ok(AccessOutcome::Served(sink.into_response()))
    }
}

/// Builder for [`AccessPipeline`]
pub struct AccessPipelineBuilder {
    authenticator: TokenAuthenticator,
    locator: ResourceLocator,
    dispatcher: DeliveryDispatcher,
    clock: Arc<dyn Clock>,
    fingerprints: Arc<dyn ContextFingerprintProvider>,
    events: Arc<dyn EventSink>,
}

impl AccessPipelineBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn fingerprints(mut self, fingerprints: Arc<dyn ContextFingerprintProvider>) -> Self {
        self.fingerprints = fingerprints;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn build(self) -> AccessPipeline {
        AccessPipeline {
            authenticator: Arc::new(self.authenticator),
            clock: self.clock,
            fingerprints: self.fingerprints,
            locator: self.locator,
            dispatcher: self.dispatcher,
            events: self.events,
        }
    }
}
