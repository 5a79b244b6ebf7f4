//! Standalone protected resource server

use std::sync::Arc;

use axum::{body::Body, http::Request, middleware, routing::get, Router};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::filter::{protected_resource_filter, FilterState};
use crate::config::ServerSection;
use crate::pipeline::AccessPipeline;

/// Server error type
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Server bind failed on {address}: {reason}")]
    BindFailed { address: String, reason: String },

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

/// HTTP server answering protected resource requests
///
/// Host routes are passed in as an inner router; the filter runs in front of
/// them, so any path accepts the `__protectedResource` argument.
pub struct ProtectedResourceServer {
    state: FilterState,
    settings: ServerSection,
}

impl ProtectedResourceServer {
    pub fn new(pipeline: AccessPipeline, settings: ServerSection) -> Self {
        let state = FilterState::new(Arc::new(pipeline), settings.disclose_denial_reason);
        Self { state, settings }
    }

    pub fn settings(&self) -> &ServerSection {
        &self.settings
    }

    pub fn pipeline(&self) -> &AccessPipeline {
        &self.state.pipeline
    }

    /// Router with only the health check; everything else is a 404 unless a
    /// token is present
    pub fn build_router(&self) -> Router {
        self.wrap(Router::new())
    }

    /// Layer the filter over a host router and add `/health`
    pub fn wrap(&self, inner: Router) -> Router {
        inner
            .route("/health", get(|| async { "OK" }))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                protected_resource_filter,
            ))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
    }

    /// Start the server (runs until ctrl-c)
    pub async fn start(&self) -> Result<(), ServerError> {
        self.serve(self.build_router()).await
    }

    /// Serve a prepared router on the configured address
    pub async fn serve(&self, router: Router) -> Result<(), ServerError> {
        let address = self.settings.bind_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServerError::BindFailed {
                address: address.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            address = %address,
            strategy = self.pipeline().dispatcher().strategy_name().unwrap_or("<none>"),
            root = %self.pipeline().locator().root().display(),
            "Protected resource server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal { reason: e.to_string() })?;

        tracing::info!("Protected resource server stopped");
        Ok(())
    }

    /// Start the server in a background task
    pub fn start_background(self) -> tokio::task::JoinHandle<Result<(), ServerError>> {
        tokio::spawn(async move { self.start().await })
    }
}

/// Request span carrying the path only; the query holds the capability token
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path()
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
