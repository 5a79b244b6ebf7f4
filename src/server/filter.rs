//! Request filter intercepting `__protectedResource` requests

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::pipeline::{AccessOutcome, AccessPipeline};

/// Name of the query argument carrying the token
pub const TOKEN_PARAMETER: &str = "__protectedResource";

/// Query parameters inspected by the filter
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    #[serde(rename = "__protectedResource")]
    pub token: Option<String>,
}

impl TokenParams {
    /// Extract the token from a request URI.
    ///
    /// Only a query without the argument yields no token. A repeated
    /// argument, or one inside a query that does not decode, yields an empty
    /// token so the request is denied instead of reaching the host routes.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let Some(query) = request.uri().query() else {
            return Self::default();
        };

        match Query::<Vec<(String, String)>>::try_from_uri(request.uri()) {
            Ok(Query(pairs)) => {
                let mut values = pairs
                    .into_iter()
                    .filter(|(name, _)| name == TOKEN_PARAMETER)
                    .map(|(_, value)| value);

                match (values.next(), values.next()) {
                    (None, _) => Self::default(),
                    (Some(token), None) => Self { token: Some(token) },
                    (Some(_), Some(_)) => Self::unusable(),
                }
            }
            Err(_) if query.contains(TOKEN_PARAMETER) => Self::unusable(),
            Err(_) => Self::default(),
        }
    }

    fn unusable() -> Self {
        Self {
            token: Some(String::new()),
        }
    }
}

/// State shared by every invocation of the filter
#[derive(Clone)]
pub struct FilterState {
    pub pipeline: Arc<AccessPipeline>,
    /// Include the error code and reason in denial bodies
    pub disclose_denial_reason: bool,
}

impl FilterState {
    pub fn new(pipeline: Arc<AccessPipeline>, disclose_denial_reason: bool) -> Self {
        Self {
            pipeline,
            disclose_denial_reason,
        }
    }
}

/// Middleware serving protected resources ahead of the host's routes
///
/// Requests without the token argument reach the inner router untouched.
/// Requests with it never do: they end with the resource or an error.
pub async fn protected_resource_filter(
    State(state): State<FilterState>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Response {
    let params = TokenParams::from_request(&request);

    let mut response = match state.pipeline.handle(params.token.as_deref(), &headers).await {
        Ok(AccessOutcome::NotInvolved) => return next.run(request).await,
        Ok(AccessOutcome::Served(response)) => response,
        Err(err) => err.to_response(state.disclose_denial_reason),
    };

    let headers = response.headers_mut();

    // Prevent MIME type sniffing
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    // Capability URLs must not end up in shared caches
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, no-store"),
    );

    response
}
