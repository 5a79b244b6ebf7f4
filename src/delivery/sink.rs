//! Response under construction, handed to delivery strategies

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

/// Collects status, headers and body for a single protected response
///
/// Strategies can read the original request headers (for `Range` and
/// similar) but cannot change them.
#[derive(Debug)]
pub struct ResponseSink {
    request_headers: HeaderMap,
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl ResponseSink {
    pub fn new(request_headers: HeaderMap) -> Self {
        Self {
            request_headers,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// Headers of the incoming request
    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Response headers set so far
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn remove_header(&mut self, name: &HeaderName) {
        self.headers.remove(name);
    }

    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// Finish into an HTTP response
    pub fn into_response(self) -> Response {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
