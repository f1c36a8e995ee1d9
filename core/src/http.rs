//! HTTP requests and responses as plain data, plus the transport seam.
//!
//! # Design
//! `RyuClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. Anything that can turn one into the other
//! implements `Transport`: the bundled ureq agent in production, a recording
//! stub in tests.

use thiserror::Error;

/// HTTP method for a request. The controller API only uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the full URI: configured endpoint followed by the resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Convenience constructor for a header-less response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// The request never produced a response: connection refused, DNS failure,
/// broken body stream and so on.
#[derive(Debug, Clone, Error)]
#[error("{method} {uri} failed: {message}")]
pub struct TransportError {
    pub method: &'static str,
    pub uri: String,
    pub message: String,
}

impl TransportError {
    pub fn new(request: &HttpRequest, message: impl Into<String>) -> Self {
        Self {
            method: request.method.as_str(),
            uri: request.path.clone(),
            message: message.into(),
        }
    }
}

/// Executes one HTTP round-trip.
///
/// Implementations must hand back 4xx/5xx responses as `Ok(HttpResponse)`;
/// status interpretation belongs to the client.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}
