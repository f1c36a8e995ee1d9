//! Error types for the controller API client.
//!
//! # Design
//! Only two things can go wrong from the caller's point of view: the request
//! never got a response, or a read body could not be decoded. A write that
//! the controller rejects is not an error; it reports `false`. Reads do not
//! look at the status code at all, so a controller error page surfaces as a
//! `Deserialization` failure carrying the raw body.

use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `RyuClient` parsers and `RestClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body is not the JSON the caller asked for.
    #[error("deserialization failed: {message}")]
    Deserialization { message: String, body: String },

    /// A filter or payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Returns `true` if the failure happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The undecodable body, when there is one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Deserialization { body, .. } => Some(body),
            _ => None,
        }
    }
}
