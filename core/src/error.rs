//! Error types for the service layer.
//!
//! # Design
//! `ServiceError` is a flat, closed set: every variant marks the stage of a
//! request that failed, and none is retried. Mock-payload failures get their
//! own variants so a misconfigured fixture is never mistaken for a malformed
//! server payload. `HttpError` keeps the raw body so callers can parse
//! server-specific error documents.

use bytes::Bytes;
use thiserror::Error;

/// Failure reported by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Service` and `RequestBuilder` operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The URL could not be parsed or could not carry the endpoint path.
    #[error("the URL is invalid: {url}")]
    InvalidUrl { url: String },

    /// The transport returned something that is not an HTTP response.
    #[error("the server response was invalid")]
    InvalidResponse,

    /// The server answered with a status outside 200..=299.
    #[error("server error with status code: {status}")]
    HttpError { status: u16, body: Bytes },

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    DecodingError(#[source] serde_json::Error),

    /// A request body could not be serialized.
    #[error("failed to encode request: {0}")]
    EncodingError(#[source] serde_json::Error),

    /// The transport failed before a response was received.
    #[error("network error: {0}")]
    NetworkError(#[source] TransportError),

    /// The endpoint's mock payload is not valid UTF-8 text.
    #[error("mock response is invalid")]
    MockResponseInvalid,

    /// The endpoint's mock payload does not match the expected type.
    #[error("failed to decode mock response: {0}")]
    MockResponseDecodingError(#[source] serde_json::Error),

    /// The server answered successfully with an empty body.
    #[error("no data received from server")]
    NoData,
}

impl ServiceError {
    /// HTTP status code, if the failure came from a non-2xx response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code()
            .is_some_and(|code| (400..500).contains(&code))
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code()
            .is_some_and(|code| (500..600).contains(&code))
    }
}

/// Errors raised while loading a `Configuration` from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown environment '{0}', expected 'production' or 'development'")]
    UnknownEnvironment(String),

    #[error("invalid value '{value}' for {variable}, expected a boolean")]
    InvalidFlag { variable: &'static str, value: String },
}
