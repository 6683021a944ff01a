//! Error types for XRPC client operations

use bytes::Bytes;

use crate::xrpc::{EncodeError, XrpcError};

/// Anything that can go wrong between building a request and decoding its output
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// The request never got a response
    #[error("transport error: {0}")]
    #[diagnostic(code(skythread_common::transport))]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// Request parameters or body could not be serialized
    #[error("{0}")]
    #[diagnostic(code(skythread_common::encode))]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// Non-XRPC error status (5xx from a proxy, 404 from a wrong host, ...)
    #[error("{0}")]
    #[diagnostic(code(skythread_common::http))]
    Http(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),

    /// The service answered with an XRPC error body
    #[error("{0}")]
    #[diagnostic(code(skythread_common::xrpc))]
    Xrpc(
        #[from]
        #[diagnostic_source]
        XrpcError,
    ),
}

/// Failures below the XRPC layer
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Could not reach the host
    #[error("connection failed: {0}")]
    #[diagnostic(help("check network connectivity and the service URL"))]
    Connect(String),

    /// The request timed out
    #[error("request timed out")]
    Timeout,

    /// The URL, headers or token could not form a valid request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else the HTTP client reported
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// A successful response body that did not match the expected output
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// JSON deserialization failed
    #[error("unexpected response body: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// Longest slice of a response body kept in an [`HttpError`] message.
const BODY_PREVIEW: usize = 200;

/// Error status that was not an XRPC error (anything but 400/401)
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct HttpError {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body, if the server sent one
    pub body: Option<Bytes>,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        let text = self
            .body
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        match text.char_indices().nth(BODY_PREVIEW) {
            Some((cut, _)) => write!(f, ": {}...", &text[..cut]),
            None => write!(f, ": {text}"),
        }
    }
}

impl TransportError {
    /// Classify a failure reported by an [`HttpClient`](crate::http_client::HttpClient).
    ///
    /// reqwest errors are sorted into connect, timeout and request-building
    /// failures; anything else is kept as [`TransportError::Other`].
    pub fn from_client<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
        #[cfg(feature = "reqwest-client")]
        let boxed = match boxed.downcast::<reqwest::Error>() {
            Ok(e) => return Self::from(*e),
            Err(other) => other,
        };
        Self::Other(boxed)
    }
}

/// Result type for client operations
pub type XrpcResult<T> = std::result::Result<T, ClientError>;

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

/// Authentication failures reported by the service
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AuthError {
    /// Access token has expired
    #[error("access token expired")]
    #[diagnostic(help("log in again; sessions are not refreshed automatically"))]
    TokenExpired,

    /// Access token is invalid or malformed
    #[error("invalid access token")]
    InvalidToken,

    /// 401 without a readable error body
    #[error("not authenticated")]
    NotAuthenticated,
}
