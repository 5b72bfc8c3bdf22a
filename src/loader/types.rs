//! Request, response, and error types for the loader.
//!
//! # Responsibilities
//! - Define the request/response shapes crossing the service boundary
//! - Map internal failures to numeric network error codes
//!
//! # Design Decisions
//! - `UrlResponse` is an enum: a response carries a payload or an error,
//!   never both
//! - Error codes follow the network-service convention (negative integers)

use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::transport::TransportError;

/// Transport-level failure, surfaced opaquely.
pub const ERR_FAILED: i32 = -2;
/// Malformed URL, unsupported scheme, or unbuildable outbound request.
pub const ERR_INVALID_ARGUMENT: i32 = -4;
/// Fallback when no specific cause was recorded.
pub const ERR_UNEXPECTED: i32 = -9;
/// Operation is a stub.
pub const ERR_NOT_IMPLEMENTED: i32 = -11;
/// The redirect chain exceeded the configured hop bound.
pub const ERR_TOO_MANY_REDIRECTS: i32 = -310;

/// One request header. Duplicate names are folded last-write-wins before
/// the first attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One element of an upload body, wrapping a readable byte source.
///
/// The loader drains every element into a single buffer when it accepts the
/// request, so sources are read exactly once.
pub struct UploadElement {
    source: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadElement {
    /// Wrap an arbitrary byte source.
    pub fn from_reader(source: Box<dyn AsyncRead + Send + Unpin>) -> Self {
        Self { source }
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: Box::new(Cursor::new(bytes.into())),
        }
    }

    /// Read the source to exhaustion, appending to `buf`.
    pub(crate) async fn drain(mut self, buf: &mut Vec<u8>) -> std::io::Result<()> {
        self.source.read_to_end(buf).await.map(|_| ())
    }
}

impl fmt::Debug for UploadElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UploadElement(..)")
    }
}

/// A single fetch request as accepted over the service boundary.
#[derive(Debug)]
pub struct UrlRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<HttpHeader>,
    pub body: Vec<UploadElement>,
}

impl UrlRequest {
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A GET request with no headers and no body.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, "GET")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(name, value));
        self
    }

    pub fn with_body_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body.push(UploadElement::from_bytes(bytes));
        self
    }
}

/// Error object crossing the service boundary: numeric code plus a
/// human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkError {
    pub code: i32,
    pub description: String,
}

impl NetworkError {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    pub fn not_implemented() -> Self {
        Self::new(ERR_NOT_IMPLEMENTED, "not implemented")
    }
}

/// The successful outcome of a load: the final hop's response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// URL of the attempt that produced this response (after any redirects).
    pub url: String,
    pub status: u16,
    pub headers: Vec<HttpHeader>,
    pub body: Bytes,
}

/// The single response delivered per `start` call.
#[derive(Debug, Clone)]
pub enum UrlResponse {
    Success(HttpResponse),
    Error(NetworkError),
}

impl UrlResponse {
    pub fn error(&self) -> Option<&NetworkError> {
        match self {
            UrlResponse::Error(e) => Some(e),
            UrlResponse::Success(_) => None,
        }
    }

    pub fn success(&self) -> Option<&HttpResponse> {
        match self {
            UrlResponse::Success(r) => Some(r),
            UrlResponse::Error(_) => None,
        }
    }
}

/// Snapshot of loader progress. Currently a stub carrying NOT_IMPLEMENTED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderStatus {
    pub error: Option<NetworkError>,
}

impl LoaderStatus {
    pub fn not_implemented() -> Self {
        Self {
            error: Some(NetworkError::not_implemented()),
        }
    }
}

/// Failures resolved inside the loader. Every variant maps to a numeric
/// code; nothing propagates across the service boundary as an Err.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not implemented")]
    NotImplemented,

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(u32),

    #[error(transparent)]
    Transport(TransportError),

    #[error("unexpected failure")]
    Unexpected,
}

impl LoadError {
    pub fn code(&self) -> i32 {
        match self {
            LoadError::InvalidArgument(_) => ERR_INVALID_ARGUMENT,
            LoadError::NotImplemented => ERR_NOT_IMPLEMENTED,
            LoadError::TooManyRedirects(_) => ERR_TOO_MANY_REDIRECTS,
            LoadError::Transport(_) => ERR_FAILED,
            LoadError::Unexpected => ERR_UNEXPECTED,
        }
    }

    pub fn to_network_error(&self) -> NetworkError {
        NetworkError::new(self.code(), self.to_string())
    }
}

impl From<TransportError> for LoadError {
    /// Adapter build failures are the caller's fault; everything else is a
    /// transport-level failure surfaced opaquely.
    fn from(err: TransportError) -> Self {
        if err.is_build_failure() {
            LoadError::InvalidArgument(err.to_string())
        } else {
            LoadError::Transport(err)
        }
    }
}
