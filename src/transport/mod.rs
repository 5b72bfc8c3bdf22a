//! Transport adapter subsystem.
//!
//! # Data Flow
//! ```text
//! AttemptRequest (host, port, path, method, headers, body)
//!     → build_request (outbound http::Request; failures are the caller's)
//!     → plain.rs or tls.rs (connect, one http1 exchange, no pooling)
//!     → Return: Attempt (status, headers, body) or TransportError
//! ```
//!
//! # Design Decisions
//! - One adapter invocation = one connection = one request/response; the
//!   redirect loop owns any repetition
//! - Static dispatch: the loader is generic over the adapter, so tests run
//!   against a scripted stub with no sockets
//! - Port strings resolve numerically or via the well-known service names
//!   "http"/"https" (the parser may hand us the scheme string as the port)

pub mod plain;
pub mod tls;

use std::collections::HashMap;
use std::future::Future;

use bytes::Bytes;
use http::Request;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use thiserror::Error;

use crate::config::LoaderConfig;
use crate::loader::types::HttpHeader;

pub use plain::PlainTransport;
pub use tls::TlsTransport;

/// Errors from one transport attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The outbound request could not be built (bad method or header).
    #[error("invalid outbound request: {0}")]
    Build(#[from] http::Error),

    /// The port string is neither numeric nor a known service name.
    #[error("unresolvable port {0:?}")]
    Port(String),

    /// TCP connect failed or timed out.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// The host is not a valid TLS server name.
    #[error("invalid server name {0:?}")]
    ServerName(String),

    /// TLS handshake failed.
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        host: String,
        source: std::io::Error,
    },

    /// The HTTP exchange itself failed.
    #[error("HTTP exchange failed: {0}")]
    Exchange(#[from] hyper::Error),
}

impl TransportError {
    /// True when the failure is in building the request rather than in
    /// running it; the loader reports these as INVALID_ARGUMENT.
    pub fn is_build_failure(&self) -> bool {
        matches!(self, TransportError::Build(_) | TransportError::Port(_))
    }
}

/// Everything one attempt needs, assembled by the redirect loop.
#[derive(Debug, Clone)]
pub struct AttemptRequest {
    pub host: String,
    pub port: String,
    pub path: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// The completed result of one attempt.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub status: u16,
    pub headers: Vec<HttpHeader>,
    pub body: Bytes,
}

impl Attempt {
    /// True for the redirect statuses the loop follows.
    pub fn is_redirect(&self) -> bool {
        self.status == 301 || self.status == 302
    }

    /// The Location header, if the server sent one.
    pub fn redirect_location(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case("location"))
            .map(|h| h.value.as_str())
    }
}

/// One HTTP attempt, run to completion.
pub trait Transport: Send + Sync {
    fn attempt(
        &self,
        request: AttemptRequest,
    ) -> impl Future<Output = Result<Attempt, TransportError>> + Send;
}

/// The adapter pair the loader dispatches to by scheme.
pub struct Transports<P, T> {
    pub plain: P,
    pub tls: T,
}

impl Transports<PlainTransport, TlsTransport> {
    pub fn from_config(config: &LoaderConfig) -> Self {
        let connect_timeout = config.timeouts.connect();
        Self {
            plain: PlainTransport::new(connect_timeout),
            tls: TlsTransport::new(connect_timeout),
        }
    }
}

/// Resolve a port string to a number. "http" and "https" resolve like
/// service names; anything else must be numeric.
pub fn resolve_port(port: &str) -> Result<u16, TransportError> {
    match port {
        "http" => Ok(80),
        "https" => Ok(443),
        other => other
            .parse()
            .map_err(|_| TransportError::Port(other.to_string())),
    }
}

/// Build the outbound request. Invalid methods and header names surface
/// here, before any socket is opened.
pub(crate) fn build_request(
    request: &AttemptRequest,
) -> Result<Request<Full<Bytes>>, TransportError> {
    let port = resolve_port(&request.port)?;
    let host_header = if port == 80 || port == 443 {
        request.host.clone()
    } else {
        format!("{}:{}", request.host, port)
    };

    let mut builder = Request::builder()
        .method(request.method.as_str())
        .uri(request.path.as_str())
        .header(http::header::HOST, host_header);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(Full::new(request.body.clone()))
        .map_err(TransportError::Build)
}

/// Drive one request/response exchange over an established channel.
pub(crate) async fn exchange<I>(
    io: I,
    outbound: Request<Full<Bytes>>,
) -> Result<Attempt, TransportError>
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(error) = connection.await {
            tracing::debug!(%error, "attempt connection ended with error");
        }
    });

    let response = sender.send_request(outbound).await?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| HttpHeader::new(name.as_str(), v))
        })
        .collect();
    let body = response.into_body().collect().await?.to_bytes();

    Ok(Attempt {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
pub(crate) mod stub {
    //! Scripted adapter for loop and state-machine tests. Records every
    //! invocation; never touches a socket.

    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::{Attempt, AttemptRequest, Transport, TransportError};
    use crate::loader::types::HttpHeader;

    pub(crate) struct StubTransport {
        script: Mutex<VecDeque<Result<Attempt, TransportError>>>,
        calls: Mutex<Vec<AttemptRequest>>,
    }

    impl StubTransport {
        pub fn new(script: Vec<Result<Attempt, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn empty() -> Self {
            Self::new(Vec::new())
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<AttemptRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for StubTransport {
        fn attempt(
            &self,
            request: AttemptRequest,
        ) -> impl Future<Output = Result<Attempt, TransportError>> + Send {
            self.calls.lock().unwrap().push(request);
            let next = self.script.lock().unwrap().pop_front();
            async move {
                next.unwrap_or_else(|| {
                    Err(TransportError::Connect {
                        addr: "stub".to_string(),
                        source: std::io::Error::new(
                            std::io::ErrorKind::Other,
                            "stub script exhausted",
                        ),
                    })
                })
            }
        }
    }

    pub(crate) fn response(status: u16, body: &[u8]) -> Attempt {
        Attempt {
            status,
            headers: Vec::new(),
            body: Bytes::copy_from_slice(body),
        }
    }

    pub(crate) fn redirect_to(status: u16, location: &str) -> Attempt {
        Attempt {
            status,
            headers: vec![HttpHeader::new("Location", location)],
            body: Bytes::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_service_names_and_numbers() {
        assert_eq!(resolve_port("http").unwrap(), 80);
        assert_eq!(resolve_port("https").unwrap(), 443);
        assert_eq!(resolve_port("8080").unwrap(), 8080);
        assert!(matches!(
            resolve_port("gopher"),
            Err(TransportError::Port(_))
        ));
    }

    #[test]
    fn bad_method_is_a_build_failure() {
        let request = AttemptRequest {
            host: "example.com".into(),
            port: "80".into(),
            path: "/".into(),
            method: "NOT A METHOD".into(),
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        let err = build_request(&request).unwrap_err();
        assert!(err.is_build_failure());
    }

    #[test]
    fn nonstandard_port_lands_in_host_header() {
        let request = AttemptRequest {
            host: "example.com".into(),
            port: "8080".into(),
            path: "/x".into(),
            method: "GET".into(),
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        let outbound = build_request(&request).unwrap();
        assert_eq!(
            outbound.headers().get(http::header::HOST).unwrap(),
            "example.com:8080"
        );
    }

    #[test]
    fn redirect_location_lookup_is_case_insensitive() {
        let attempt = Attempt {
            status: 301,
            headers: vec![HttpHeader::new("Location", "http://example.com/next")],
            body: Bytes::new(),
        };
        assert!(attempt.is_redirect());
        assert_eq!(
            attempt.redirect_location(),
            Some("http://example.com/next")
        );
    }
}
