//! Plaintext transport variant.
//!
//! # Responsibilities
//! - Open a TCP connection to host:port with a connect timeout
//! - Run exactly one HTTP/1.1 exchange over it

use std::future::Future;
use std::time::Duration;

use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use super::{build_request, exchange, resolve_port, Attempt, AttemptRequest, Transport, TransportError};

/// Transport adapter for `http` URLs.
#[derive(Debug, Clone)]
pub struct PlainTransport {
    connect_timeout: Duration,
}

impl PlainTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Transport for PlainTransport {
    fn attempt(
        &self,
        request: AttemptRequest,
    ) -> impl Future<Output = Result<Attempt, TransportError>> + Send {
        let connect_timeout = self.connect_timeout;
        async move {
            let port = resolve_port(&request.port)?;
            let outbound = build_request(&request)?;

            let addr = format!("{}:{}", request.host, port);
            let stream = connect(&addr, connect_timeout).await?;
            tracing::debug!(%addr, "plaintext channel open");

            exchange(TokioIo::new(stream), outbound).await
        }
    }
}

pub(crate) async fn connect(
    addr: &str,
    connect_timeout: Duration,
) -> Result<TcpStream, TransportError> {
    match tokio::time::timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(TransportError::Connect {
            addr: addr.to_string(),
            source,
        }),
        Err(_) => Err(TransportError::Connect {
            addr: addr.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
        }),
    }
}
