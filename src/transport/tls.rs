//! TLS transport variant.
//!
//! # Responsibilities
//! - Open a TCP connection, then a rustls session verified against the
//!   webpki default trust store
//! - Run exactly one HTTP/1.1 exchange over the session

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::rt::TokioIo;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use super::plain::connect;
use super::{build_request, exchange, resolve_port, Attempt, AttemptRequest, Transport, TransportError};

/// Transport adapter for `https` URLs.
#[derive(Clone)]
pub struct TlsTransport {
    connector: TlsConnector,
    connect_timeout: Duration,
}

impl TlsTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout,
        }
    }
}

impl Transport for TlsTransport {
    fn attempt(
        &self,
        request: AttemptRequest,
    ) -> impl Future<Output = Result<Attempt, TransportError>> + Send {
        let connector = self.connector.clone();
        let connect_timeout = self.connect_timeout;
        async move {
            let port = resolve_port(&request.port)?;
            let outbound = build_request(&request)?;

            let server_name = ServerName::try_from(request.host.clone())
                .map_err(|_| TransportError::ServerName(request.host.clone()))?;

            let addr = format!("{}:{}", request.host, port);
            let stream = connect(&addr, connect_timeout).await?;
            let session = connector
                .connect(server_name, stream)
                .await
                .map_err(|source| TransportError::Tls {
                    host: request.host.clone(),
                    source,
                })?;
            tracing::debug!(%addr, "TLS channel open");

            exchange(TokioIo::new(session), outbound).await
        }
    }
}
