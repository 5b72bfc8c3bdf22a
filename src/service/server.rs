//! The loader service boundary.
//!
//! # Responsibilities
//! - Accept caller connections and serve each as one binding
//! - Decode JSON-line calls (start / follow_redirect / query_status)
//! - Answer every call with exactly one JSON line
//! - Treat read/write failures as connection errors: close the binding
//!
//! # Design Decisions
//! - One binding owns one loader; the loader runs on the binding's task,
//!   so a multi-hop load never blocks another binding
//! - Wire replies carry an error object or a payload, never both
//! - A reply is never written after the binding has closed

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::LoaderConfig;
use crate::loader::types::{
    HttpHeader, LoaderStatus, NetworkError, UrlRequest, UrlResponse, ERR_INVALID_ARGUMENT,
    ERR_UNEXPECTED,
};
use crate::loader::{LoadPolicy, ResponseHandle, StatusHandle, UrlLoader};
use crate::service::binding::{Binding, BindingTracker};
use crate::service::listener::{BindingPermit, Listener, ListenerError};
use crate::transport::{PlainTransport, TlsTransport, Transports};

/// The URL loader service: accepts bindings, serves loads.
pub struct LoaderServer {
    transports: Arc<Transports<PlainTransport, TlsTransport>>,
    policy: Arc<LoadPolicy>,
    tracker: BindingTracker,
}

impl LoaderServer {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            transports: Arc::new(Transports::from_config(config)),
            policy: Arc::new(LoadPolicy::from_config(config)),
            tracker: BindingTracker::new(),
        }
    }

    /// Serve bindings until a shutdown signal, then drain.
    pub async fn run(self, listener: Listener) -> Result<(), ListenerError> {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, addr, permit) = accepted?;
                    let binding = self.tracker.bind();
                    tracing::debug!(peer = %addr, binding = %binding.id(), "binding opened");
                    let transports = Arc::clone(&self.transports);
                    let policy = Arc::clone(&self.policy);
                    tokio::spawn(serve_binding(stream, binding, permit, transports, policy));
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }

        if tokio::time::timeout(Duration::from_secs(5), self.tracker.drained())
            .await
            .is_err()
        {
            tracing::warn!(active = self.tracker.active(), "shutdown with bindings still open");
        }
        Ok(())
    }

    /// Number of currently open bindings.
    pub fn active_bindings(&self) -> u64 {
        self.tracker.active()
    }
}

/// One call over the wire.
#[derive(Debug, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
enum Call {
    Start { request: WireRequest },
    FollowRedirect,
    QueryStatus,
}

#[derive(Debug, Deserialize)]
struct WireRequest {
    url: String,
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    headers: Vec<HttpHeader>,
    #[serde(default)]
    body: Vec<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl From<WireRequest> for UrlRequest {
    fn from(wire: WireRequest) -> Self {
        let mut request = UrlRequest::new(wire.url, wire.method);
        request.headers = wire.headers;
        for element in wire.body {
            request = request.with_body_bytes(element.into_bytes());
        }
        request
    }
}

/// One reply line. Carries `error` or the payload fields, never both.
#[derive(Debug, Serialize)]
struct WireReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<NetworkError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<Vec<HttpHeader>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl WireReply {
    fn error(error: NetworkError) -> Self {
        Self {
            error: Some(error),
            url: None,
            status: None,
            headers: None,
            body: None,
        }
    }

    fn from_status(status: LoaderStatus) -> Self {
        Self {
            error: status.error,
            url: None,
            status: None,
            headers: None,
            body: None,
        }
    }
}

impl From<UrlResponse> for WireReply {
    fn from(response: UrlResponse) -> Self {
        match response {
            UrlResponse::Error(error) => WireReply::error(error),
            UrlResponse::Success(payload) => Self {
                error: None,
                url: Some(payload.url),
                status: Some(payload.status),
                headers: Some(payload.headers),
                body: Some(String::from_utf8_lossy(&payload.body).into_owned()),
            },
        }
    }
}

async fn serve_binding(
    stream: TcpStream,
    mut binding: Binding,
    permit: BindingPermit,
    transports: Arc<Transports<PlainTransport, TlsTransport>>,
    policy: Arc<LoadPolicy>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut loader = UrlLoader::new(transports, policy);

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::debug!(binding = %binding.id(), %error, "connection error");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Call>(&line) {
            Err(error) => WireReply::error(NetworkError::new(
                ERR_INVALID_ARGUMENT,
                format!("malformed call: {error}"),
            )),
            Ok(Call::Start { request }) => {
                let (handle, rx) = ResponseHandle::channel();
                loader.start(request.into(), handle).await;
                match rx.await {
                    Ok(response) => WireReply::from(response),
                    Err(_) => WireReply::error(NetworkError::new(
                        ERR_UNEXPECTED,
                        "no response produced",
                    )),
                }
            }
            Ok(Call::FollowRedirect) => {
                let (handle, rx) = ResponseHandle::channel();
                loader.follow_redirect(handle);
                match rx.await {
                    Ok(response) => WireReply::from(response),
                    Err(_) => WireReply::error(NetworkError::new(
                        ERR_UNEXPECTED,
                        "no response produced",
                    )),
                }
            }
            Ok(Call::QueryStatus) => {
                let (handle, rx) = StatusHandle::channel();
                loader.query_status(handle);
                match rx.await {
                    Ok(status) => WireReply::from_status(status),
                    Err(_) => WireReply::error(NetworkError::new(
                        ERR_UNEXPECTED,
                        "no status produced",
                    )),
                }
            }
        };

        let mut out = match serde_json::to_vec(&reply) {
            Ok(out) => out,
            Err(error) => {
                tracing::error!(binding = %binding.id(), %error, "reply serialization failed");
                break;
            }
        };
        out.push(b'\n');

        if let Err(error) = write_half.write_all(&out).await {
            tracing::debug!(binding = %binding.id(), %error, "connection error on write");
            break;
        }
    }

    if !loader.responded() {
        tracing::debug!(binding = %binding.id(), "binding closed before any load responded");
    }
    binding.close();
    drop(permit);
}
