//! Per-request loader state machine.
//!
//! # Responsibilities
//! - Accept one request and drive the redirect loop to completion
//! - Deliver exactly one response per `start`, success or error
//! - Answer `follow_redirect` and `query_status` with their stub results
//!
//! # Design Decisions
//! - `Idle → Loading → Responded`; `start` outside `Idle` answers the new
//!   handle with INVALID_ARGUMENT and leaves the in-flight state alone
//! - The pending handle is taken on delivery, so a second delivery is
//!   impossible rather than merely forbidden
//! - A loader dropped without responding is the caller's protocol
//!   violation; it is logged and tolerated

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::loader::policy::LoadPolicy;
use crate::loader::redirect::{PreparedRequest, RedirectLoop};
use crate::loader::types::{
    HttpResponse, LoadError, LoaderStatus, NetworkError, UrlRequest, UrlResponse,
    ERR_INVALID_ARGUMENT,
};
use crate::transport::{Transport, Transports};

/// One-shot delivery handle for a response. Consumed on send.
pub struct ResponseHandle {
    tx: oneshot::Sender<UrlResponse>,
}

impl ResponseHandle {
    pub fn channel() -> (Self, oneshot::Receiver<UrlResponse>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    fn fulfil(self, response: UrlResponse) {
        if self.tx.send(response).is_err() {
            tracing::debug!("response receiver dropped before delivery");
        }
    }
}

/// One-shot delivery handle for a status snapshot.
pub struct StatusHandle {
    tx: oneshot::Sender<LoaderStatus>,
}

impl StatusHandle {
    pub fn channel() -> (Self, oneshot::Receiver<LoaderStatus>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    fn fulfil(self, status: LoaderStatus) {
        let _ = self.tx.send(status);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Responded,
}

/// The request-scoped loader.
pub struct UrlLoader<P, T> {
    transports: Arc<Transports<P, T>>,
    policy: Arc<LoadPolicy>,
    state: LoaderState,
    pending: Option<ResponseHandle>,
    responded: bool,
}

impl<P: Transport, T: Transport> UrlLoader<P, T> {
    pub fn new(transports: Arc<Transports<P, T>>, policy: Arc<LoadPolicy>) -> Self {
        Self {
            transports,
            policy,
            state: LoaderState::Idle,
            pending: None,
            responded: false,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// True once the single response for this loader has been delivered.
    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Run one load to completion, following redirects, and deliver exactly
    /// one response through `handle`.
    pub async fn start(&mut self, request: UrlRequest, handle: ResponseHandle) {
        if self.state != LoaderState::Idle {
            tracing::warn!(state = ?self.state, "start called on a non-idle loader");
            handle.fulfil(UrlResponse::Error(NetworkError::new(
                ERR_INVALID_ARGUMENT,
                "loader already started",
            )));
            return;
        }

        self.state = LoaderState::Loading;
        self.pending = Some(handle);

        match self.run(request).await {
            Ok(response) => self.send_response(UrlResponse::Success(response)),
            Err(error) => self.send_error(&error),
        }
    }

    /// On-demand redirect following is a stub; the in-loop following inside
    /// `start` is unaffected.
    pub fn follow_redirect(&mut self, handle: ResponseHandle) {
        handle.fulfil(UrlResponse::Error(NetworkError::not_implemented()));
    }

    pub fn query_status(&self, handle: StatusHandle) {
        handle.fulfil(LoaderStatus::not_implemented());
    }

    async fn run(&self, request: UrlRequest) -> Result<HttpResponse, LoadError> {
        let prepared = prepare(request).await?;
        let outcome = RedirectLoop::new(&self.transports, &self.policy)
            .run(&prepared)
            .await?;
        Ok(HttpResponse {
            url: outcome.url,
            status: outcome.attempt.status,
            headers: outcome.attempt.headers,
            body: outcome.attempt.body,
        })
    }

    fn send_error(&mut self, error: &LoadError) {
        tracing::debug!(code = error.code(), %error, "load failed");
        self.send_response(UrlResponse::Error(error.to_network_error()));
    }

    fn send_response(&mut self, response: UrlResponse) {
        let Some(handle) = self.pending.take() else {
            tracing::warn!("response ready but no pending handle; dropping");
            return;
        };
        handle.fulfil(response);
        self.responded = true;
        self.state = LoaderState::Responded;
    }
}

impl<P, T> Drop for UrlLoader<P, T> {
    fn drop(&mut self) {
        if self.state == LoaderState::Loading && !self.responded {
            tracing::debug!("loader torn down without responding");
        }
    }
}

/// Fold headers (last write wins) and drain the upload body into one
/// immutable snapshot before the first attempt.
async fn prepare(request: UrlRequest) -> Result<PreparedRequest, LoadError> {
    let mut headers = HashMap::new();
    for header in request.headers {
        headers.insert(header.name, header.value);
    }

    let mut body = Vec::new();
    for element in request.body {
        element.drain(&mut body).await.map_err(|e| {
            LoadError::InvalidArgument(format!("unreadable upload element: {e}"))
        })?;
    }

    Ok(PreparedRequest {
        url: request.url,
        method: request.method,
        headers,
        body: Bytes::from(body),
    })
}
