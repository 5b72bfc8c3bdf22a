//! Redirect-following loop.
//!
//! # Responsibilities
//! - Drive repeated transport attempts for one request
//! - Re-parse and re-apply policy between hops
//! - Enforce the configured maximum hop bound
//!
//! # Design Decisions
//! - Hops are strictly sequential; one attempt is in flight at a time
//! - Only 301 and 302 are followed
//! - Any step failure breaks the loop; no retry of the same attempt

use std::collections::HashMap;

use bytes::Bytes;

use crate::loader::policy::{LoadPolicy, Scheme};
use crate::loader::types::LoadError;
use crate::transport::{Attempt, AttemptRequest, Transport, Transports};
use crate::url;

/// Snapshot of a request, reused unchanged across redirect hops.
#[derive(Debug, Clone)]
pub(crate) struct PreparedRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// The final hop's result and the URL it was fetched from.
#[derive(Debug)]
pub(crate) struct FinalOutcome {
    pub url: String,
    pub attempt: Attempt,
}

/// One delivery attempt sequence: parse, policy, dispatch, follow.
pub(crate) struct RedirectLoop<'a, P, T> {
    transports: &'a Transports<P, T>,
    policy: &'a LoadPolicy,
}

impl<'a, P: Transport, T: Transport> RedirectLoop<'a, P, T> {
    pub fn new(transports: &'a Transports<P, T>, policy: &'a LoadPolicy) -> Self {
        Self { transports, policy }
    }

    pub async fn run(&self, request: &PreparedRequest) -> Result<FinalOutcome, LoadError> {
        let mut current_url = request.url.clone();
        let mut hops = 0u32;

        loop {
            let mut parsed = url::parse(&current_url).map_err(|error| {
                tracing::error!(url = %current_url, %error, "url parse error");
                LoadError::InvalidArgument(format!("bad url {current_url:?}: {error}"))
            })?;

            let scheme = self.policy.prepare(&mut parsed)?;
            tracing::info!(host = %parsed.host, path = %parsed.path, "fetching");

            let attempt_request = AttemptRequest {
                host: parsed.host,
                port: parsed.port,
                path: parsed.path,
                method: request.method.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            };

            let attempt = match scheme {
                Scheme::Http => self.transports.plain.attempt(attempt_request).await?,
                Scheme::Https => self.transports.tls.attempt(attempt_request).await?,
            };

            if attempt.is_redirect() {
                let location = attempt
                    .redirect_location()
                    .ok_or_else(|| {
                        LoadError::InvalidArgument(
                            "redirect response without Location header".to_string(),
                        )
                    })?
                    .to_string();

                hops += 1;
                if hops > self.policy.max_hops() {
                    return Err(LoadError::TooManyRedirects(self.policy.max_hops()));
                }
                tracing::debug!(
                    status = attempt.status,
                    location = %location,
                    hop = hops,
                    "following redirect"
                );
                current_url = location;
                continue;
            }

            return Ok(FinalOutcome {
                url: current_url,
                attempt,
            });
        }
    }
}
