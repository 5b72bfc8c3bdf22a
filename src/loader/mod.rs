//! Loader subsystem: the request-scoped fetch state machine.
//!
//! # Data Flow
//! ```text
//! UrlRequest + ResponseHandle
//!     → url_loader.rs (state machine, exactly-once delivery)
//!     → redirect.rs (per-hop: parse → policy → transport dispatch)
//!     → policy.rs (rewrite table, HTTPS capability, scheme selection)
//!     → Return: one UrlResponse through the handle
//! ```
//!
//! # Design Decisions
//! - One `start` per loader; repeat calls get a defined error, not UB
//! - Response delivery is at most once by construction (handle consumed)
//! - Policy state is shared, read-only configuration

pub mod policy;
pub mod redirect;
pub mod types;
pub mod url_loader;

pub use policy::{LoadPolicy, Scheme};
pub use types::{
    HttpHeader, HttpResponse, LoadError, LoaderStatus, NetworkError, UploadElement, UrlRequest,
    UrlResponse,
};
pub use url_loader::{LoaderState, ResponseHandle, StatusHandle, UrlLoader};
