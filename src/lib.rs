//! Single-request HTTP/HTTPS URL loader service.
//!
//! Given a request descriptor (URL, method, headers, body), the loader
//! performs the network exchange, follows 301/302 redirects, and reports
//! exactly one final response (or error) back through an asynchronous
//! handle. It is a building block inside a larger network-service process
//! exposing URL fetch to other processes.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                URL LOADER SERVICE            │
//!                        │                                              │
//!   Caller connection    │  ┌──────────┐   ┌─────────┐   ┌──────────┐  │
//!   ─────────────────────┼─▶│ service  │──▶│ loader  │──▶│   url    │  │
//!   (one binding, JSON   │  │ listener │   │ machine │   │  parser  │  │
//!    line calls)         │  └──────────┘   └────┬────┘   └──────────┘  │
//!                        │                      │ per hop              │
//!                        │                      ▼                      │
//!                        │               ┌────────────┐                │
//!                        │               │   policy   │ rewrite table, │
//!                        │               │            │ HTTPS capability│
//!                        │               └─────┬──────┘                │
//!   One response         │                     ▼                      │
//!   ◀────────────────────┼── ┌──────────────────────────┐             │
//!   per start call       │   │ transport (plain / TLS)  │◀────────────┼──── Origin
//!                        │   └──────────────────────────┘             │     server
//!                        └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod loader;
pub mod transport;
pub mod url;

// Service boundary
pub mod service;

// Cross-cutting concerns
pub mod observability;

pub use config::LoaderConfig;
pub use loader::{
    HttpHeader, HttpResponse, LoadPolicy, LoaderState, NetworkError, ResponseHandle, StatusHandle,
    UploadElement, UrlLoader, UrlRequest, UrlResponse,
};
pub use service::{Listener, LoaderServer};
pub use transport::{PlainTransport, TlsTransport, Transport, Transports};
