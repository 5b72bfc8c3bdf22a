//! Service boundary subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, binding limits)
//!     → binding.rs (identity, lifecycle tracking)
//!     → server.rs (JSON-line calls → one UrlLoader per binding)
//!     → One reply line per call
//!
//! Binding lifetime:
//!     Open → serving calls → Closed (caller hangup, IO error, or shutdown)
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - A connection error closes the binding without any guarantee that a
//!   response was delivered first; callers must not assume it was
//! - Each binding is tracked so shutdown can drain

pub mod binding;
pub mod listener;
pub mod server;

pub use binding::{Binding, BindingId, BindingTracker};
pub use listener::{Listener, ListenerError};
pub use server::LoaderServer;
