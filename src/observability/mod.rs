//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; the binding ID correlates events
//!   for one caller connection
//! - Log level comes from config, overridable with RUST_LOG
//! - No metrics endpoint; logging is the only output

pub mod logging;

pub use logging::init_logging;
