//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! loader.toml
//!     → loader.rs (read + TOML parse)
//!     → validation.rs (semantic checks, all errors reported)
//!     → LoaderConfig (validated, immutable)
//!     → shared via Arc with every binding task
//! ```
//!
//! # Design Decisions
//! - Config is read-only for the process lifetime; no hot reload
//! - All fields have defaults to allow minimal (or absent) configs
//! - The rewrite table and HTTPS capability are plain data here; the load
//!   policy interprets them

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    HttpsConfig, ListenerConfig, LoaderConfig, ObservabilityConfig, RedirectConfig, RewriteRule,
    TimeoutConfig,
};
