//! URL decomposition subsystem.
//!
//! # Data Flow
//! ```text
//! "scheme://host[:port]/path..."
//!     → parser.rs (split into scheme / host / port / path)
//!     → Return: ParsedUrl or ParseError
//! ```
//!
//! # Design Decisions
//! - Parsing is total: every input yields Ok or Err, never a partial result
//! - No percent-decoding, no IPv6 brackets; query and fragment stay in `path`
//! - When the authority has no `:`, the port is the scheme string itself;
//!   the transport layer resolves well-known scheme names to port numbers

pub mod parser;

pub use parser::{parse, ParseError, ParsedUrl};
