//! URL parser.
//!
//! # Responsibilities
//! - Split a URL string into scheme, host, port, and path
//! - Reject URLs with a missing separator or empty components
//!
//! # Design Decisions
//! - The remainder after `host[:port]` is the path verbatim, including any
//!   query string and fragment
//! - A missing path defaults to "/"
//! - A missing port defaults to the scheme string (e.g. "http"), not a
//!   numeric default; `transport::resolve_port` maps it back to a number

use thiserror::Error;

/// A URL decomposed into its four components.
///
/// All fields are non-empty strings when produced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub scheme: String,
    pub host: String,
    pub port: String,
    pub path: String,
}

/// Errors produced by [`parse`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The URL has no "://" separator.
    #[error("missing \"://\" separator")]
    MissingSeparator,

    /// Scheme, host, port, or path resolved to an empty string.
    #[error("empty {0} component")]
    EmptyComponent(&'static str),
}

/// Decompose `url` into scheme, host, port, and path.
///
/// The authority runs from the separator to the first `/`; within it, the
/// first `:` splits host from port. With no `:` the port is the scheme
/// string itself, and with no `/` the path is `"/"`.
pub fn parse(url: &str) -> Result<ParsedUrl, ParseError> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or(ParseError::MissingSeparator)?;

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };

    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, port.to_string()),
        None => (authority, scheme.to_string()),
    };

    if scheme.is_empty() {
        return Err(ParseError::EmptyComponent("scheme"));
    }
    if host.is_empty() {
        return Err(ParseError::EmptyComponent("host"));
    }
    if port.is_empty() {
        return Err(ParseError::EmptyComponent("port"));
    }
    if path.is_empty() {
        return Err(ParseError::EmptyComponent("path"));
    }

    Ok(ParsedUrl {
        scheme: scheme.to_string(),
        host: host.to_string(),
        port,
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_all_four_components() {
        let parsed = parse("http://example.com:8080/a/b").unwrap();
        assert_eq!(parsed.scheme, "http");
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.port, "8080");
        assert_eq!(parsed.path, "/a/b");
    }

    #[test]
    fn port_defaults_to_scheme_string() {
        let parsed = parse("http://example.com/").unwrap();
        assert_eq!(parsed.port, "http");
        assert_eq!(parsed.path, "/");

        let parsed = parse("https://example.com").unwrap();
        assert_eq!(parsed.port, "https");
        assert_eq!(parsed.path, "/");
    }

    #[test]
    fn query_and_fragment_stay_in_path() {
        let parsed = parse("http://example.com/a?b=1#c").unwrap();
        assert_eq!(parsed.path, "/a?b=1#c");
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert_eq!(parse("noscheme"), Err(ParseError::MissingSeparator));
    }

    #[test]
    fn empty_host_is_rejected() {
        assert_eq!(parse("http://"), Err(ParseError::EmptyComponent("host")));
        assert_eq!(parse("http:///path"), Err(ParseError::EmptyComponent("host")));
    }

    #[test]
    fn empty_port_is_rejected() {
        assert_eq!(
            parse("http://example.com:/x"),
            Err(ParseError::EmptyComponent("port"))
        );
    }

    #[test]
    fn empty_scheme_is_rejected() {
        assert_eq!(parse("://host/"), Err(ParseError::EmptyComponent("scheme")));
    }
}
