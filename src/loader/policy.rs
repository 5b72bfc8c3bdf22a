//! Load policy: host rewriting and protocol selection.
//!
//! # Responsibilities
//! - Apply the configured host rewrite table before any network attempt
//! - Downgrade `https` to plaintext when the HTTPS capability is disabled
//! - Select the transport variant for the attempt's scheme
//!
//! # Design Decisions
//! - Rewrite matching is exact on the host; first matching rule wins
//! - Policy state is read-only after construction and shared across loaders
//! - Unsupported schemes are rejected here, before any adapter invocation

use crate::config::{LoaderConfig, RewriteRule};
use crate::loader::types::LoadError;
use crate::url::ParsedUrl;

/// The scheme an attempt will be dispatched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// Read-only per-process policy applied between redirect hops.
#[derive(Debug, Clone)]
pub struct LoadPolicy {
    rewrite: Vec<RewriteRule>,
    https_enabled: bool,
    max_hops: u32,
}

impl LoadPolicy {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            rewrite: config.rewrite.clone(),
            https_enabled: config.https.enabled,
            max_hops: config.redirect.max_hops,
        }
    }

    pub fn new(rewrite: Vec<RewriteRule>, https_enabled: bool, max_hops: u32) -> Self {
        Self {
            rewrite,
            https_enabled,
            max_hops,
        }
    }

    /// Maximum redirect hops before a load fails with TOO_MANY_REDIRECTS.
    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    /// Rewrite and normalize `parsed` in place, then pick the transport.
    pub fn prepare(&self, parsed: &mut ParsedUrl) -> Result<Scheme, LoadError> {
        self.apply_rewrite(parsed);
        self.apply_downgrade(parsed);

        match parsed.scheme.as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(LoadError::InvalidArgument(format!(
                "unsupported scheme {other:?}"
            ))),
        }
    }

    fn apply_rewrite(&self, parsed: &mut ParsedUrl) {
        if let Some(rule) = self.rewrite.iter().find(|r| r.host == parsed.host) {
            tracing::info!(
                from = %parsed.host,
                to = %rule.to_host,
                "rewrote host"
            );
            parsed.host = rule.to_host.clone();
            parsed.port = rule.to_port.clone();
            parsed.scheme = rule.to_scheme.clone();
        }
    }

    fn apply_downgrade(&self, parsed: &mut ParsedUrl) {
        if self.https_enabled || parsed.scheme != "https" {
            return;
        }
        tracing::warn!(
            host = %parsed.host,
            "HTTPS support is disabled; forcing HTTP instead"
        );
        parsed.scheme = "http".to_string();
        if parsed.port == "443" || parsed.port == "https" || parsed.port.is_empty() {
            parsed.port = "80".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url;

    fn parsed(input: &str) -> ParsedUrl {
        url::parse(input).unwrap()
    }

    fn rule(host: &str, to_host: &str, to_port: &str, to_scheme: &str) -> RewriteRule {
        RewriteRule {
            host: host.into(),
            to_host: to_host.into(),
            to_port: to_port.into(),
            to_scheme: to_scheme.into(),
        }
    }

    #[test]
    fn rewrites_matching_host_before_dispatch() {
        let policy = LoadPolicy::new(
            vec![rule("apps.internal", "apps-origin", "80", "http")],
            true,
            20,
        );
        let mut p = parsed("https://apps.internal/x");
        let scheme = policy.prepare(&mut p).unwrap();
        assert_eq!(scheme, Scheme::Http);
        assert_eq!(p.host, "apps-origin");
        assert_eq!(p.port, "80");
        assert_eq!(p.path, "/x");
    }

    #[test]
    fn non_matching_host_passes_through() {
        let policy = LoadPolicy::new(vec![rule("apps.internal", "x", "80", "http")], true, 20);
        let mut p = parsed("http://example.com:8080/y");
        policy.prepare(&mut p).unwrap();
        assert_eq!(p.host, "example.com");
        assert_eq!(p.port, "8080");
    }

    #[test]
    fn downgrades_https_when_disabled() {
        let policy = LoadPolicy::new(Vec::new(), false, 20);

        // No explicit port: the parser reports the scheme string.
        let mut p = parsed("https://example.com/a");
        assert_eq!(policy.prepare(&mut p).unwrap(), Scheme::Http);
        assert_eq!(p.scheme, "http");
        assert_eq!(p.port, "80");

        let mut p = parsed("https://example.com:443/a");
        policy.prepare(&mut p).unwrap();
        assert_eq!(p.port, "80");

        // A non-default port survives the downgrade.
        let mut p = parsed("https://example.com:8443/a");
        policy.prepare(&mut p).unwrap();
        assert_eq!(p.scheme, "http");
        assert_eq!(p.port, "8443");
    }

    #[test]
    fn https_dispatches_to_tls_when_enabled() {
        let policy = LoadPolicy::new(Vec::new(), true, 20);
        let mut p = parsed("https://example.com/");
        assert_eq!(policy.prepare(&mut p).unwrap(), Scheme::Https);
        assert_eq!(p.port, "https");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let policy = LoadPolicy::new(Vec::new(), true, 20);
        let mut p = parsed("ftp://example.com/file");
        let err = policy.prepare(&mut p).unwrap_err();
        assert_eq!(err.code(), crate::loader::types::ERR_INVALID_ARGUMENT);
    }
}
