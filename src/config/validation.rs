//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (hop bound, timeouts, addresses)
//! - Check the rewrite table for unusable or conflicting rules
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: LoaderConfig → Result<(), Vec<_>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::LoaderConfig;

/// One semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be at least 1")]
    MaxConnections,

    #[error("redirect.max_hops must be at least 1")]
    MaxHops,

    #[error("timeouts.connect_secs must be at least 1")]
    ConnectTimeout,

    #[error("rewrite rule {index}: {field} must not be empty")]
    EmptyRewriteField { index: usize, field: &'static str },

    #[error("rewrite rule {index}: scheme {scheme:?} is not \"http\" or \"https\"")]
    RewriteScheme { index: usize, scheme: String },

    #[error("rewrite rules {first} and {second} both match host {host:?}")]
    DuplicateRewriteHost {
        first: usize,
        second: usize,
        host: String,
    },
}

/// Validate a configuration, reporting every problem found.
pub fn validate_config(config: &LoaderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }
    if config.redirect.max_hops == 0 {
        errors.push(ValidationError::MaxHops);
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ConnectTimeout);
    }

    let mut seen_hosts: HashSet<&str> = HashSet::new();
    for (index, rule) in config.rewrite.iter().enumerate() {
        for (field, value) in [
            ("host", &rule.host),
            ("to_host", &rule.to_host),
            ("to_port", &rule.to_port),
        ] {
            if value.is_empty() {
                errors.push(ValidationError::EmptyRewriteField { index, field });
            }
        }
        if rule.to_scheme != "http" && rule.to_scheme != "https" {
            errors.push(ValidationError::RewriteScheme {
                index,
                scheme: rule.to_scheme.clone(),
            });
        }
        if !rule.host.is_empty() && !seen_hosts.insert(&rule.host) {
            let first = config
                .rewrite
                .iter()
                .position(|r| r.host == rule.host)
                .unwrap_or(0);
            errors.push(ValidationError::DuplicateRewriteHost {
                first,
                second: index,
                host: rule.host.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RewriteRule;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LoaderConfig::default()).is_ok());
    }

    #[test]
    fn reports_all_errors_at_once() {
        let mut config = LoaderConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.redirect.max_hops = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_bad_rewrite_rules() {
        let mut config = LoaderConfig::default();
        config.rewrite.push(RewriteRule {
            host: "a.example".into(),
            to_host: "".into(),
            to_port: "80".into(),
            to_scheme: "ftp".into(),
        });
        config.rewrite.push(RewriteRule {
            host: "a.example".into(),
            to_host: "b".into(),
            to_port: "80".into(),
            to_scheme: "http".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyRewriteField {
            index: 0,
            field: "to_host"
        }));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::RewriteScheme { index: 0, .. }
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::DuplicateRewriteHost { .. }
        )));
    }
}
