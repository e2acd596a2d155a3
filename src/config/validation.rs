//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that alias and probe URLs are absolute http(s) URLs
//! - Detect duplicate alias names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{positive_duration, ProxyConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a positive number of seconds, got {value}")]
    InvalidTimeout { field: &'static str, value: f64 },

    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("{field} is not an absolute http(s) URL: {value}")]
    InvalidUrl { field: String, value: String },

    #[error("policy.allowed_domains contains an empty entry")]
    EmptyDomain,

    #[error("cors.allowed_origins must not be empty")]
    NoOrigins,

    #[error("alias name '{0}' is invalid (use letters, digits, '-' or '_')")]
    InvalidAliasName(String),

    #[error("alias '{0}' is defined more than once")]
    DuplicateAlias(String),

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    check_timeout(&mut errors, "upstream.timeout_secs", config.upstream.timeout_secs);
    check_timeout(&mut errors, "health.timeout_secs", config.health.timeout_secs);

    if config.policy.allowed_domains.iter().any(|d| d.trim().is_empty()) {
        errors.push(ValidationError::EmptyDomain);
    }

    if config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::NoOrigins);
    }

    check_url(&mut errors, "health.probe_url".to_string(), &config.health.probe_url);

    let mut seen = HashSet::new();
    for alias in &config.aliases {
        if !is_valid_alias_name(&alias.name) {
            errors.push(ValidationError::InvalidAliasName(alias.name.clone()));
        }
        if !seen.insert(alias.name.as_str()) {
            errors.push(ValidationError::DuplicateAlias(alias.name.clone()));
        }
        check_url(&mut errors, format!("aliases.{}.url", alias.name), &alias.url);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_timeout(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if positive_duration(value).is_none() {
        errors.push(ValidationError::InvalidTimeout { field, value });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: String, value: &str) {
    let ok = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn is_valid_alias_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::AliasConfig;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.upstream.timeout_secs = 0.0;
        config.health.timeout_secs = f64::NAN;
        config.cors.allowed_origins.clear();
        config.policy.allowed_domains.push("  ".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::NoOrigins));
        assert!(errors.contains(&ValidationError::EmptyDomain));
    }

    #[test]
    fn rejects_timeouts_too_large_for_a_duration() {
        let mut config = ProxyConfig::default();
        config.upstream.timeout_secs = 1e20;
        config.health.timeout_secs = f64::INFINITY;

        assert_eq!(
            validate_config(&config),
            Err(vec![
                ValidationError::InvalidTimeout {
                    field: "upstream.timeout_secs",
                    value: 1e20
                },
                ValidationError::InvalidTimeout {
                    field: "health.timeout_secs",
                    value: f64::INFINITY
                },
            ])
        );
    }

    #[test]
    fn rejects_bad_aliases() {
        let mut config = ProxyConfig::default();
        config.aliases.push(AliasConfig {
            name: "daily".into(),
            url: "https://nbkr.kg/XML/daily.xml".into(),
        });
        config.aliases.push(AliasConfig {
            name: "bad/name".into(),
            url: "ftp://nbkr.kg/file".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateAlias("daily".into())));
        assert!(errors.contains(&ValidationError::InvalidAliasName("bad/name".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { field, .. } if field == "aliases.bad/name.url")));
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "not-an-address".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("not-an-address".into())])
        );
    }
}
