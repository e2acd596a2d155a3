//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{LogFormat, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the runtime configuration: defaults, then the optional TOML file,
/// then process environment overrides. The result is validated.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => read_file(path)?,
        None => ProxyConfig::default(),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

fn read_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Apply `HOST`, `PORT`, `TIMEOUT`, `ALLOWED_ORIGINS`, `ALLOWED_DOMAINS`,
/// `LOG_LEVEL`, `LOG_FORMAT`, `METRICS_ENABLED` and `METRICS_ADDRESS`.
///
/// `lookup` abstracts the environment so callers can supply their own source.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }

    if let Some(port) = lookup("PORT") {
        config.listener.port = parse_env("PORT", &port)?;
    }

    if let Some(timeout) = lookup("TIMEOUT") {
        config.upstream.timeout_secs = parse_env("TIMEOUT", &timeout)?;
    }

    if let Some(origins) = lookup("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = split_list(&origins);
    }

    if let Some(domains) = lookup("ALLOWED_DOMAINS") {
        config.policy.allowed_domains = split_list(&domains);
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format =
            format
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::Env {
                    key: "LOG_FORMAT",
                    value: format.clone(),
                    reason,
                })?;
    }

    if let Some(enabled) = lookup("METRICS_ENABLED") {
        config.observability.metrics_enabled =
            matches!(enabled.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }

    if let Some(addr) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = addr;
    }

    Ok(config)
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Comma-separated list, entries trimmed, blanks dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        let config = apply_env_overrides(ProxyConfig::default(), env(&[])).unwrap();
        assert_eq!(config, ProxyConfig::default());
        assert_eq!(config.listener.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.upstream.timeout_secs, 30.0);
        assert_eq!(config.cors.allowed_origins, vec!["*"]);
    }

    #[test]
    fn environment_overrides_listener_and_policy() {
        let config = apply_env_overrides(
            ProxyConfig::default(),
            env(&[
                ("HOST", "127.0.0.1"),
                ("PORT", "9000"),
                ("TIMEOUT", "12.5"),
                ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
                ("ALLOWED_DOMAINS", ""),
                ("LOG_FORMAT", "json"),
                ("METRICS_ENABLED", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.upstream.timeout_secs, 12.5);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.policy.allowed_domains.is_empty());
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn bad_port_is_reported() {
        let err = apply_env_overrides(ProxyConfig::default(), env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "PORT", .. }));
    }

    #[test]
    fn huge_timeout_fails_validation() {
        let config = apply_env_overrides(ProxyConfig::default(), env(&[("TIMEOUT", "1e20")]))
            .unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidTimeout { field: "upstream.timeout_secs", .. }]
        ));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = parse_config(
            r#"
            [listener]
            port = 8080

            [policy]
            allowed_domains = ["example.org"]
            match_host = true

            [[aliases]]
            name = "rates"
            url = "https://example.org/rates.xml"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port, 8080);
        assert!(config.policy.match_host);
        assert_eq!(config.aliases.len(), 1);
        assert_eq!(config.upstream.cache_max_age_secs, 300);
    }

    #[test]
    fn example_config_is_valid() {
        let config = parse_config(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(validate_config(&config), Ok(()));
        assert_eq!(config, ProxyConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
