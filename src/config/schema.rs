//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS proxy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Outbound request settings.
    pub upstream: UpstreamConfig,

    /// Target URL allow-list.
    pub policy: PolicyConfig,

    /// Cross-origin headers attached to every response.
    pub cors: CorsConfig,

    /// Upstream health probe.
    pub health: HealthConfig,

    /// Named shortcut routes served under `/nbkr/{name}`.
    pub aliases: Vec<AliasConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            policy: PolicyConfig::default(),
            cors: CorsConfig::default(),
            health: HealthConfig::default(),
            aliases: default_aliases(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. `0` picks an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Outbound request configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Total time allowed for one upstream call, in seconds.
    pub timeout_secs: f64,

    /// Maximum redirects followed before giving up.
    pub max_redirects: usize,

    /// Content-Type used when the upstream omits one.
    pub default_content_type: String,

    /// `Cache-Control: public, max-age=N` on relayed responses. `0` disables.
    pub cache_max_age_secs: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` for outbound calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30.0,
            max_redirects: 10,
            default_content_type: "application/xml".to_string(),
            cache_max_age_secs: 300,
            user_agent: concat!("nbkr-cors-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

impl UpstreamConfig {
    /// Deadline for one upstream call; `None` if `timeout_secs` is out of range.
    pub fn timeout(&self) -> Option<Duration> {
        positive_duration(self.timeout_secs)
    }
}

/// Target URL allow-list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Permitted domains. Empty means any target is accepted.
    pub allowed_domains: Vec<String>,

    /// Match against the URL host instead of the whole URL string.
    pub match_host: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_domains: vec!["nbkr.kg".to_string(), "www.nbkr.kg".to_string()],
            match_host: false,
        }
    }
}

/// CORS response header configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,

    /// Value list for `Access-Control-Allow-Methods`.
    pub allow_methods: Vec<String>,

    /// Value list for `Access-Control-Allow-Headers`.
    pub allow_headers: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_headers: vec!["*".to_string()],
            max_age_secs: 600,
        }
    }
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// URL probed by `/health`.
    pub probe_url: String,

    /// Probe timeout in seconds.
    pub timeout_secs: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_url: "https://nbkr.kg/XML/daily.xml".to_string(),
            timeout_secs: 10.0,
        }
    }
}

impl HealthConfig {
    pub fn timeout(&self) -> Option<Duration> {
        positive_duration(self.timeout_secs)
    }
}

/// `secs` as a [`Duration`] when it is positive and representable.
pub(crate) fn positive_duration(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Named shortcut to a fixed upstream URL.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AliasConfig {
    /// Route segment, e.g. `daily` for `/nbkr/daily`.
    pub name: String,

    /// Upstream URL the alias forwards to.
    pub url: String,
}

impl AliasConfig {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Default NBKR feeds.
pub fn default_aliases() -> Vec<AliasConfig> {
    vec![
        AliasConfig::new("daily", "https://nbkr.kg/XML/daily.xml"),
        AliasConfig::new("weekly", "https://nbkr.kg/XML/weekly.xml"),
        AliasConfig::new("reference", "https://nbkr.kg/XML/CurrenciesReferenceList.xml"),
    ]
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
