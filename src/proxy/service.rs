//! Forwarding proxy service: validate, check policy, forward.

use std::collections::BTreeMap;
use std::time::Instant;

use url::Url;

use crate::config::ProxyConfig;
use crate::observability::metrics;
use crate::proxy::forwarder::Forwarder;
use crate::proxy::types::{ProxyError, ProxyRequest, ProxyResponse};
use crate::security::DomainPolicy;

/// Stateless request handler shared by every route that proxies.
#[derive(Debug, Clone)]
pub struct ProxyService {
    policy: DomainPolicy,
    forwarder: Forwarder,
    aliases: BTreeMap<String, String>,
}

impl ProxyService {
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            policy: DomainPolicy::from_config(&config.policy),
            forwarder: Forwarder::new(&config.upstream)?,
            aliases: config
                .aliases
                .iter()
                .map(|a| (a.name.clone(), a.url.clone()))
                .collect(),
        })
    }

    pub fn policy(&self) -> &DomainPolicy {
        &self.policy
    }

    pub fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Check the inbound target without touching the network.
    pub fn prepare(
        &self,
        target_url: Option<&str>,
        query: &[(String, String)],
    ) -> Result<ProxyRequest, ProxyError> {
        let raw = target_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ProxyError::MissingParameter("url"))?;

        let url = Url::parse(raw).map_err(|e| ProxyError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(ProxyError::InvalidUrl {
                url: raw.to_string(),
                reason: "only absolute http and https URLs can be proxied".to_string(),
            });
        }

        if !self.policy.permits(&url) {
            return Err(ProxyError::DomainNotAllowed {
                allowed: self.policy.domains().to_vec(),
            });
        }

        Ok(ProxyRequest { target_url: url }.with_query(query))
    }

    /// Validate, apply the allow-list, and forward one GET.
    pub async fn handle_proxy(
        &self,
        target_url: Option<&str>,
        query: &[(String, String)],
    ) -> Result<ProxyResponse, ProxyError> {
        self.dispatch("proxy", target_url, query).await
    }

    /// Forward to the URL bound to `name`.
    pub async fn handle_alias(&self, name: &str) -> Result<ProxyResponse, ProxyError> {
        let url = self
            .aliases
            .get(name)
            .ok_or_else(|| ProxyError::UnknownAlias(name.to_string()))?;
        self.dispatch("alias", Some(url), &[]).await
    }

    /// `endpoint` labels the request metrics.
    async fn dispatch(
        &self,
        endpoint: &'static str,
        target_url: Option<&str>,
        query: &[(String, String)],
    ) -> Result<ProxyResponse, ProxyError> {
        let start = Instant::now();

        let result = match self.prepare(target_url, query) {
            Ok(request) => {
                tracing::info!(endpoint, url = %request.target_url, "Proxying request");
                self.forwarder.forward(&request).await
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(response) => {
                metrics::record_request(endpoint, response.status.as_u16(), start);
            }
            Err(e) => {
                let url = target_url.unwrap_or_default();
                match e {
                    ProxyError::Timeout(_) | ProxyError::Upstream(_) | ProxyError::Internal(_) => {
                        tracing::error!(url = %url, kind = e.kind(), error = %e, "Upstream call failed");
                        metrics::record_upstream_error(e.kind());
                    }
                    _ => {
                        tracing::warn!(url = %url, kind = e.kind(), error = %e, "Rejected proxy request");
                    }
                }
                metrics::record_request(endpoint, e.status_code().as_u16(), start);
            }
        }

        result
    }
}
