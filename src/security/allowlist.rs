//! Target domain allow-list.
//!
//! Two matching modes:
//! - substring (default): the full URL text must contain an allowed entry
//! - host: the URL host must equal an entry or be a subdomain of it

use url::Url;

use crate::config::PolicyConfig;

/// Immutable allow-list built once from [`PolicyConfig`].
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    domains: Vec<String>,
    match_host: bool,
}

impl DomainPolicy {
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            domains: config
                .allowed_domains
                .iter()
                .map(|d| d.trim().to_ascii_lowercase())
                .collect(),
            match_host: config.match_host,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Whether `url` may be proxied.
    pub fn permits(&self, url: &Url) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        if self.match_host {
            let Some(host) = url.host_str() else {
                return false;
            };
            let host = host.trim_end_matches('.').to_ascii_lowercase();
            self.domains.iter().any(|domain| {
                host == *domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
        } else {
            let text = url.as_str().to_ascii_lowercase();
            self.domains.iter().any(|domain| text.contains(domain.as_str()))
        }
    }
}
