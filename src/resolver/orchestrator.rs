// Resolution orchestrator - provider fallback loop
//
// Providers are tried strictly in registry order; the first usable link
// wins and the remaining providers are never contacted. A failing provider
// is logged and skipped, it can never take the whole resolution down.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};
use url::Url;

use super::errors::ResolveError;
use super::expiry::estimate_expiry;
use super::models::{RawResponse, ResolutionResult, ResolverConfig};
use super::normalize::normalize;
use super::registry::{Encoding, HttpMethod, Provider, ProviderRegistry};

/// Drives the provider registry to turn share URLs into download links
pub struct Resolver {
    registry: ProviderRegistry,
    config: ResolverConfig,
    client: Client,
}

impl Resolver {
    /// Build a resolver over `registry`. The shared HTTP client applies the
    /// configured timeout to every provider attempt and optionally routes
    /// through a SOCKS5/HTTP proxy.
    pub fn new(registry: ProviderRegistry, config: ResolverConfig) -> Result<Self, ResolveError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(ResolveError::ClientBuild)?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(ResolveError::ClientBuild)?;
        Ok(Self {
            registry,
            config,
            client,
        })
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Try every active provider in registry order and return the first
    /// usable result, or `None` once the list is exhausted.
    pub async fn resolve(&self, source_url: &str) -> Option<ResolutionResult> {
        self.resolve_any(source_url).await.ok()
    }

    /// Fallback loop that keeps the terminal failure for callers that need
    /// to record it (backfill markers, service errors).
    pub(crate) async fn resolve_any(
        &self,
        source_url: &str,
    ) -> Result<ResolutionResult, ResolveError> {
        if Url::parse(source_url).is_err() {
            warn!(url = source_url, "refusing to resolve malformed source URL");
            return Err(ResolveError::InvalidUrl(source_url.to_string()));
        }

        for provider in self.registry.active() {
            match self.attempt(provider, source_url).await {
                Ok(Some(result)) => {
                    debug!(provider = %provider.name, "provider produced a link");
                    return Ok(result);
                }
                Ok(None) => {
                    debug!(provider = %provider.name, "no usable link in response");
                }
                Err(err) => {
                    warn!(provider = %provider.name, error = %err, "provider attempt failed");
                }
            }
        }

        Err(ResolveError::NoLink)
    }

    /// Resolve through exactly one provider, without fallback.
    ///
    /// `selector` may be a provider id or a display name. Unknown or
    /// administratively disabled providers are rejected before any network
    /// traffic happens; a valid provider that simply fails yields `Ok(None)`.
    pub async fn resolve_with_provider(
        &self,
        source_url: &str,
        selector: &str,
    ) -> Result<Option<ResolutionResult>, ResolveError> {
        let provider = self
            .registry
            .find(selector)
            .ok_or_else(|| ResolveError::UnknownProvider(selector.to_string()))?;
        if !provider.active {
            return Err(ResolveError::ProviderDisabled(provider.name.clone()));
        }
        if Url::parse(source_url).is_err() {
            return Err(ResolveError::InvalidUrl(source_url.to_string()));
        }

        match self.attempt(provider, source_url).await {
            Ok(found) => Ok(found),
            Err(err) => {
                warn!(provider = %provider.name, error = %err, "provider attempt failed");
                Ok(None)
            }
        }
    }

    /// One provider attempt: build the request from the descriptor, fire
    /// it, and normalize whatever comes back.
    async fn attempt(
        &self,
        provider: &Provider,
        source_url: &str,
    ) -> Result<Option<ResolutionResult>, ResolveError> {
        debug!(provider = %provider.name, "trying provider");

        let response = self
            .send(provider, source_url)
            .await
            .map_err(|source| ResolveError::Network {
                provider: provider.name.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::ProviderStatus {
                provider: provider.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ResolveError::Network {
                provider: provider.name.clone(),
                source,
            })?;

        // JSON first; anything that does not parse is kept as raw text for
        // the normalizer's URL-sniffing fallback.
        let raw = match serde_json::from_str::<Value>(&body) {
            Ok(value) => RawResponse::Json(value),
            Err(_) => RawResponse::Text(body),
        };

        let normalized = normalize(&raw);
        let Some(link) = normalized.link else {
            return Ok(None);
        };

        let expires_at = estimate_expiry(&raw, Some(&link), OffsetDateTime::now_utc());
        Ok(Some(ResolutionResult {
            download_url: link,
            expires_at,
            size: normalized.size,
            metadata: normalized.metadata,
            provider: provider.name.clone(),
        }))
    }

    /// Build the outbound request the way the descriptor says the provider
    /// wants it: JSON body, form body, or query string, plus fixed headers
    /// and payload fields.
    async fn send(&self, provider: &Provider, source_url: &str) -> reqwest::Result<reqwest::Response> {
        let mut request = match provider.method {
            HttpMethod::Get => self.client.get(provider.endpoint.as_str()),
            HttpMethod::Post => self.client.post(provider.endpoint.as_str()),
        };

        for (name, value) in &provider.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let mut fields: Vec<(&str, &str)> = vec![(provider.source_field.as_str(), source_url)];
        for (name, value) in &provider.extra_fields {
            fields.push((name.as_str(), value.as_str()));
        }

        request = match provider.encoding {
            Encoding::Json => {
                let body: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|(name, value)| ((*name).to_string(), Value::String((*value).to_string())))
                    .collect();
                request.json(&body)
            }
            Encoding::Query => request.query(&fields),
            Encoding::Form => request.form(&fields),
        };

        request.send().await
    }
}
