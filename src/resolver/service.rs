// Download-link service - cache-or-fresh link delivery
//
// Callers on the download path go through here: an explicit provider pick
// always forces a fresh resolution, otherwise a stored unexpired link is
// served without touching any provider.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use super::errors::ResolveError;
use super::freshness::is_fresh;
use super::models::{LinkSource, RecordUpdate, ResolutionResult};
use super::orchestrator::Resolver;
use super::store::RecordStore;

/// A download link ready to hand to the caller
#[derive(Debug, Clone, Serialize)]
pub struct DownloadLink {
    pub download_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// Which path produced the link
    pub source: LinkSource,
    /// Provider that produced a fresh link; `None` for cache hits
    pub provider: Option<String>,
}

/// Serves download links for stored records, reusing cached links while
/// they are still fresh
pub struct LinkService<S> {
    resolver: Arc<Resolver>,
    store: Arc<S>,
}

impl<S: RecordStore> LinkService<S> {
    pub fn new(resolver: Arc<Resolver>, store: Arc<S>) -> Self {
        Self { resolver, store }
    }

    /// Produce a usable download link for `record_id`.
    ///
    /// With `provider` set, the cache is bypassed and exactly that provider
    /// is consulted; invalid selections fail before any network traffic.
    /// Without it, a stored link that passes the freshness gate is returned
    /// as-is, and only stale or missing links trigger the fallback loop.
    pub async fn download_link(
        &self,
        record_id: &str,
        provider: Option<&str>,
    ) -> Result<DownloadLink, ResolveError> {
        let record = self
            .store
            .get_record(record_id)
            .await
            .ok_or_else(|| ResolveError::RecordNotFound(record_id.to_string()))?;

        if let Some(selector) = provider {
            return match self
                .resolver
                .resolve_with_provider(&record.source_url, selector)
                .await?
            {
                Some(result) => Ok(self.persist_fresh(record_id, result).await),
                None => Err(ResolveError::NoLink),
            };
        }

        let now = OffsetDateTime::now_utc();
        if is_fresh(&record.cached_link(), now) {
            if let (Some(url), Some(expires_at)) =
                (record.download_url.clone(), record.download_expires_at)
            {
                debug!(record = record_id, "serving cached download link");
                return Ok(DownloadLink {
                    download_url: url,
                    expires_at,
                    source: LinkSource::Cache,
                    provider: None,
                });
            }
        }

        match self.resolver.resolve_any(&record.source_url).await {
            Ok(result) => Ok(self.persist_fresh(record_id, result).await),
            Err(err) => {
                // leave a marker so listings can show why the link is missing
                self.store
                    .update_record(
                        record_id,
                        RecordUpdate {
                            error: Some(Some(err.to_string())),
                            download_fetched_at: Some(now),
                            ..RecordUpdate::default()
                        },
                    )
                    .await;
                Err(err)
            }
        }
    }

    /// Store the freshly resolved link fields on the record
    async fn persist_fresh(&self, record_id: &str, result: ResolutionResult) -> DownloadLink {
        let now = OffsetDateTime::now_utc();
        self.store
            .update_record(
                record_id,
                RecordUpdate {
                    download_url: Some(result.download_url.clone()),
                    download_expires_at: Some(result.expires_at),
                    download_fetched_at: Some(now),
                    size: result.size,
                    error: Some(None),
                    ..RecordUpdate::default()
                },
            )
            .await;

        DownloadLink {
            download_url: result.download_url,
            expires_at: result.expires_at,
            source: LinkSource::Fresh,
            provider: Some(result.provider),
        }
    }
}
