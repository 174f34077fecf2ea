// Background metadata backfill
//
// Listing pages kick this off for records that never got scraped or still
// carry the creation placeholder. It must never take the read path down
// with it: every record is attempted independently and failures end up on
// the record itself, so the same broken item is not retried on every pass.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::models::{MediaKind, MediaRecord, RecordUpdate, PLACEHOLDER_TITLE};
use super::orchestrator::Resolver;
use super::store::RecordStore;

/// Whether a record still lacks the metadata a listing needs
pub fn needs_metadata(record: &MediaRecord) -> bool {
    let placeholder_title = matches!(record.title.as_deref(), None | Some("") | Some(PLACEHOLDER_TITLE));
    placeholder_title || record.thumbnail.is_none() || record.scraped_at.is_none()
}

/// Run one backfill pass over `records`, resolving metadata for every
/// record that needs it. Fan-out is bounded by the resolver's configured
/// backfill concurrency.
pub async fn run<S: RecordStore>(resolver: Arc<Resolver>, store: Arc<S>, records: Vec<MediaRecord>) {
    let limit = resolver.config().backfill_concurrency.max(1);
    stream::iter(records.into_iter().filter(needs_metadata))
        .for_each_concurrent(limit, |record| {
            let resolver = Arc::clone(&resolver);
            let store = Arc::clone(&store);
            async move {
                scrape_record(&resolver, store.as_ref(), &record).await;
            }
        })
        .await;
}

/// Fire-and-forget wrapper for read paths: schedule a pass and return
/// without waiting for it.
pub fn spawn<S: RecordStore + 'static>(
    resolver: Arc<Resolver>,
    store: Arc<S>,
    records: Vec<MediaRecord>,
) -> JoinHandle<()> {
    tokio::spawn(run(resolver, store, records))
}

/// Resolve one record and write the outcome back, success or failure
async fn scrape_record<S: RecordStore>(resolver: &Resolver, store: &S, record: &MediaRecord) {
    let now = OffsetDateTime::now_utc();
    match resolver.resolve_any(&record.source_url).await {
        Ok(result) => {
            let meta = &result.metadata;
            // Never downgrade data the caller already has; only the final
            // "Unknown Title" stands in when neither side knows a name.
            let title = match (&meta.title, record.title.as_deref()) {
                (Some(title), _) => Some(title.clone()),
                (None, None) | (None, Some("")) => Some("Unknown Title".to_string()),
                (None, Some(_)) => None,
            };
            let update = RecordUpdate {
                title,
                description: meta.description.clone(),
                thumbnail: meta.thumbnail.clone(),
                duration: meta.duration,
                size: result.size,
                kind: meta.mime_type.as_deref().map(MediaKind::from_mime),
                error: Some(None),
                scraped_at: Some(now),
                ..RecordUpdate::default()
            };
            if store.update_record(&record.id, update).await.is_some() {
                debug!(record = %record.id, provider = %result.provider, "metadata backfilled");
            } else {
                warn!(record = %record.id, "record vanished during backfill");
            }
        }
        Err(err) => {
            warn!(record = %record.id, error = %err, "metadata backfill failed");
            store
                .update_record(
                    &record.id,
                    RecordUpdate {
                        error: Some(Some(err.to_string())),
                        scraped_at: Some(now),
                        ..RecordUpdate::default()
                    },
                )
                .await;
        }
    }
}
