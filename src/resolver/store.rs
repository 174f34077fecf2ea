// Record store seam and in-memory implementation
//
// Persistence is owned by the embedding application; the engine only needs
// read-modify access to individual records, keyed by opaque id.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{MediaRecord, RecordUpdate};

/// Persistence interface consumed by the backfill scheduler and the link
/// service. Updates are per-record; no cross-record coordination is needed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record by id
    async fn get_record(&self, id: &str) -> Option<MediaRecord>;

    /// Apply a partial update, returning the updated record. `None` when
    /// the id is unknown.
    async fn update_record(&self, id: &str, update: RecordUpdate) -> Option<MediaRecord>;
}

/// HashMap-backed store for embedding, examples and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, MediaRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub async fn insert(&self, record: MediaRecord) {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_record(&self, id: &str) -> Option<MediaRecord> {
        self.records.read().await.get(id).cloned()
    }

    async fn update_record(&self, id: &str, update: RecordUpdate) -> Option<MediaRecord> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id)?;
        apply_update(record, update);
        Some(record.clone())
    }
}

fn apply_update(record: &mut MediaRecord, update: RecordUpdate) {
    if let Some(title) = update.title {
        record.title = Some(title);
    }
    if let Some(description) = update.description {
        record.description = Some(description);
    }
    if let Some(thumbnail) = update.thumbnail {
        record.thumbnail = Some(thumbnail);
    }
    if let Some(duration) = update.duration {
        record.duration = Some(duration);
    }
    if let Some(size) = update.size {
        record.size = Some(size);
    }
    if let Some(kind) = update.kind {
        record.kind = kind;
    }
    if let Some(download_url) = update.download_url {
        record.download_url = Some(download_url);
    }
    if let Some(at) = update.download_expires_at {
        record.download_expires_at = Some(at);
    }
    if let Some(at) = update.download_fetched_at {
        record.download_fetched_at = Some(at);
    }
    if let Some(at) = update.scraped_at {
        record.scraped_at = Some(at);
    }
    if let Some(error) = update.error {
        record.error = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let store = MemoryStore::new();
        store
            .insert(MediaRecord::new("r1", "https://terabox.com/s/abc"))
            .await;

        let updated = store
            .update_record(
                "r1",
                RecordUpdate {
                    title: Some("A file".to_string()),
                    ..RecordUpdate::default()
                },
            )
            .await
            .expect("record exists");

        assert_eq!(updated.title.as_deref(), Some("A file"));
        assert_eq!(updated.source_url, "https://terabox.com/s/abc");
        assert!(updated.thumbnail.is_none());
    }

    #[tokio::test]
    async fn test_error_marker_set_and_cleared() {
        let store = MemoryStore::new();
        store
            .insert(MediaRecord::new("r1", "https://terabox.com/s/abc"))
            .await;

        store
            .update_record(
                "r1",
                RecordUpdate {
                    error: Some(Some("provider down".to_string())),
                    ..RecordUpdate::default()
                },
            )
            .await;
        assert_eq!(
            store.get_record("r1").await.and_then(|r| r.error).as_deref(),
            Some("provider down")
        );

        store
            .update_record(
                "r1",
                RecordUpdate {
                    error: Some(None),
                    ..RecordUpdate::default()
                },
            )
            .await;
        assert!(store.get_record("r1").await.and_then(|r| r.error).is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let store = MemoryStore::new();
        assert!(store
            .update_record("missing", RecordUpdate::default())
            .await
            .is_none());
    }
}
