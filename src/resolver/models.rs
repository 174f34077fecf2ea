// Common data models for the resolver

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Title given to records created before their first successful scrape
pub const PLACEHOLDER_TITLE: &str = "Processing...";

/// Which path satisfied a download-link request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    /// Served from a stored, still-fresh link
    Cache,
    /// Freshly resolved through a provider
    Fresh,
}

/// Rough media classification derived from a provider-reported MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Image,
}

impl MediaKind {
    /// Classify from a MIME-ish string; anything that is not an image
    /// counts as video
    pub fn from_mime(mime: &str) -> Self {
        if mime.contains("image") {
            Self::Image
        } else {
            Self::Video
        }
    }
}

/// One provider's response body, as parsed by the orchestrator
#[derive(Debug, Clone)]
pub enum RawResponse {
    /// Body parsed as JSON
    Json(Value),
    /// Body that failed JSON parsing, kept verbatim
    Text(String),
}

impl RawResponse {
    /// JSON view of the body, when it parsed as JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// Best-effort metadata extracted from a provider response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// Duration in seconds, when the provider reports one
    pub duration: Option<u64>,
    pub mime_type: Option<String>,
}

impl MediaMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.thumbnail.is_none()
            && self.duration.is_none()
            && self.mime_type.is_none()
    }
}

/// Outcome of one successful resolution. Built once, never mutated;
/// callers persist or discard it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub download_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// File size in bytes, when a provider reports one
    pub size: Option<u64>,
    pub metadata: MediaMetadata,
    /// Name of the provider that produced the link
    pub provider: String,
}

/// Previously stored (link, expiry) pair, consumed by the freshness gate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedLink {
    pub download_url: Option<String>,
    pub expires_at: Option<OffsetDateTime>,
}

/// A caller-owned media record, keyed by an opaque id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    /// Share URL the record was created from
    pub source_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// Duration in seconds
    pub duration: Option<u64>,
    /// Size in bytes
    pub size: Option<u64>,
    #[serde(default)]
    pub kind: MediaKind,
    pub download_url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub download_expires_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub download_fetched_at: Option<OffsetDateTime>,
    /// When metadata was last scraped (successfully or not)
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scraped_at: Option<OffsetDateTime>,
    /// Last scrape/resolve failure, cleared on success
    pub error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MediaRecord {
    /// Fresh record for a newly added share URL, pending its first scrape
    pub fn new(id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            title: Some(PLACEHOLDER_TITLE.to_string()),
            description: None,
            thumbnail: None,
            duration: None,
            size: None,
            kind: MediaKind::default(),
            download_url: None,
            download_expires_at: None,
            download_fetched_at: None,
            scraped_at: None,
            error: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// The stored link/expiry pair, for the freshness gate
    pub fn cached_link(&self) -> CachedLink {
        CachedLink {
            download_url: self.download_url.clone(),
            expires_at: self.download_expires_at,
        }
    }
}

/// Partial update applied through `RecordStore::update_record`.
///
/// `None` leaves the stored value untouched; for `error`, `Some(None)`
/// clears a previously recorded failure.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<u64>,
    pub size: Option<u64>,
    pub kind: Option<MediaKind>,
    pub download_url: Option<String>,
    pub download_expires_at: Option<OffsetDateTime>,
    pub download_fetched_at: Option<OffsetDateTime>,
    pub scraped_at: Option<OffsetDateTime>,
    pub error: Option<Option<String>>,
}

/// Configuration for the resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// SOCKS5/HTTP proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,
    /// Per-provider request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum concurrent resolutions during a backfill pass
    pub backfill_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_seconds: 30,
            backfill_concurrency: 4,
        }
    }
}

impl ResolverConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_backfill_concurrency(mut self, limit: usize) -> Self {
        self.backfill_concurrency = limit;
        self
    }
}
