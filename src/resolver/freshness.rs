// Cached-link freshness gate

use time::OffsetDateTime;

use super::models::CachedLink;

/// Decide whether a previously stored download link is still usable.
///
/// True iff the link is present and non-empty, an expiry is recorded, and
/// `now` is strictly before it. Callers skip this gate entirely when an
/// explicit provider was requested; that always forces a fresh resolution.
pub fn is_fresh(cached: &CachedLink, now: OffsetDateTime) -> bool {
    cached.download_url.as_deref().map_or(false, |url| !url.is_empty())
        && cached.expires_at.map_or(false, |at| now < at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

    fn cached(url: &str, expires_at: Option<OffsetDateTime>) -> CachedLink {
        CachedLink {
            download_url: Some(url.to_string()),
            expires_at,
        }
    }

    #[test]
    fn test_unexpired_link_is_fresh() {
        assert!(is_fresh(&cached("https://x.example/f", Some(NOW + Duration::seconds(1))), NOW));
    }

    #[test]
    fn test_expired_link_is_stale() {
        assert!(!is_fresh(&cached("https://x.example/f", Some(NOW - Duration::seconds(1))), NOW));
    }

    #[test]
    fn test_expiry_boundary_is_stale() {
        assert!(!is_fresh(&cached("https://x.example/f", Some(NOW)), NOW));
    }

    #[test]
    fn test_empty_url_is_stale() {
        assert!(!is_fresh(&cached("", Some(NOW + Duration::seconds(1000))), NOW));
    }

    #[test]
    fn test_missing_fields_are_stale() {
        assert!(!is_fresh(&CachedLink::default(), NOW));
        assert!(!is_fresh(&cached("https://x.example/f", None), NOW));
    }
}
