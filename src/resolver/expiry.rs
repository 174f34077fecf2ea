// Expiry estimation - absolute expiration instant for a resolved link
//
// Providers rarely say outright when a link dies. Precedence:
// explicit absolute field > relative seconds > "Nh" free text > link query
// parameters > 8-hour default. Several providers only leak expiry inside
// the signed download URL, so the query-parameter path is load-bearing.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use url::Url;

use super::models::RawResponse;

/// Query parameters that may carry expiry information, in lookup order
const EXPIRY_PARAMS: [&str; 4] = ["expires", "expires_at", "dstime", "exp"];

/// Epoch values below this are seconds, at or above it milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Shortest digit run accepted as an epoch; anything less is noise
const MIN_EPOCH_DIGITS: usize = 9;

/// Link lifetime assumed when no expiry signal exists anywhere
const DEFAULT_TTL_HOURS: i64 = 8;

lazy_static! {
    static ref HOURS_RE: Regex = Regex::new(r"(?i)(\d+)\s*h").unwrap();
}

/// Estimate when `link` stops working, given the provider response it came
/// from. Pure: identical inputs always produce identical output.
pub fn estimate_expiry(
    raw: &RawResponse,
    link: Option<&str>,
    now: OffsetDateTime,
) -> OffsetDateTime {
    if let Some(obj) = raw.as_json().and_then(Value::as_object) {
        if let Some(at) = obj.get("expires_at").and_then(parse_absolute) {
            return at;
        }
        if let Some(seconds) = obj.get("expires_in").and_then(as_i64_like) {
            return now + Duration::seconds(seconds);
        }
        if let Some(hours) = obj.get("expires").and_then(Value::as_str).and_then(hours_suffix) {
            return now + Duration::hours(hours);
        }
    }

    if let Some(link) = link {
        if let Some(at) = expiry_from_link(link, now) {
            return at;
        }
    }

    now + Duration::hours(DEFAULT_TTL_HOURS)
}

/// Explicit absolute expiry: RFC 3339 string, or an epoch number /
/// digit-string (seconds vs milliseconds decided by the 10^12 threshold)
fn parse_absolute(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::Number(n) => epoch_to_datetime(n.as_i64()?),
        Value::String(s) => {
            if let Ok(at) = OffsetDateTime::parse(s, &Rfc3339) {
                return Some(at);
            }
            if is_epoch_digits(s) {
                return epoch_to_datetime(s.parse().ok()?);
            }
            None
        }
        _ => None,
    }
}

fn epoch_to_datetime(epoch: i64) -> Option<OffsetDateTime> {
    if epoch < EPOCH_MILLIS_THRESHOLD {
        OffsetDateTime::from_unix_timestamp(epoch).ok()
    } else {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch) * 1_000_000).ok()
    }
}

fn is_epoch_digits(s: &str) -> bool {
    s.len() >= MIN_EPOCH_DIGITS && s.bytes().all(|b| b.is_ascii_digit())
}

/// "24h", "24 h", "24H" -> 24
fn hours_suffix(s: &str) -> Option<i64> {
    HOURS_RE.captures(s)?.get(1)?.as_str().parse().ok()
}

fn as_i64_like(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Scan the resolved link's query parameters for a known expiry carrier
fn expiry_from_link(link: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let url = Url::parse(link).ok()?;
    for param in EXPIRY_PARAMS {
        let Some((_, value)) = url.query_pairs().find(|pair| pair.0 == param) else {
            continue;
        };
        if is_epoch_digits(&value) {
            if let Some(at) = value.parse().ok().and_then(epoch_to_datetime) {
                return Some(at);
            }
        }
        if let Some(hours) = hours_suffix(&value) {
            return Some(now + Duration::hours(hours));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

    fn empty() -> RawResponse {
        RawResponse::Json(json!({}))
    }

    #[test]
    fn test_purity() {
        let raw = RawResponse::Json(json!({"expires": "6h"}));
        let link = Some("https://x.example/f?dstime=1700000000");
        assert_eq!(
            estimate_expiry(&raw, link, NOW),
            estimate_expiry(&raw, link, NOW)
        );
    }

    #[test]
    fn test_ten_digit_epoch_is_seconds() {
        let at = estimate_expiry(&empty(), Some("https://x.example/f?expires=1700000000"), NOW);
        assert_eq!(at.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_thirteen_digit_epoch_is_milliseconds() {
        let at = estimate_expiry(
            &empty(),
            Some("https://x.example/f?expires=1700000000000"),
            NOW,
        );
        assert_eq!(at.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_short_digit_param_is_noise() {
        let at = estimate_expiry(&empty(), Some("https://x.example/f?expires=12345678"), NOW);
        assert_eq!(at, NOW + Duration::hours(8));
    }

    #[test]
    fn test_hour_suffix_field() {
        let raw = RawResponse::Json(json!({"expires": "24h"}));
        assert_eq!(estimate_expiry(&raw, None, NOW), NOW + Duration::hours(24));
    }

    #[test]
    fn test_hour_suffix_in_link_param() {
        let at = estimate_expiry(&empty(), Some("https://x.example/f?exp=8h"), NOW);
        assert_eq!(at, NOW + Duration::hours(8));
    }

    #[test]
    fn test_expires_in_seconds() {
        let raw = RawResponse::Json(json!({"expires_in": 3600}));
        assert_eq!(estimate_expiry(&raw, None, NOW), NOW + Duration::hours(1));
    }

    #[test]
    fn test_expires_in_numeric_string() {
        let raw = RawResponse::Json(json!({"expires_in": "600"}));
        assert_eq!(estimate_expiry(&raw, None, NOW), NOW + Duration::minutes(10));
    }

    #[test]
    fn test_expires_at_rfc3339() {
        let raw = RawResponse::Json(json!({"expires_at": "2030-01-01T00:00:00Z"}));
        assert_eq!(
            estimate_expiry(&raw, None, NOW),
            datetime!(2030-01-01 00:00:00 UTC)
        );
    }

    #[test]
    fn test_expires_at_epoch_number() {
        let raw = RawResponse::Json(json!({"expires_at": 1_700_000_000_i64}));
        assert_eq!(estimate_expiry(&raw, None, NOW).unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_response_beats_link() {
        let raw = RawResponse::Json(json!({"expires_in": 60}));
        let at = estimate_expiry(&raw, Some("https://x.example/f?expires=1700000000"), NOW);
        assert_eq!(at, NOW + Duration::seconds(60));
    }

    #[test]
    fn test_dstime_param() {
        let at = estimate_expiry(
            &empty(),
            Some("https://d.terabox.app/file/x?dstime=1893456000&sig=abc"),
            NOW,
        );
        assert_eq!(at.unix_timestamp(), 1_893_456_000);
    }

    #[test]
    fn test_text_response_falls_back_to_link() {
        let raw = RawResponse::Text("<html>ok</html>".to_string());
        let at = estimate_expiry(&raw, Some("https://x.example/f?expires=1700000000"), NOW);
        assert_eq!(at.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_default_fallback() {
        let at = estimate_expiry(&empty(), Some("https://x.example/f"), NOW);
        assert_eq!(at, NOW + Duration::hours(8));
    }
}
