// Response normalization - link and metadata extraction from arbitrary shapes
//
// Providers return wildly different bodies: flat JSON, data/result wrappers,
// HTML-ish plain text. Extraction order:
// 1. Known link-bearing keys at the top level
// 2. Heuristic scan: domain/extension strings, then one level of nesting
// 3. Raw URL sniffing for non-JSON bodies

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::models::{MediaMetadata, RawResponse};

/// Link-bearing keys, highest priority first
const LINK_KEYS: [&str; 7] = [
    "download_link",
    "downloadUrl",
    "download_url",
    "file",
    "file_url",
    "link",
    "url",
];

/// Wrapper keys probed ahead of other nested objects
const WRAPPER_KEYS: [&str; 2] = ["data", "result"];

/// Substrings that mark a string value as a provider-hosted link
const LINK_DOMAINS: [&str; 2] = ["terabox", "dm-d.terabox"];

const TITLE_KEYS: [&str; 4] = ["title", "filename", "name", "file_name"];
const THUMB_KEYS: [&str; 4] = ["thumbnail", "thumb", "preview", "image"];
const DESC_KEYS: [&str; 2] = ["description", "desc"];
const DURATION_KEYS: [&str; 3] = ["duration", "length", "time"];
const MIME_KEYS: [&str; 3] = ["mime_type", "mimeType", "type"];
const SIZE_KEYS: [&str; 4] = ["size", "filesize", "file_size", "length"];

lazy_static! {
    static ref VIDEO_EXT_RE: Regex = Regex::new(r"(?i)\.mp4(\?|$)").unwrap();
    static ref RAW_URL_RE: Regex = Regex::new(r#"https?://[^\s'"]{30,200}"#).unwrap();
}

/// Outcome of normalizing one provider response
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// First usable download-link candidate, if any
    pub link: Option<String>,
    pub metadata: MediaMetadata,
    /// File size in bytes, when a synonym field carries one
    pub size: Option<u64>,
}

/// Extract a download-link candidate and auxiliary metadata from one
/// provider's response body.
pub fn normalize(response: &RawResponse) -> Normalized {
    match response {
        RawResponse::Json(value) => normalize_json(value),
        RawResponse::Text(text) => normalize_text(text),
    }
}

fn normalize_text(text: &str) -> Normalized {
    Normalized {
        link: RAW_URL_RE.find(text).map(|m| m.as_str().to_string()),
        ..Normalized::default()
    }
}

fn normalize_json(value: &Value) -> Normalized {
    let Some(obj) = value.as_object() else {
        // scalars and arrays carry nothing extractable
        return Normalized::default();
    };

    let mut promoted: Vec<&Map<String, Value>> = Vec::new();
    let link = direct_link(obj).or_else(|| heuristic_link(obj, &mut promoted));

    // Metadata synonyms are checked at the top level, then in any object
    // promoted by the heuristic scan, then under the data/result wrappers.
    let mut scopes: Vec<&Map<String, Value>> = vec![obj];
    scopes.extend(promoted.iter().copied());
    for key in WRAPPER_KEYS {
        if let Some(wrapper) = obj.get(key).and_then(Value::as_object) {
            if !scopes.iter().any(|s| std::ptr::eq(*s, wrapper)) {
                scopes.push(wrapper);
            }
        }
    }

    Normalized {
        link,
        metadata: collect_metadata(&scopes),
        size: first_u64(&scopes, &SIZE_KEYS),
    }
}

/// Step 1: fixed-priority lookup of known link keys at the top level
fn direct_link(obj: &Map<String, Value>) -> Option<String> {
    LINK_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(non_empty_str))
        .map(str::to_string)
}

/// Step 2: heuristic shallow scan. Candidates are collected in a documented
/// deterministic order (plain string fields first, then nested objects with
/// the data/result wrappers ahead of the rest; ties broken by key order) so
/// extraction never depends on how a provider happens to order its JSON.
/// The first candidate wins; objects that carried a link key are handed back
/// for metadata merging either way.
fn heuristic_link<'a>(
    obj: &'a Map<String, Value>,
    promoted: &mut Vec<&'a Map<String, Value>>,
) -> Option<String> {
    let mut candidates: Vec<String> = Vec::new();

    for (_, value) in obj {
        if let Some(s) = non_empty_str(value) {
            if looks_like_link(s) {
                candidates.push(s.to_string());
            }
        }
    }

    let mut nested: Vec<(&String, &Map<String, Value>)> = obj
        .iter()
        .filter_map(|(key, value)| value.as_object().map(|o| (key, o)))
        .collect();
    nested.sort_by_key(|entry| {
        WRAPPER_KEYS
            .iter()
            .position(|w| *w == entry.0.as_str())
            .unwrap_or(WRAPPER_KEYS.len())
    });

    for (_, inner) in nested {
        if let Some(link) = LINK_KEYS
            .iter()
            .find_map(|key| inner.get(*key).and_then(non_empty_str))
        {
            candidates.push(link.to_string());
            promoted.push(inner);
        }
        for (_, value) in inner {
            if let Some(s) = non_empty_str(value) {
                if LINK_DOMAINS.iter().any(|d| s.contains(d)) {
                    candidates.push(s.to_string());
                }
            }
        }
    }

    candidates.into_iter().next()
}

fn looks_like_link(s: &str) -> bool {
    LINK_DOMAINS.iter().any(|d| s.contains(d)) || VIDEO_EXT_RE.is_match(s)
}

/// First-non-null-wins merge across the synonym groups
fn collect_metadata(scopes: &[&Map<String, Value>]) -> MediaMetadata {
    MediaMetadata {
        title: first_string(scopes, &TITLE_KEYS),
        description: first_string(scopes, &DESC_KEYS),
        thumbnail: first_string(scopes, &THUMB_KEYS),
        duration: first_u64(scopes, &DURATION_KEYS),
        mime_type: first_string(scopes, &MIME_KEYS),
    }
}

fn first_string(scopes: &[&Map<String, Value>], keys: &[&str]) -> Option<String> {
    for scope in scopes {
        for key in keys {
            if let Some(s) = scope.get(*key).and_then(non_empty_str) {
                return Some(s.to_string());
            }
        }
    }
    None
}

fn first_u64(scopes: &[&Map<String, Value>], keys: &[&str]) -> Option<u64> {
    for scope in scopes {
        for key in keys {
            if let Some(n) = scope.get(*key).and_then(as_u64_like) {
                return Some(n);
            }
        }
    }
    None
}

fn non_empty_str(value: &Value) -> Option<&str> {
    match value.as_str() {
        Some(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Numbers, or numeric strings ("1048576"), which some providers emit
fn as_u64_like(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
