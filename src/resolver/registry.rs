// Provider catalog - ordered descriptors for third-party extraction APIs
//
// Order matters: resolve() walks the list top to bottom and stops at the
// first provider that yields a usable link. The catalog is fixed at
// construction; enabling or disabling a provider is a deployment change.

use serde::{Deserialize, Serialize};

/// HTTP method used to reach a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// How the share URL is attached to the outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// JSON body `{"<field>": "<url>"}`
    Json,
    /// Query string `?<field>=<url>`
    Query,
    /// Form-encoded body `<field>=<url>`
    Form,
}

/// Descriptor for one extraction provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Unique identifier (kebab-case)
    pub name: String,
    /// Human-facing name shown in provider pickers
    pub display_name: String,
    /// Upstream endpoint URL
    pub endpoint: String,
    pub method: HttpMethod,
    pub encoding: Encoding,
    /// Request field that carries the share URL
    pub source_field: String,
    /// Fixed headers the provider expects (referers, api keys)
    pub headers: Vec<(String, String)>,
    /// Fixed payload fields sent alongside the share URL
    pub extra_fields: Vec<(String, String)>,
    /// Administrative enable/disable switch
    pub active: bool,
}

impl Provider {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        endpoint: impl Into<String>,
        method: HttpMethod,
        encoding: Encoding,
        source_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            endpoint: endpoint.into(),
            method,
            encoding,
            source_field: source_field.into(),
            headers: Vec::new(),
            extra_fields: Vec::new(),
            active: true,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_fields.push((name.into(), value.into()));
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Immutable, ordered provider catalog
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Look up a provider by its unique id
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Look up a provider by id or by display name. Display names are
    /// matched through the same lowercased, dash-joined form the UI sends
    /// ("Tera Downloader CC" -> "tera-downloader-cc").
    pub fn find(&self, selector: &str) -> Option<&Provider> {
        self.get(selector)
            .or_else(|| self.providers.iter().find(|p| slug(&p.display_name) == selector))
    }

    /// All providers, in registry order
    pub fn all(&self) -> &[Provider] {
        &self.providers
    }

    /// Providers eligible for the fallback loop, in registry order
    pub fn active(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter().filter(|p| p.active)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(default_providers())
    }
}

/// Identifier form of a display name
fn slug(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Built-in provider catalog, in fallback order. Endpoints, field names and
/// fixed headers match what each upstream actually accepts; swap in a custom
/// list via [`ProviderRegistry::new`].
pub fn default_providers() -> Vec<Provider> {
    vec![
        Provider::new(
            "playertera",
            "PlayerTera",
            "https://playertera.com/api/process-terabox",
            HttpMethod::Post,
            Encoding::Json,
            "url",
        )
        .with_header("accept", "application/json")
        .with_header("x-csrf-token", "w0p0LHPpNZFrLR6Rh78o8zBzzyXdeZdEMjiDSSD4")
        .with_header("referer", "https://playertera.com/"),
        Provider::new(
            "tera-fast",
            "TeraFast",
            "https://hex.teraboxfast2.workers.dev/",
            HttpMethod::Post,
            Encoding::Json,
            "url",
        )
        .with_header("referer", "https://www.teraboxfast.com/")
        .with_field("key", "C7mAq"),
        Provider::new(
            "teradwn",
            "TeraDownloadr",
            "https://teradownloadr.com/wp-admin/admin-ajax.php",
            HttpMethod::Post,
            Encoding::Form,
            "url",
        )
        .with_header("x-requested-with", "XMLHttpRequest")
        .with_header("referer", "https://teradownloadr.com/")
        .with_field("action", "terabox_fetch")
        .with_field("nonce", "ada26da710"),
        Provider::new(
            "iteraplay",
            "IteraPlay",
            "https://api.iteraplay.com/",
            HttpMethod::Post,
            Encoding::Json,
            "link",
        )
        .with_header("x-api-key", "terabox_pro_api_august_2025_premium")
        .with_header("referer", "https://www.teraboxdownloader.pro/"),
        Provider::new(
            "raspywave",
            "RaspyWave",
            "https://raspy-wave-5e61.sonukalakhari76.workers.dev/",
            HttpMethod::Post,
            Encoding::Json,
            "link",
        )
        .with_header("referer", "https://downloadterabox.com/"),
        Provider::new(
            "rapidapi",
            "RapidAPI",
            "https://terabox-downloader-direct-download-link-generator.p.rapidapi.com/fetch",
            HttpMethod::Post,
            Encoding::Json,
            "url",
        )
        .with_header(
            "x-rapidapi-host",
            "terabox-downloader-direct-download-link-generator.p.rapidapi.com",
        )
        .with_header("x-rapidapi-key", "357969b221msh32ff3122376c473p103b55jsn8b5dd54f26b7")
        .with_header("accept", "*/*"),
        Provider::new(
            "tera-downloader-cc",
            "Tera Downloader CC",
            "https://www.tera-downloader.cc/api/terabox-download",
            HttpMethod::Post,
            Encoding::Json,
            "url",
        )
        .with_header("referer", "https://www.tera-downloader.cc/"),
        Provider::new(
            "ronnie-client",
            "Ronnie Client",
            "https://ronnieverse.dev/api/terabox",
            HttpMethod::Get,
            Encoding::Query,
            "url",
        )
        .with_header("accept", "application/json")
        .with_header(
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let registry = ProviderRegistry::default();
        let names: Vec<&str> = registry.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "playertera",
                "tera-fast",
                "teradwn",
                "iteraplay",
                "raspywave",
                "rapidapi",
                "tera-downloader-cc",
                "ronnie-client",
            ]
        );
    }

    #[test]
    fn test_get_by_id() {
        let registry = ProviderRegistry::default();
        assert!(registry.get("iteraplay").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_find_by_display_name_slug() {
        let registry = ProviderRegistry::default();
        let provider = registry.find("tera-downloader-cc").expect("provider");
        assert_eq!(provider.display_name, "Tera Downloader CC");
        assert_eq!(slug(&provider.display_name), "tera-downloader-cc");
    }

    #[test]
    fn test_active_skips_disabled() {
        let registry = ProviderRegistry::new(vec![
            Provider::new("a", "A", "https://a.example/", HttpMethod::Post, Encoding::Json, "url"),
            Provider::new("b", "B", "https://b.example/", HttpMethod::Post, Encoding::Json, "url")
                .with_active(false),
            Provider::new("c", "C", "https://c.example/", HttpMethod::Get, Encoding::Query, "url"),
        ]);
        let active: Vec<&str> = registry.active().map(|p| p.name.as_str()).collect();
        assert_eq!(active, ["a", "c"]);
    }
}
