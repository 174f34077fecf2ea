// Resolver module - share URL to download link + metadata

pub mod backfill;
pub mod errors;
pub mod expiry;
pub mod freshness;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod registry;
pub mod service;
pub mod store;

pub use errors::ResolveError;
pub use expiry::estimate_expiry;
pub use freshness::is_fresh;
pub use models::{
    CachedLink, LinkSource, MediaKind, MediaMetadata, MediaRecord, RawResponse, RecordUpdate,
    ResolutionResult, ResolverConfig, PLACEHOLDER_TITLE,
};
pub use normalize::{normalize, Normalized};
pub use orchestrator::Resolver;
pub use registry::{default_providers, Encoding, HttpMethod, Provider, ProviderRegistry};
pub use service::{DownloadLink, LinkService};
pub use store::{MemoryStore, RecordStore};
