// teralink - resolver engine for TeraBox-style share links
//
// Turns a share URL into a time-limited direct download link plus
// best-effort metadata by walking an ordered list of third-party
// extraction APIs with undocumented, mutually incompatible response
// shapes. Route layers and storage live in the embedding application;
// this crate only does the resolution work.

pub mod resolver;

pub use resolver::{
    backfill, estimate_expiry, is_fresh, normalize, CachedLink, DownloadLink, Encoding,
    HttpMethod, LinkService, LinkSource, MediaKind, MediaMetadata, MediaRecord, MemoryStore,
    Normalized, Provider, ProviderRegistry, RawResponse, RecordStore, RecordUpdate, ResolveError,
    ResolutionResult, Resolver, ResolverConfig,
};
