//! Provider collaborator interfaces
//!
//! Network clients live outside this crate. They own rate limiting, retries,
//! authentication and pagination; this crate only consumes their results.

use crate::error::ProviderResult;
use crate::types::{DerivativeCategory, ProviderFragment};
use async_trait::async_trait;
use sitm_common::ProviderId;

/// Metadata provider client (one per external catalog)
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider identity used for priority resolution
    fn id(&self) -> ProviderId;

    /// Fetch this provider's fragment for one song
    async fn fetch(&self, artist: &str, title: &str) -> ProviderResult<ProviderFragment>;
}

/// Related-works provider client
#[async_trait]
pub trait DerivativeSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetch categorized related works for one song
    async fn fetch_derivatives(
        &self,
        artist: &str,
        title: &str,
    ) -> ProviderResult<Vec<DerivativeCategory>>;
}

/// Looks up a missing performer name by following a derivative's URI
#[async_trait]
pub trait ArtistEnricher: Send + Sync {
    /// `Ok(None)` when the secondary resource names no artist
    async fn performer_for(&self, uri: &str) -> ProviderResult<Option<String>>;
}
