//! Per-song fragment collection
//!
//! Queries every configured provider concurrently, converts each failure into
//! an empty fragment, orders related-work categories by resolution priority,
//! gathers performer enrichments and hands the result to the RecordAssembler.

use super::provider::{ArtistEnricher, DerivativeSource, MetadataProvider};
use crate::reconcile::derivative_resolver::{self, CATEGORY_PRIORITY};
use crate::reconcile::RecordAssembler;
use crate::types::{CanonicalSongRecord, DerivativeCategory, ProviderFragment, SongFragments};
use futures::future::join_all;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collects provider fragments for a song and assembles the canonical record
pub struct SongCollector {
    providers: Vec<Arc<dyn MetadataProvider>>,
    derivative_sources: Vec<Arc<dyn DerivativeSource>>,
    enricher: Option<Arc<dyn ArtistEnricher>>,
    assembler: RecordAssembler,
}

impl SongCollector {
    pub fn new(assembler: RecordAssembler) -> Self {
        Self {
            providers: Vec::new(),
            derivative_sources: Vec::new(),
            enricher: None,
            assembler,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_derivative_source(mut self, source: Arc<dyn DerivativeSource>) -> Self {
        self.derivative_sources.push(source);
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn ArtistEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn assembler(&self) -> &RecordAssembler {
        &self.assembler
    }

    /// Fetch and assemble one song
    pub async fn collect(&self, artist: &str, title: &str) -> CanonicalSongRecord {
        let fragments = self.gather(artist, title).await;
        self.assembler.assemble(&fragments)
    }

    /// Fetch every provider's fragment; never fails
    pub async fn gather(&self, artist: &str, title: &str) -> SongFragments {
        info!("Collecting metadata for {} - {}", artist, title);

        let mut fragments = SongFragments::new(artist, title);

        let results = join_all(self.providers.iter().map(|provider| async move {
            (provider.id(), provider.fetch(artist, title).await)
        }))
        .await;

        for (id, result) in results {
            let fragment = result.unwrap_or_else(|e| {
                warn!("Provider fetch failed, continuing without it: {}", e);
                ProviderFragment::default()
            });
            if fragments.providers.insert(id, fragment).is_some() {
                warn!("Provider {} registered more than once; keeping last fragment", id);
            }
        }

        fragments.derivatives = self.gather_derivatives(artist, title).await;
        fragments.enrichments = self.gather_enrichments(&fragments.derivatives).await;

        debug!(
            "Collected {} provider fragments, {} derivative categories, {} enrichments",
            fragments.providers.len(),
            fragments.derivatives.len(),
            fragments.enrichments.len()
        );

        fragments
    }

    async fn gather_derivatives(&self, artist: &str, title: &str) -> Vec<DerivativeCategory> {
        let results = join_all(
            self.derivative_sources
                .iter()
                .map(|source| async move { (source.id(), source.fetch_derivatives(artist, title).await) }),
        )
        .await;

        let mut categories: Vec<DerivativeCategory> = results
            .into_iter()
            .flat_map(|(id, result)| {
                result.unwrap_or_else(|e| {
                    warn!("Derivative source {} failed, continuing without it: {}", id, e);
                    Vec::new()
                })
            })
            .collect();

        // Stable: categories outside the priority list keep their order, last
        categories.sort_by_key(|c| {
            CATEGORY_PRIORITY
                .iter()
                .position(|p| *p == c.category)
                .unwrap_or(CATEGORY_PRIORITY.len())
        });

        categories
    }

    async fn gather_enrichments(
        &self,
        categories: &[DerivativeCategory],
    ) -> IndexMap<String, String> {
        let mut enrichments = IndexMap::new();
        let Some(enricher) = &self.enricher else {
            return enrichments;
        };

        // Sequential: the enricher owns its own rate limiting
        for uri in derivative_resolver::enrichment_candidates(categories) {
            match enricher.performer_for(&uri).await {
                Ok(Some(name)) => {
                    enrichments.insert(uri, name);
                }
                Ok(None) => debug!("No performer found for {}", uri),
                Err(e) => warn!("Performer enrichment failed for {}: {}", uri, e),
            }
        }

        enrichments
    }
}
