//! Batch insight service
//!
//! Ties collection, persistence and aggregation together. Aggregation is
//! suppressed for batches smaller than `min_batch`; that policy lives here and
//! not in the aggregator.

use super::collector::SongCollector;
use super::store::{self, SongStore, SourceStamp};
use crate::error::StoreResult;
use crate::insights::{aggregate, AggregateInsights};
use crate::types::{CanonicalSongRecord, SongFragments};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default minimum batch size for derived insights
pub const DEFAULT_MIN_BATCH: usize = 2;

/// One (artist, title) lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongQuery {
    pub artist: String,
    pub title: String,
}

impl SongQuery {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

/// Songs plus the insights derived from them, when the batch is large enough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub songs: Vec<CanonicalSongRecord>,
    #[serde(default)]
    pub derived_insights: Option<AggregateInsights>,
}

impl BatchReport {
    /// Build a report, aggregating only when `songs.len() >= min_batch`
    pub fn from_records(songs: Vec<CanonicalSongRecord>, min_batch: usize) -> Self {
        let derived_insights = if songs.len() < min_batch {
            debug!(
                "Batch of {} below minimum {}, skipping insights",
                songs.len(),
                min_batch
            );
            None
        } else {
            Some(aggregate(&songs))
        };

        Self {
            songs,
            derived_insights,
        }
    }
}

/// Collect, persist and summarize songs
pub struct InsightService {
    collector: SongCollector,
    store: Arc<dyn SongStore>,
    min_batch: usize,
}

impl InsightService {
    pub fn new(collector: SongCollector, store: Arc<dyn SongStore>) -> Self {
        Self {
            collector,
            store,
            min_batch: DEFAULT_MIN_BATCH,
        }
    }

    pub fn with_min_batch(mut self, min_batch: usize) -> Self {
        self.min_batch = min_batch;
        self
    }

    pub fn min_batch(&self) -> usize {
        self.min_batch
    }

    /// Collect, assemble and persist one song
    ///
    /// Returns the freshly assembled record. Provider failures are absorbed by
    /// the collector; a failed write is logged and the record is still returned.
    pub async fn fetch_one(&self, artist: &str, title: &str) -> CanonicalSongRecord {
        let fragments = self.collector.gather(artist, title).await;
        let record = self.collector.assembler().assemble(&fragments);

        match store::persist(self.store.as_ref(), &record, source_stamps(&fragments)).await {
            Ok(_) => debug!(
                "Stored {} - {} with {} contributors, {} flags",
                record.artist,
                record.title,
                record.contributors.len(),
                record.flags.len()
            ),
            Err(e) => warn!(
                "Write failed for {} - {}, returning unsaved record: {}",
                record.artist, record.title, e
            ),
        }

        record
    }

    /// Fetch several songs concurrently and summarize them
    pub async fn fetch_multiple(&self, queries: &[SongQuery]) -> BatchReport {
        info!("Fetching {} songs", queries.len());

        let songs = join_all(queries.iter().map(|q| self.fetch_one(&q.artist, &q.title))).await;

        BatchReport::from_records(songs, self.min_batch)
    }

    /// Summarize everything currently in the store
    pub async fn database_with_insights(&self) -> StoreResult<BatchReport> {
        let songs: Vec<CanonicalSongRecord> = self
            .store
            .list_records()
            .await?
            .iter()
            .map(|s| s.to_record())
            .collect();

        info!("Loaded {} stored songs", songs.len());
        Ok(BatchReport::from_records(songs, self.min_batch))
    }
}

/// One stamp per provider that reported anything
fn source_stamps(fragments: &SongFragments) -> Vec<SourceStamp> {
    fragments
        .providers
        .iter()
        .filter(|(_, fragment)| !fragment.is_empty())
        .map(|(provider, _)| SourceStamp::now(*provider))
        .collect()
}
