//! Persistence collaborator
//!
//! The document store itself lives outside this crate. `SongStore` is the
//! interface the batch service needs from it; `MemoryStore` is an in-process
//! implementation used by the CLI and tests.

use crate::error::{StoreError, StoreResult};
use crate::types::{CanonicalContributor, CanonicalSongRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use sitm_common::ProviderId;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Role stored for a contributor that reached persistence without one
pub const UNKNOWN_ROLE: &str = "Unknown";

// ============================================================================
// Stored shapes
// ============================================================================

/// Reference to a persisted named entity (artist, writer, producer, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Uuid,
    pub name: String,
}

/// Upsert key: (title, primary artist entity)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub title: String,
    pub primary: Uuid,
}

/// One stored contributor row; a contributor with several roles has several rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContributor {
    pub entity: EntityRef,
    pub role: String,
    /// Providers that reported this contributor
    #[serde(default)]
    pub sources: Vec<ProviderId>,
}

/// Which provider contributed to a stored song, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStamp {
    pub provider: ProviderId,
    /// Provider-side identifier, when the provider exposes one
    #[serde(default)]
    pub id: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl SourceStamp {
    pub fn now(provider: ProviderId) -> Self {
        Self {
            provider,
            id: None,
            fetched_at: Utc::now(),
        }
    }
}

/// Persisted projection of a canonical record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSong {
    pub title: String,
    pub primary_artist: EntityRef,
    #[serde(default)]
    pub contributors: Vec<StoredContributor>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceStamp>,
}

impl StoredSong {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            title: self.title.clone(),
            primary: self.primary_artist.id,
        }
    }

    /// Project back into a canonical record
    ///
    /// Only what the store keeps survives: one contributor entry per stored row,
    /// no publishers, no popularity, no derivatives, no flags.
    pub fn to_record(&self) -> CanonicalSongRecord {
        let mut record = CanonicalSongRecord::new(&self.primary_artist.name, &self.title);
        record.label = self.labels.first().cloned();
        record.genres = self.genres.iter().cloned().collect();
        record.contributors = self
            .contributors
            .iter()
            .map(|row| CanonicalContributor {
                name: row.entity.name.clone(),
                roles: IndexSet::from([row.role.clone()]),
                sources: row.sources.iter().copied().collect(),
            })
            .collect();
        record
    }
}

/// Persist a canonical record: resolve every entity, then upsert by key
pub async fn persist(
    store: &dyn SongStore,
    record: &CanonicalSongRecord,
    sources: Vec<SourceStamp>,
) -> StoreResult<StoredSong> {
    let primary_artist = store.find_or_create_entity(&record.artist).await?;

    let mut contributors = Vec::new();
    for contributor in &record.contributors {
        let entity = store.find_or_create_entity(&contributor.name).await?;
        let sources: Vec<ProviderId> = contributor.sources.iter().copied().collect();
        if contributor.roles.is_empty() {
            contributors.push(StoredContributor {
                entity,
                role: UNKNOWN_ROLE.to_string(),
                sources,
            });
            continue;
        }
        for role in &contributor.roles {
            contributors.push(StoredContributor {
                entity: entity.clone(),
                role: role.clone(),
                sources: sources.clone(),
            });
        }
    }

    let song = StoredSong {
        title: record.title.clone(),
        primary_artist,
        contributors,
        genres: record.genres.iter().cloned().collect(),
        labels: record.label.iter().cloned().collect(),
        sources,
    };

    store.upsert_record(song.key(), song).await
}

// ============================================================================
// Store interface
// ============================================================================

#[async_trait]
pub trait SongStore: Send + Sync {
    /// Look up an entity by exact (trimmed) name, creating it if absent
    async fn find_or_create_entity(&self, name: &str) -> StoreResult<EntityRef>;

    /// Insert or replace the song stored under `key`
    async fn upsert_record(&self, key: RecordKey, song: StoredSong) -> StoreResult<StoredSong>;

    /// Every stored song, in first-insertion order
    async fn list_records(&self) -> StoreResult<Vec<StoredSong>>;
}

#[derive(Debug, Default)]
struct MemoryState {
    entities: IndexMap<String, EntityRef>,
    songs: IndexMap<RecordKey, StoredSong>,
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.songs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SongStore for MemoryStore {
    async fn find_or_create_entity(&self, name: &str) -> StoreResult<EntityRef> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("entity name is blank".to_string()));
        }

        if let Some(entity) = self.state.read().await.entities.get(name) {
            return Ok(entity.clone());
        }

        // Re-check under the write lock; another task may have created it
        let mut state = self.state.write().await;
        let entity = state
            .entities
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Creating entity {}", name);
                EntityRef {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                }
            })
            .clone();
        Ok(entity)
    }

    async fn upsert_record(&self, key: RecordKey, song: StoredSong) -> StoreResult<StoredSong> {
        if key != song.key() {
            return Err(StoreError::Invalid(format!(
                "key ({}, {}) does not match song ({}, {})",
                key.title, key.primary, song.title, song.primary_artist.id
            )));
        }

        let mut state = self.state.write().await;
        if state.songs.insert(key, song.clone()).is_some() {
            debug!("Replaced stored song {}", song.title);
        }
        Ok(song)
    }

    async fn list_records(&self) -> StoreResult<Vec<StoredSong>> {
        Ok(self.state.read().await.songs.values().cloned().collect())
    }
}
