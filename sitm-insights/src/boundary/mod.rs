//! # Boundary Layer
//!
//! In-process seams to the external collaborators: provider clients,
//! persistence, and the batch service that calls the reconciliation core
//! before and after persistence.

pub mod batch;
pub mod collector;
pub mod provider;
pub mod store;

pub use batch::{BatchReport, InsightService, SongQuery};
pub use collector::SongCollector;
pub use provider::{ArtistEnricher, DerivativeSource, MetadataProvider};
pub use store::{MemoryStore, SongStore, StoredSong};
