//! sitm-insights library interface
//!
//! Reconciles per-provider song metadata into canonical records and derives
//! cross-record insights over batches of them.

pub mod boundary;
pub mod error;
pub mod insights;
pub mod reconcile;
pub mod types;

pub use crate::error::{ProviderError, ProviderResult, StoreError, StoreResult};
pub use crate::insights::{aggregate, aggregate_chunked, AggregateInsights};
pub use crate::reconcile::RecordAssembler;
pub use crate::types::{CanonicalSongRecord, SongFragments};
