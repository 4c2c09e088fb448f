//! # Per-Song Reconciliation
//!
//! Pure, synchronous modules turning provider fragments into one canonical record:
//!
//! - `role_normalizer` - free-text role → canonical role
//! - `contributor_merger` - per-provider credits → deduplicated contributors
//! - `flag_generator` - advisory cross-provider discrepancy/gap rules
//! - `derivative_resolver` - tiered related-work lists → URI-deduplicated list
//! - `record_assembler` - combines the above into a `CanonicalSongRecord`
//!
//! None of these modules performs I/O or returns an error.

pub mod contributor_merger;
pub mod derivative_resolver;
pub mod flag_generator;
pub mod record_assembler;
pub mod role_normalizer;

pub use flag_generator::{FlagContext, FlagGenerator, FlagRule};
pub use record_assembler::RecordAssembler;
