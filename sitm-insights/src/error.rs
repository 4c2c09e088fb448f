//! Error types for sitm-insights collaborators
//!
//! The reconciliation core never returns errors. These types describe failures
//! of the external collaborators (provider clients, persistence) as seen by the
//! boundary layer, which absorbs provider failures as empty fragments.

use sitm_common::ProviderId;
use thiserror::Error;

/// Failure reported by a provider client
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider unreachable or returned an error status
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: ProviderId,
        message: String,
    },

    /// Provider did not answer in time
    #[error("{provider} timed out")]
    Timeout { provider: ProviderId },
}

/// Failure reported by the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record or entity could not be written
    #[error("Write failed: {0}")]
    Write(String),

    /// Stored data could not be read
    #[error("Read failed: {0}")]
    Read(String),

    /// Invalid key or record
    #[error("Invalid record: {0}")]
    Invalid(String),
}

/// Result type for provider client calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type for persistence calls
pub type StoreResult<T> = Result<T, StoreError>;
