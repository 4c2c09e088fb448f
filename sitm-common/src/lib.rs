//! # SITM Common Library
//!
//! Shared code for the SITM metadata services:
//! - Error types
//! - Provider identifiers
//! - Bootstrap configuration loading (TOML)

pub mod config;
pub mod error;
pub mod provider;

pub use error::{Error, Result};
pub use provider::ProviderId;
