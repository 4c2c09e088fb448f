//! # Batch Insights
//!
//! Cross-record aggregation over a batch of canonical song records:
//! shared attributes, co-contribution graph, role tallies and popularity
//! distributions. Results are recomputed from scratch on every call.

pub mod aggregator;

pub use aggregator::{aggregate, aggregate_chunked, InsightFold};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Batch-level counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub total_songs: usize,
    pub unique_contributors: usize,
    pub unique_labels: usize,
}

/// Attribute value occurring on more than one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedItem {
    pub name: String,
    pub count: usize,
    /// Titles of the records carrying the value, one entry per occurrence
    pub songs: Vec<String>,
}

/// Contributor occurring on more than one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedContributor {
    pub name: String,
    pub count: usize,
    /// Union of roles seen for this contributor across the batch
    pub roles: Vec<String>,
    pub songs: Vec<String>,
}

/// Shared values per dimension; every entry has `count > 1`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedInsights {
    pub contributors: Vec<SharedContributor>,
    pub labels: Vec<SharedItem>,
    pub genres: Vec<SharedItem>,
    pub publishers: Vec<SharedItem>,
}

/// Popularity bins with inclusive upper bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PopularityBucket {
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "0-25")]
    UpTo25,
    #[serde(rename = "26-50")]
    UpTo50,
    #[serde(rename = "51-75")]
    UpTo75,
    #[serde(rename = "76-100")]
    UpTo100,
}

impl PopularityBucket {
    /// Quantize a popularity value; absence short-circuits to `Unknown`
    pub fn for_value(value: Option<u8>) -> Self {
        match value {
            None => Self::Unknown,
            Some(0..=25) => Self::UpTo25,
            Some(26..=50) => Self::UpTo50,
            Some(51..=75) => Self::UpTo75,
            Some(_) => Self::UpTo100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::UpTo25 => "0-25",
            Self::UpTo50 => "26-50",
            Self::UpTo75 => "51-75",
            Self::UpTo100 => "76-100",
        }
    }
}

impl fmt::Display for PopularityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket → formatted "<name> (<value>)" entries
pub type BucketMap = IndexMap<PopularityBucket, Vec<String>>;

/// Track and artist popularity distributions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityDistribution {
    pub track: BucketMap,
    pub artist: BucketMap,
}

/// Role tally and derivative coverage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraSummary {
    /// One increment per (contributor, role) pair across the batch
    pub role_tally: IndexMap<String, usize>,
    /// Records with at least one derivative
    pub derivative_count: usize,
}

/// Aggregate insight structure for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateInsights {
    pub summary: InsightSummary,
    pub shared: SharedInsights,
    pub popularity_distribution: PopularityDistribution,
    pub extra_summary: ExtraSummary,
    /// Contributor → names credited alongside them on any record
    pub co_contributors: IndexMap<String, Vec<String>>,
}
