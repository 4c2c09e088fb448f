// Shared Types and Data Contracts
//
// Defines the data contracts between the provider boundary, the reconciliation
// modules and the batch insight aggregator. Every type here is a plain value:
// produced by a pure function of its inputs and never mutated afterwards.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use sitm_common::ProviderId;

// ============================================================================
// Provider Inputs (one fragment per provider per song)
// ============================================================================

/// Contributor entry as reported by one provider, in that provider's vocabulary
///
/// Either field may be absent; such entries are dropped during merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderContributor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl ProviderContributor {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            role: Some(role.into()),
        }
    }
}

/// Metadata fragment from a single provider
///
/// Fields the provider has no data for are absent. A failed or timed-out
/// provider call is represented by `ProviderFragment::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFragment {
    pub contributors: Vec<ProviderContributor>,
    pub publishers: Vec<String>,
    pub genres: Vec<String>,
    pub label: Option<String>,
    pub album: Option<String>,
    pub release_year: Option<i32>,
    pub track_popularity: Option<i64>,
    pub artist_popularity: Option<i64>,
    /// International Standard Musical Work Code (works providers only)
    pub iswc: Option<String>,
}

impl ProviderFragment {
    /// True when the provider returned nothing usable
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Raw related-work entry from a derivative provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDerivative {
    pub title: Option<String>,
    #[serde(alias = "artist")]
    pub performer: Option<String>,
    pub uri: Option<String>,
}

/// One category of related works ("versions", "derivedWorks", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeCategory {
    pub category: String,
    #[serde(default)]
    pub items: Vec<RawDerivative>,
}

impl DerivativeCategory {
    pub fn new(category: impl Into<String>, items: Vec<RawDerivative>) -> Self {
        Self {
            category: category.into(),
            items,
        }
    }
}

/// Everything collected for one (artist, title) query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongFragments {
    pub artist: String,
    pub title: String,
    /// Fragments keyed by provider identity
    #[serde(default)]
    pub providers: IndexMap<ProviderId, ProviderFragment>,
    /// Related-work categories in resolution priority order
    #[serde(default)]
    pub derivatives: Vec<DerivativeCategory>,
    /// Performer names looked up for derivatives lacking one, keyed by URI
    #[serde(default)]
    pub enrichments: IndexMap<String, String>,
}

impl SongFragments {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder-style fragment insertion
    pub fn with_provider(mut self, provider: ProviderId, fragment: ProviderFragment) -> Self {
        self.providers.insert(provider, fragment);
        self
    }

    /// Fragment for `provider`, if that provider reported anything
    pub fn fragment(&self, provider: ProviderId) -> Option<&ProviderFragment> {
        self.providers.get(&provider)
    }
}

// ============================================================================
// Canonical Outputs
// ============================================================================

/// Contributor after reconciliation across providers
///
/// `roles` and `sources` are never empty in merger output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalContributor {
    pub name: String,
    #[serde(default)]
    pub roles: IndexSet<String>,
    #[serde(default)]
    pub sources: IndexSet<ProviderId>,
}

/// Related work after URI deduplication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDerivative {
    pub title: String,
    pub artist: String,
    pub relation_type: String,
    pub uri: String,
}

/// Advisory flag kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Writer sets differ between the two compared providers
    ConflictingInfo,
    /// No provider reports a publisher
    MissingPublisher,
    /// No provider reports a writer-class contributor
    MissingSongwriter,
    /// Works provider reports no ISWC
    MissingIswc,
    /// No related works resolved
    NoDerivatives,
}

/// Per-provider evidence attached to a flag
pub type FlagDetails = IndexMap<ProviderId, Vec<String>>;

/// Advisory annotation on a canonical record; never blocks assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightFlag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FlagDetails>,
}

impl InsightFlag {
    pub fn new(kind: FlagKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: FlagDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Single reconciled representation of one song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSongRecord {
    pub artist: String,
    pub title: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub label: Option<String>,
    /// 0-100
    #[serde(default)]
    pub track_popularity: Option<u8>,
    /// 0-100
    #[serde(default)]
    pub artist_popularity: Option<u8>,
    #[serde(default)]
    pub genres: IndexSet<String>,
    #[serde(default)]
    pub contributors: Vec<CanonicalContributor>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub derivatives: Vec<CanonicalDerivative>,
    #[serde(default)]
    pub flags: Vec<InsightFlag>,
}

impl CanonicalSongRecord {
    /// Record with identity only; every optional field absent
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
            release_year: None,
            label: None,
            track_popularity: None,
            artist_popularity: None,
            genres: IndexSet::new(),
            contributors: Vec::new(),
            publishers: Vec::new(),
            derivatives: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn has_flag(&self, kind: FlagKind) -> bool {
        self.flags.iter().any(|f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_deserializes_with_missing_fields() {
        let fragment: ProviderFragment =
            serde_json::from_str(r#"{"genres": ["rock"], "label": "EMI"}"#).unwrap();
        assert_eq!(fragment.genres, vec!["rock"]);
        assert_eq!(fragment.label.as_deref(), Some("EMI"));
        assert!(fragment.contributors.is_empty());
        assert!(fragment.track_popularity.is_none());
        assert!(!fragment.is_empty());
        assert!(ProviderFragment::default().is_empty());
    }

    #[test]
    fn test_raw_derivative_accepts_artist_alias() {
        let item: RawDerivative =
            serde_json::from_str(r#"{"title": "Cover", "artist": "Band", "uri": "u1"}"#).unwrap();
        assert_eq!(item.performer.as_deref(), Some("Band"));
    }

    #[test]
    fn test_flag_serializes_kind_as_type() {
        let flag = InsightFlag::new(FlagKind::MissingPublisher, "Publisher information missing");
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["type"], "missing_publisher");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_song_fragments_keyed_by_provider() {
        let json = r#"{
            "artist": "A",
            "title": "T",
            "providers": {"discogs": {"publishers": ["P"]}, "spotify": {}}
        }"#;
        let fragments: SongFragments = serde_json::from_str(json).unwrap();
        assert_eq!(
            fragments.fragment(ProviderId::Discogs).unwrap().publishers,
            vec!["P"]
        );
        assert!(fragments.fragment(ProviderId::Spotify).unwrap().is_empty());
        assert!(fragments.fragment(ProviderId::MusicBrainz).is_none());
    }
}
