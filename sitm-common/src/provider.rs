//! External metadata provider identifiers
//!
//! Every fragment, contributor source and priority list is keyed by
//! `ProviderId`, never by arrival order.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source of a metadata fragment (for provenance tracking)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ProviderId {
    /// Streaming catalog: album, release year, label, popularity, artist genres
    Spotify,
    /// Release database: credits, labels, styles, publishers, master versions
    Discogs,
    /// Open works database: recording/work credits, ISWC
    MusicBrainz,
    /// Cover/derivative works database
    SecondHandSongs,
}

impl ProviderId {
    /// All known providers, in declaration order
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Spotify,
        ProviderId::Discogs,
        ProviderId::MusicBrainz,
        ProviderId::SecondHandSongs,
    ];

    /// Wire identifier (lowercase)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::Discogs => "discogs",
            Self::MusicBrainz => "musicbrainz",
            Self::SecondHandSongs => "secondhandsongs",
        }
    }

    /// Human-readable name for flag messages
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Spotify => "Spotify",
            Self::Discogs => "Discogs",
            Self::MusicBrainz => "MusicBrainz",
            Self::SecondHandSongs => "SecondHandSongs",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown provider: {}", s)))
    }
}

impl TryFrom<String> for ProviderId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("MusicBrainz".parse::<ProviderId>().unwrap(), ProviderId::MusicBrainz);
        assert_eq!(" discogs ".parse::<ProviderId>().unwrap(), ProviderId::Discogs);
    }

    #[test]
    fn test_parse_unknown_provider() {
        assert!(matches!(
            "lastfm".parse::<ProviderId>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deserialize_accepts_any_case() {
        let providers: Vec<ProviderId> =
            serde_json::from_str(r#"["spotify", "MusicBrainz", "SecondHandSongs"]"#).unwrap();
        assert_eq!(
            providers,
            vec![
                ProviderId::Spotify,
                ProviderId::MusicBrainz,
                ProviderId::SecondHandSongs
            ]
        );
        assert!(serde_json::from_str::<ProviderId>(r#""lastfm""#).is_err());
    }

    #[test]
    fn test_serde_uses_wire_identifier() {
        for provider in ProviderId::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }
}
