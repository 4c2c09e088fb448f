//! Bootstrap configuration loading
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SITM_CONFIG`)
//! 3. Platform config directory (`<config_dir>/sitm/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file never terminates the caller: it is logged and the
//! compiled defaults are used. A file that exists but does not parse is an error.

use crate::{Error, ProviderId, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SITM_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Provider priority lists used for tie-breaking during assembly
    #[serde(default)]
    pub priority: ProviderPriority,

    /// Batch insight settings
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Ordered provider lists for every field that needs a tie-break.
///
/// Priorities are resolved by provider identity; the order in which provider
/// fetches complete never matters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderPriority {
    /// Album, release year and popularity: first provider reporting a value wins
    pub metadata: Vec<ProviderId>,
    /// Label: first provider reporting a label wins
    pub label: Vec<ProviderId>,
    /// Genre union order
    pub genres: Vec<ProviderId>,
    /// Contributor merge iteration order
    pub contributors: Vec<ProviderId>,
    /// Publisher concatenation order
    pub publishers: Vec<ProviderId>,
    /// The two providers compared by the conflicting-writer rule
    pub writer_comparison: [ProviderId; 2],
    /// Provider expected to report work identifiers (ISWC)
    pub works: ProviderId,
}

impl Default for ProviderPriority {
    fn default() -> Self {
        Self {
            metadata: vec![
                ProviderId::Spotify,
                ProviderId::Discogs,
                ProviderId::MusicBrainz,
            ],
            label: vec![ProviderId::Spotify, ProviderId::Discogs],
            genres: vec![ProviderId::Spotify, ProviderId::Discogs],
            contributors: vec![ProviderId::Discogs, ProviderId::MusicBrainz],
            publishers: vec![ProviderId::Discogs, ProviderId::MusicBrainz],
            writer_comparison: [ProviderId::Discogs, ProviderId::MusicBrainz],
            works: ProviderId::MusicBrainz,
        }
    }
}

impl ProviderPriority {
    /// Reject orderings that cannot produce meaningful tie-breaks
    pub fn validate(&self) -> Result<()> {
        let [a, b] = self.writer_comparison;
        if a == b {
            return Err(Error::Config(format!(
                "priority.writer_comparison must name two different providers (got {} twice)",
                a
            )));
        }

        for (name, list) in [
            ("metadata", &self.metadata),
            ("label", &self.label),
            ("genres", &self.genres),
            ("contributors", &self.contributors),
            ("publishers", &self.publishers),
        ] {
            for (i, provider) in list.iter().enumerate() {
                if list[..i].contains(provider) {
                    return Err(Error::Config(format!(
                        "priority.{} lists {} more than once",
                        name, provider
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Batch insight settings
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsConfig {
    /// Batches smaller than this are returned without derived insights
    #[serde(default = "default_min_batch")]
    pub min_batch: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            min_batch: default_min_batch(),
        }
    }
}

fn default_min_batch() -> usize {
    2
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.priority.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Config file resolver following the 4-tier priority order
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create resolver with optional command-line override
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Determine which config file to read, if any
    pub fn resolve_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory (only if present)
        default_config_path().filter(|p| p.exists())
    }

    /// Load configuration, falling back to compiled defaults when no file exists
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.resolve_path() else {
            debug!("No config file found, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok(TomlConfig::default());
        }

        let config = TomlConfig::from_file(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Platform config file location (`~/.config/sitm/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sitm").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.insights.min_batch, 2);
        assert_eq!(config.priority, ProviderPriority::default());
    }

    #[test]
    fn test_partial_priority_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [priority]
            label = ["discogs", "spotify"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.priority.label,
            vec![ProviderId::Discogs, ProviderId::Spotify]
        );
        assert_eq!(
            config.priority.contributors,
            ProviderPriority::default().contributors
        );
    }

    #[test]
    fn test_writer_comparison_requires_two_providers() {
        let err = TomlConfig::from_toml_str(
            r#"
            [priority]
            writer_comparison = ["discogs", "discogs"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_priority_entry_rejected() {
        let err = TomlConfig::from_toml_str(
            r#"
            [priority]
            genres = ["spotify", "spotify"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("priority.genres"));
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let err = TomlConfig::from_toml_str(
            r#"
            [priority]
            label = ["tidal"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
