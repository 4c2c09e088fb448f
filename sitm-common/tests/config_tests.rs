//! Unit tests for configuration loading and graceful degradation
//!
//! Covers:
//! - Missing config files SHALL NOT cause termination
//! - Missing configs → warning + defaults
//! - Priority order for config file resolution (CLI > env > config dir > defaults)
//! - Malformed config files are reported, not silently ignored
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SITM_CONFIG are marked with #[serial].

use serial_test::serial;
use sitm_common::config::{ConfigResolver, ProviderPriority, TomlConfig, CONFIG_ENV_VAR};
use sitm_common::{Error, ProviderId};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    let cli_file = write_config("[insights]\nmin_batch = 5\n");
    let env_file = write_config("[insights]\nmin_batch = 9\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let resolver = ConfigResolver::new(Some(cli_file.path().to_path_buf()));
    let config = resolver.load().unwrap();

    assert_eq!(config.insights.min_batch, 5);
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    let env_file = write_config(
        r#"
        [logging]
        level = "debug"

        [priority]
        label = ["discogs"]
        "#,
    );
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let resolver = ConfigResolver::new(None);
    assert_eq!(resolver.resolve_path(), Some(env_file.path().to_path_buf()));

    let config = resolver.load().unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.priority.label, vec![ProviderId::Discogs]);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);

    let resolver = ConfigResolver::new(Some(PathBuf::from(
        "/nonexistent/sitm-test/config.toml",
    )));
    let config = resolver.load().unwrap();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.insights.min_batch, 2);
    assert_eq!(config.priority, ProviderPriority::default());
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let cli_file = write_config("");
    let resolver = ConfigResolver::new(Some(cli_file.path().to_path_buf()));
    assert_eq!(resolver.resolve_path(), Some(cli_file.path().to_path_buf()));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("[insights\nmin_batch = ");
    let resolver = ConfigResolver::new(Some(file.path().to_path_buf()));

    match resolver.load() {
        Err(Error::Config(msg)) => assert!(msg.contains("Failed to parse config")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_default_priorities_match_provider_roles() {
    let priority = ProviderPriority::default();

    assert_eq!(priority.label.first(), Some(&ProviderId::Spotify));
    assert_eq!(
        priority.writer_comparison,
        [ProviderId::Discogs, ProviderId::MusicBrainz]
    );
    assert_eq!(priority.works, ProviderId::MusicBrainz);
    assert!(priority.validate().is_ok());
}

#[test]
fn test_full_config_round_trip_from_file() {
    let file = write_config(
        r#"
        [logging]
        level = "warn"

        [priority]
        metadata = ["discogs", "spotify"]
        label = ["discogs", "spotify"]
        genres = ["discogs"]
        contributors = ["musicbrainz", "discogs"]
        publishers = ["musicbrainz"]
        writer_comparison = ["musicbrainz", "discogs"]
        works = "musicbrainz"

        [insights]
        min_batch = 3
        "#,
    );

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(
        config.priority.contributors,
        vec![ProviderId::MusicBrainz, ProviderId::Discogs]
    );
    assert_eq!(
        config.priority.writer_comparison,
        [ProviderId::MusicBrainz, ProviderId::Discogs]
    );
    assert_eq!(config.insights.min_batch, 3);
}

#[test]
fn test_provider_names_are_case_insensitive() {
    let config = TomlConfig::from_toml_str(
        "[priority]\nlabel = [\"Discogs\", \"SPOTIFY\"]\nworks = \"MusicBrainz\"\n",
    )
    .unwrap();

    assert_eq!(config.priority.label, vec![ProviderId::Discogs, ProviderId::Spotify]);
    assert_eq!(config.priority.works, ProviderId::MusicBrainz);
}

#[test]
fn test_unknown_provider_is_config_error() {
    let result = TomlConfig::from_toml_str("[priority]\ngenres = [\"lastfm\"]\n");
    assert!(matches!(result, Err(Error::Config(_))));
}
