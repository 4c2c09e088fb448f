// Record Assembler
//
// Concept: Combine per-provider fragments into one canonical song record
// Synchronization: Accepts SongFragments, outputs CanonicalSongRecord
//
// Field rules (all tie-breaks resolved by ProviderPriority, never arrival order):
// - album, release year, popularity: first provider in `metadata` reporting a value
// - label: first provider in `label` reporting one
// - genres: set union in `genres` order
// - publishers: concatenation in `publishers` order, duplicates preserved
// - contributors: ContributorMerger over `contributors` order
// - derivatives: DerivativeResolver over the collected categories
// - flags: FlagGenerator
//
// Assembly never fails; absent inputs produce absent fields or empty collections.

use super::contributor_merger;
use super::derivative_resolver;
use super::flag_generator::{FlagContext, FlagGenerator};
use crate::types::{CanonicalSongRecord, ProviderFragment, SongFragments};
use indexmap::IndexSet;
use sitm_common::config::ProviderPriority;
use sitm_common::ProviderId;
use tracing::debug;

/// Canonical record assembler
pub struct RecordAssembler {
    priority: ProviderPriority,
    flags: FlagGenerator,
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::new(ProviderPriority::default())
    }
}

impl RecordAssembler {
    /// Assembler with the full default flag rule set
    pub fn new(priority: ProviderPriority) -> Self {
        Self {
            priority,
            flags: FlagGenerator::default(),
        }
    }

    /// Replace the flag rule set
    pub fn with_flag_generator(mut self, flags: FlagGenerator) -> Self {
        self.flags = flags;
        self
    }

    pub fn priority(&self) -> &ProviderPriority {
        &self.priority
    }

    /// Assemble one canonical record
    pub fn assemble(&self, fragments: &SongFragments) -> CanonicalSongRecord {
        let priority = &self.priority;

        let contributors = contributor_merger::merge(
            priority
                .contributors
                .iter()
                .filter_map(|p| fragments.fragment(*p).map(|f| (*p, f.contributors.as_slice()))),
        );

        // Concatenated as reported; duplicates across providers are kept
        let publishers: Vec<String> = ordered(fragments, &priority.publishers)
            .flat_map(|f| f.publishers.iter().cloned())
            .collect();

        let genres: IndexSet<String> = ordered(fragments, &priority.genres)
            .flat_map(|f| f.genres.iter())
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();

        let label = first_reported(fragments, &priority.label, |f| non_blank(f.label.as_deref()));
        let album = first_reported(fragments, &priority.metadata, |f| non_blank(f.album.as_deref()));
        let release_year = first_reported(fragments, &priority.metadata, |f| f.release_year);
        let track_popularity =
            first_reported(fragments, &priority.metadata, |f| popularity(f.track_popularity));
        let artist_popularity =
            first_reported(fragments, &priority.metadata, |f| popularity(f.artist_popularity));

        let derivatives = derivative_resolver::resolve_with_enrichment(
            &fragments.derivatives,
            &fragments.enrichments,
        );

        let flags = self.flags.generate(&FlagContext {
            fragments,
            priority,
            derivatives: &derivatives,
        });

        debug!(
            "Assembled {} - {}: {} contributors, {} genres, {} publishers, {} derivatives, {} flags",
            fragments.artist,
            fragments.title,
            contributors.len(),
            genres.len(),
            publishers.len(),
            derivatives.len(),
            flags.len()
        );

        CanonicalSongRecord {
            artist: fragments.artist.clone(),
            title: fragments.title.clone(),
            album,
            release_year,
            label,
            track_popularity,
            artist_popularity,
            genres,
            contributors,
            publishers,
            derivatives,
            flags,
        }
    }
}

/// Fragments of the listed providers, in list order, skipping absent ones
fn ordered<'a>(
    fragments: &'a SongFragments,
    providers: &'a [ProviderId],
) -> impl Iterator<Item = &'a ProviderFragment> + 'a {
    providers.iter().filter_map(move |p| fragments.fragment(*p))
}

/// First value reported by the listed providers, in list order
fn first_reported<T, F>(fragments: &SongFragments, providers: &[ProviderId], field: F) -> Option<T>
where
    F: Fn(&ProviderFragment) -> Option<T>,
{
    ordered(fragments, providers).find_map(field)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Popularity is 0-100; anything else is treated as unreported
fn popularity(value: Option<i64>) -> Option<u8> {
    let value = value?;
    match u8::try_from(value) {
        Ok(v) if v <= 100 => Some(v),
        _ => {
            debug!("Discarding out-of-range popularity {}", value);
            None
        }
    }
}
