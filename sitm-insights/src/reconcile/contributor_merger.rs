// Contributor Merger
//
// Concept: Reconcile contributor lists from several providers into one list
// Synchronization: Accepts per-provider ProviderContributor lists in priority
// order, outputs CanonicalContributor list
//
// Algorithm:
// 1. Key by exact contributor name (trimmed, case-sensitive); no fuzzy matching
// 2. Normalize each role; entries without a name or a role are dropped
// 3. Union roles and sources per name
// 4. Emit in first-seen order across providers in iteration order

use super::role_normalizer;
use crate::types::{CanonicalContributor, ProviderContributor};
use indexmap::{IndexMap, IndexSet};
use sitm_common::ProviderId;
use tracing::debug;

/// Per-name accumulator
#[derive(Default)]
struct MergeEntry {
    roles: IndexSet<String>,
    sources: IndexSet<ProviderId>,
}

/// Merge contributor lists keyed by provider.
///
/// Sources are iterated in the order given; that order only affects output
/// ordering, never the role/source sets of a name.
pub fn merge<'a, I>(lists_by_source: I) -> Vec<CanonicalContributor>
where
    I: IntoIterator<Item = (ProviderId, &'a [ProviderContributor])>,
{
    let mut merged: IndexMap<String, MergeEntry> = IndexMap::new();
    let mut dropped = 0usize;

    for (source, contributors) in lists_by_source {
        for contributor in contributors {
            let name = contributor
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty());
            let role = role_normalizer::normalize(contributor.role.as_deref());

            let (Some(name), Some(role)) = (name, role) else {
                dropped += 1;
                continue;
            };

            let entry = merged.entry(name.to_string()).or_default();
            entry.roles.insert(role);
            entry.sources.insert(source);
        }
    }

    if dropped > 0 {
        debug!("Dropped {} contributor entries without name or role", dropped);
    }

    merged
        .into_iter()
        .map(|(name, entry)| CanonicalContributor {
            name,
            roles: entry.roles,
            sources: entry.sources,
        })
        .collect()
}
