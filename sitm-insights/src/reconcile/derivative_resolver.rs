// Derivative Resolver
//
// Concept: Merge tiered related-work categories into one deduplicated list
// Synchronization: Accepts DerivativeCategory list + URI-keyed enrichments,
// outputs CanonicalDerivative list
//
// Algorithm:
// 1. Walk categories in the given order, then items in order
// 2. Fill a missing performer from the enrichment map (keyed by URI)
// 3. Keep items with a URI and a known performer ("Unknown" counts as absent)
// 4. First occurrence of a URI wins across all categories

use crate::types::{CanonicalDerivative, DerivativeCategory, RawDerivative};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Performer name providers use when they do not know the performer
pub const UNKNOWN_PERFORMER: &str = "Unknown";

/// SecondHandSongs work versions
pub const CATEGORY_VERSIONS: &str = "versions";
/// SecondHandSongs derived works (samples, adaptations)
pub const CATEGORY_DERIVED_WORKS: &str = "derivedWorks";
/// SecondHandSongs performance search results
pub const CATEGORY_PERFORMANCE: &str = "performance";
/// Discogs master release versions
pub const CATEGORY_MASTER_VERSIONS: &str = "masterVersions";

/// Category resolution priority used by the collector
pub const CATEGORY_PRIORITY: [&str; 4] = [
    CATEGORY_VERSIONS,
    CATEGORY_DERIVED_WORKS,
    CATEGORY_PERFORMANCE,
    CATEGORY_MASTER_VERSIONS,
];

/// Resolve without enrichment results
pub fn resolve(categories: &[DerivativeCategory]) -> Vec<CanonicalDerivative> {
    resolve_with_enrichment(categories, &IndexMap::new())
}

/// Resolve, filling missing performers from `enrichments` before dedup
pub fn resolve_with_enrichment(
    categories: &[DerivativeCategory],
    enrichments: &IndexMap<String, String>,
) -> Vec<CanonicalDerivative> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut resolved = Vec::new();
    let mut skipped = 0usize;

    for category in categories {
        for item in &category.items {
            let Some(uri) = item.uri.as_deref().filter(|u| !u.trim().is_empty()) else {
                skipped += 1;
                continue;
            };

            let Some(artist) = performer(item).or_else(|| known(enrichments.get(uri))) else {
                skipped += 1;
                continue;
            };

            if !seen.insert(uri) {
                continue;
            }

            resolved.push(CanonicalDerivative {
                title: item.title.clone().unwrap_or_default(),
                artist: artist.to_string(),
                relation_type: category.category.clone(),
                uri: uri.to_string(),
            });
        }
    }

    debug!(
        "Resolved {} derivatives from {} categories ({} unusable items)",
        resolved.len(),
        categories.len(),
        skipped
    );

    resolved
}

/// URIs of items that need a performer lookup, in first-seen order
pub fn enrichment_candidates(categories: &[DerivativeCategory]) -> Vec<String> {
    let mut seen = HashSet::new();
    categories
        .iter()
        .flat_map(|c| &c.items)
        .filter(|item| performer(item).is_none())
        .filter_map(|item| item.uri.as_deref())
        .filter(|uri| !uri.trim().is_empty() && seen.insert(*uri))
        .map(str::to_string)
        .collect()
}

fn performer(item: &RawDerivative) -> Option<&str> {
    known(item.performer.as_ref())
}

fn known(name: Option<&String>) -> Option<&str> {
    name.map(|n| n.trim())
        .filter(|n| !n.is_empty() && *n != UNKNOWN_PERFORMER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(title: &str, performer: Option<&str>, uri: Option<&str>) -> RawDerivative {
        RawDerivative {
            title: Some(title.to_string()),
            performer: performer.map(str::to_string),
            uri: uri.map(str::to_string),
        }
    }

    #[test]
    fn test_first_category_wins_for_duplicate_uri() {
        let categories = vec![
            DerivativeCategory::new(
                CATEGORY_VERSIONS,
                vec![item("Cover", Some("Band A"), Some("shs/1"))],
            ),
            DerivativeCategory::new(
                CATEGORY_PERFORMANCE,
                vec![
                    item("Cover (live)", Some("Band A"), Some("shs/1")),
                    item("Other", Some("Band B"), Some("shs/2")),
                ],
            ),
        ];

        let resolved = resolve(&categories);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].relation_type, CATEGORY_VERSIONS);
        assert_eq!(resolved[0].title, "Cover");
        assert_eq!(resolved[1].uri, "shs/2");
    }

    #[test]
    fn test_unknown_or_missing_performer_excluded() {
        let categories = vec![DerivativeCategory::new(
            CATEGORY_VERSIONS,
            vec![
                item("A", Some("Unknown"), Some("u/1")),
                item("B", None, Some("u/2")),
                item("C", Some("Real"), None),
                item("D", Some("Real"), Some("u/4")),
            ],
        )];

        let resolved = resolve(&categories);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].uri, "u/4");
    }

    #[test]
    fn test_enrichment_fills_missing_performer() {
        let categories = vec![DerivativeCategory::new(
            CATEGORY_MASTER_VERSIONS,
            vec![
                item("Reissue", None, Some("releases/42")),
                item("Promo", None, Some("releases/43")),
            ],
        )];
        let mut enrichments = IndexMap::new();
        enrichments.insert("releases/42".to_string(), "Band & Guest".to_string());
        enrichments.insert("releases/43".to_string(), "Unknown".to_string());

        let resolved = resolve_with_enrichment(&categories, &enrichments);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].artist, "Band & Guest");
    }

    #[test]
    fn test_enrichment_does_not_override_known_performer() {
        let categories = vec![DerivativeCategory::new(
            CATEGORY_VERSIONS,
            vec![item("X", Some("Original"), Some("u/1"))],
        )];
        let mut enrichments = IndexMap::new();
        enrichments.insert("u/1".to_string(), "Other".to_string());

        let resolved = resolve_with_enrichment(&categories, &enrichments);
        assert_eq!(resolved[0].artist, "Original");
    }

    #[test]
    fn test_enrichment_candidates() {
        let categories = vec![
            DerivativeCategory::new(
                CATEGORY_VERSIONS,
                vec![item("A", Some("Unknown"), Some("u/1")), item("B", Some("K"), Some("u/2"))],
            ),
            DerivativeCategory::new(
                CATEGORY_MASTER_VERSIONS,
                vec![item("C", None, Some("u/3")), item("D", None, Some("u/1")), item("E", None, None)],
            ),
        ];

        assert_eq!(enrichment_candidates(&categories), vec!["u/1", "u/3"]);
    }

    proptest! {
        #[test]
        fn prop_resolved_uris_are_unique(
            uris in prop::collection::vec(
                prop::option::of(prop::sample::select(vec!["a", "b", "c", "d"])),
                0..20,
            ),
        ) {
            let items: Vec<_> = uris
                .iter()
                .map(|u| item("t", Some("P"), *u))
                .collect();
            let (first, second) = items.split_at(items.len() / 2);
            let categories = vec![
                DerivativeCategory::new(CATEGORY_VERSIONS, first.to_vec()),
                DerivativeCategory::new(CATEGORY_PERFORMANCE, second.to_vec()),
            ];

            let resolved = resolve(&categories);
            let unique: HashSet<_> = resolved.iter().map(|d| d.uri.as_str()).collect();
            prop_assert_eq!(unique.len(), resolved.len());
        }
    }
}
