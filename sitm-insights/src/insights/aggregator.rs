// Insight Aggregator
//
// Concept: Pure fold over a batch of canonical records
// Synchronization: Accepts &[CanonicalSongRecord], outputs AggregateInsights
//
// Algorithm (O(n·k) in contributor/attribute mentions):
// 1. Per record: count every contributor, label, genre and publisher mention
//    (no per-record dedup), tally (contributor, role) pairs, link every
//    ordered pair of distinct contributor names, bucket both popularities
// 2. Keep dimension entries with count > 1 as shared items
//
// The fold state is local to one call. Fold states built over contiguous
// chunks merge (in chunk order) to the same result as a single sequential fold.

use super::{
    AggregateInsights, BucketMap, ExtraSummary, InsightSummary, PopularityBucket,
    PopularityDistribution, SharedContributor, SharedInsights, SharedItem,
};
use crate::types::CanonicalSongRecord;
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use tracing::{debug, info};

/// Per-value accumulator for labels, genres and publishers
#[derive(Debug, Clone, Default)]
struct Tally {
    count: usize,
    songs: Vec<String>,
}

impl Tally {
    fn record(&mut self, title: &str) {
        self.count += 1;
        self.songs.push(title.to_string());
    }

    fn absorb(&mut self, other: Tally) {
        self.count += other.count;
        self.songs.extend(other.songs);
    }
}

/// Per-name accumulator for contributors
#[derive(Debug, Clone, Default)]
struct ContributorTally {
    tally: Tally,
    roles: IndexSet<String>,
    co_contributors: IndexSet<String>,
}

/// Aggregation fold state
#[derive(Debug, Clone, Default)]
pub struct InsightFold {
    total_songs: usize,
    contributors: IndexMap<String, ContributorTally>,
    labels: IndexMap<String, Tally>,
    genres: IndexMap<String, Tally>,
    publishers: IndexMap<String, Tally>,
    role_tally: IndexMap<String, usize>,
    derivative_count: usize,
    track_buckets: BucketMap,
    artist_buckets: BucketMap,
}

impl InsightFold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the state
    pub fn observe(&mut self, record: &CanonicalSongRecord) {
        let title = record.title.as_str();
        self.total_songs += 1;

        for contributor in &record.contributors {
            let entry = self.contributors.entry(contributor.name.clone()).or_default();
            entry.tally.record(title);
            for role in &contributor.roles {
                entry.roles.insert(role.clone());
                *self.role_tally.entry(role.clone()).or_insert(0) += 1;
            }
        }

        // Every ordered pair of distinct names on this record
        for first in &record.contributors {
            for second in &record.contributors {
                if first.name != second.name {
                    if let Some(entry) = self.contributors.get_mut(&first.name) {
                        entry.co_contributors.insert(second.name.clone());
                    }
                }
            }
        }

        if let Some(label) = record.label.as_deref().filter(|l| !l.trim().is_empty()) {
            self.labels.entry(label.to_string()).or_default().record(title);
        }

        for genre in &record.genres {
            self.genres.entry(genre.clone()).or_default().record(title);
        }

        for publisher in &record.publishers {
            self.publishers.entry(publisher.clone()).or_default().record(title);
        }

        if !record.derivatives.is_empty() {
            self.derivative_count += 1;
        }

        self.track_buckets
            .entry(PopularityBucket::for_value(record.track_popularity))
            .or_default()
            .push(format_popularity(&record.title, record.track_popularity));
        self.artist_buckets
            .entry(PopularityBucket::for_value(record.artist_popularity))
            .or_default()
            .push(format_popularity(&record.artist, record.artist_popularity));
    }

    /// Append a fold built over the records that follow this one's
    pub fn merge(mut self, other: InsightFold) -> InsightFold {
        self.total_songs += other.total_songs;
        self.derivative_count += other.derivative_count;

        for (name, theirs) in other.contributors {
            let ours = self.contributors.entry(name).or_default();
            ours.tally.absorb(theirs.tally);
            ours.roles.extend(theirs.roles);
            ours.co_contributors.extend(theirs.co_contributors);
        }

        merge_tallies(&mut self.labels, other.labels);
        merge_tallies(&mut self.genres, other.genres);
        merge_tallies(&mut self.publishers, other.publishers);

        for (role, count) in other.role_tally {
            *self.role_tally.entry(role).or_insert(0) += count;
        }

        merge_buckets(&mut self.track_buckets, other.track_buckets);
        merge_buckets(&mut self.artist_buckets, other.artist_buckets);

        self
    }

    /// Produce the aggregate; shared entries require count > 1
    pub fn finish(self) -> AggregateInsights {
        let summary = InsightSummary {
            total_songs: self.total_songs,
            unique_contributors: self.contributors.len(),
            unique_labels: self.labels.len(),
        };

        let co_contributors = self
            .contributors
            .iter()
            .map(|(name, c)| (name.clone(), c.co_contributors.iter().cloned().collect()))
            .collect();

        let contributors = self
            .contributors
            .into_iter()
            .filter(|(_, c)| c.tally.count > 1)
            .map(|(name, c)| SharedContributor {
                name,
                count: c.tally.count,
                roles: c.roles.into_iter().collect(),
                songs: c.tally.songs,
            })
            .collect();

        AggregateInsights {
            summary,
            shared: SharedInsights {
                contributors,
                labels: shared_items(self.labels),
                genres: shared_items(self.genres),
                publishers: shared_items(self.publishers),
            },
            popularity_distribution: PopularityDistribution {
                track: self.track_buckets,
                artist: self.artist_buckets,
            },
            extra_summary: ExtraSummary {
                role_tally: self.role_tally,
                derivative_count: self.derivative_count,
            },
            co_contributors,
        }
    }
}

/// Aggregate a batch sequentially
pub fn aggregate(records: &[CanonicalSongRecord]) -> AggregateInsights {
    let mut fold = InsightFold::new();
    for record in records {
        fold.observe(record);
    }

    let insights = fold.finish();
    log_summary(&insights);
    insights
}

/// Aggregate a batch by folding `chunk_size` chunks in parallel.
///
/// Produces exactly the same result as [`aggregate`].
pub fn aggregate_chunked(records: &[CanonicalSongRecord], chunk_size: usize) -> AggregateInsights {
    let chunk_size = chunk_size.max(1);
    debug!(
        "Aggregating {} records in chunks of {}",
        records.len(),
        chunk_size
    );

    let insights = records
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut fold = InsightFold::new();
            for record in chunk {
                fold.observe(record);
            }
            fold
        })
        .reduce(InsightFold::new, InsightFold::merge)
        .finish();

    log_summary(&insights);
    insights
}

fn log_summary(insights: &AggregateInsights) {
    info!(
        "Batch insights: songs={}, contributors={}, labels={}, shared contributors={}, shared genres={}",
        insights.summary.total_songs,
        insights.summary.unique_contributors,
        insights.summary.unique_labels,
        insights.shared.contributors.len(),
        insights.shared.genres.len()
    );
}

fn format_popularity(name: &str, value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{} ({})", name, v),
        None => format!("{} ({})", name, PopularityBucket::Unknown),
    }
}

fn shared_items(map: IndexMap<String, Tally>) -> Vec<SharedItem> {
    map.into_iter()
        .filter(|(_, t)| t.count > 1)
        .map(|(name, t)| SharedItem {
            name,
            count: t.count,
            songs: t.songs,
        })
        .collect()
}

fn merge_tallies(ours: &mut IndexMap<String, Tally>, theirs: IndexMap<String, Tally>) {
    for (key, tally) in theirs {
        ours.entry(key).or_default().absorb(tally);
    }
}

fn merge_buckets(ours: &mut BucketMap, theirs: BucketMap) {
    for (bucket, entries) in theirs {
        ours.entry(bucket).or_default().extend(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalContributor;
    use sitm_common::ProviderId;

    fn contributor(name: &str, roles: &[&str]) -> CanonicalContributor {
        CanonicalContributor {
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            sources: [ProviderId::Discogs].into_iter().collect(),
        }
    }

    fn song(title: &str, contributors: Vec<CanonicalContributor>) -> CanonicalSongRecord {
        let mut record = CanonicalSongRecord::new("Artist", title);
        record.contributors = contributors;
        record
    }

    #[test]
    fn test_empty_batch() {
        let insights = aggregate(&[]);
        assert_eq!(insights.summary.total_songs, 0);
        assert_eq!(insights.summary.unique_contributors, 0);
        assert!(insights.shared.contributors.is_empty());
        assert!(insights.popularity_distribution.track.is_empty());
        assert!(insights.co_contributors.is_empty());
    }

    #[test]
    fn test_single_record_has_no_shared_items() {
        let mut record = song("One", vec![contributor("X", &["Composer"])]);
        record.label = Some("Label".into());
        record.track_popularity = Some(40);

        let insights = aggregate(&[record]);
        assert_eq!(insights.summary.total_songs, 1);
        assert_eq!(insights.summary.unique_contributors, 1);
        assert_eq!(insights.summary.unique_labels, 1);
        assert!(insights.shared.contributors.is_empty());
        assert!(insights.shared.labels.is_empty());
        assert_eq!(
            insights.popularity_distribution.track[&PopularityBucket::UpTo50],
            vec!["One (40)"]
        );
        assert_eq!(insights.extra_summary.role_tally["Composer"], 1);
    }

    #[test]
    fn test_duplicate_name_on_one_record_counts_twice() {
        let record = song(
            "Dup",
            vec![contributor("X", &["Composer"]), contributor("X", &["Producer"])],
        );

        let insights = aggregate(&[record]);
        assert_eq!(insights.shared.contributors.len(), 1);
        let x = &insights.shared.contributors[0];
        assert_eq!(x.count, 2);
        assert_eq!(x.songs, vec!["Dup", "Dup"]);
        assert_eq!(x.roles, vec!["Composer", "Producer"]);
        // No self-links
        assert!(insights.co_contributors["X"].is_empty());
    }

    #[test]
    fn test_role_tally_counts_every_pair() {
        let records = vec![
            song("A", vec![contributor("X", &["Composer", "Producer"])]),
            song("B", vec![contributor("X", &["Composer"]), contributor("Y", &["Engineer"])]),
        ];

        let insights = aggregate(&records);
        let tally = &insights.extra_summary.role_tally;
        assert_eq!(tally["Composer"], 2);
        assert_eq!(tally["Producer"], 1);
        assert_eq!(tally["Engineer"], 1);
    }

    #[test]
    fn test_co_contributor_adjacency_is_symmetric() {
        let records = vec![
            song("A", vec![contributor("X", &["Composer"]), contributor("Y", &["Producer"])]),
            song("B", vec![contributor("Y", &["Producer"]), contributor("Z", &["Engineer"])]),
        ];

        let insights = aggregate(&records);
        let graph = &insights.co_contributors;
        assert_eq!(graph["X"], vec!["Y"]);
        assert_eq!(graph["Y"], vec!["X", "Z"]);
        assert_eq!(graph["Z"], vec!["Y"]);
    }

    #[test]
    fn test_labels_ignore_missing_and_blank() {
        let mut a = song("A", vec![]);
        a.label = Some("EMI".into());
        let mut b = song("B", vec![]);
        b.label = Some("EMI".into());
        let mut c = song("C", vec![]);
        c.label = Some(" ".into());
        let d = song("D", vec![]);

        let insights = aggregate(&[a, b, c, d]);
        assert_eq!(insights.summary.unique_labels, 1);
        assert_eq!(
            insights.shared.labels,
            vec![SharedItem {
                name: "EMI".into(),
                count: 2,
                songs: vec!["A".into(), "B".into()],
            }]
        );
    }

    #[test]
    fn test_unknown_popularity_bucket() {
        let mut record = song("Quiet", vec![]);
        record.artist_popularity = Some(0);

        let insights = aggregate(&[record]);
        let dist = &insights.popularity_distribution;
        assert_eq!(dist.track[&PopularityBucket::Unknown], vec!["Quiet (Unknown)"]);
        assert!(!dist.track.contains_key(&PopularityBucket::UpTo25));
        assert_eq!(dist.artist[&PopularityBucket::UpTo25], vec!["Artist (0)"]);
    }

    #[test]
    fn test_chunked_matches_sequential() {
        let mut records = Vec::new();
        for i in 0..25 {
            let mut r = song(
                &format!("Song {}", i),
                vec![
                    contributor(&format!("C{}", i % 4), &["Composer"]),
                    contributor(&format!("P{}", i % 3), &["Producer", "Engineer"]),
                ],
            );
            r.genres.insert(format!("g{}", i % 5));
            r.publishers.push(format!("pub{}", i % 2));
            r.label = (i % 3 == 0).then(|| "Label".to_string());
            r.track_popularity = (i % 7 != 0).then_some((i * 4) as u8);
            records.push(r);
        }

        let sequential = aggregate(&records);
        for chunk in [1, 2, 7, 25, 100] {
            assert_eq!(aggregate_chunked(&records, chunk), sequential, "chunk size {}", chunk);
        }
        assert_eq!(aggregate_chunked(&records, 0), sequential);
    }
}
