// Flag Generator
//
// Concept: Advisory rule engine comparing provider views of the same song
// Synchronization: Accepts SongFragments + resolved derivatives, outputs InsightFlag list
//
// Each rule is independent and additive. Rules never fail and never block
// assembly; a rule that finds nothing to report returns None.

use super::role_normalizer;
use crate::types::{
    CanonicalDerivative, FlagDetails, FlagKind, InsightFlag, ProviderFragment, SongFragments,
};
use indexmap::IndexSet;
use sitm_common::config::ProviderPriority;
use sitm_common::ProviderId;
use tracing::debug;

/// Inputs visible to every flag rule
pub struct FlagContext<'a> {
    pub fragments: &'a SongFragments,
    pub priority: &'a ProviderPriority,
    pub derivatives: &'a [CanonicalDerivative],
}

impl<'a> FlagContext<'a> {
    /// Fragment for `provider`; `None` when the provider reported nothing
    fn fragment(&self, provider: ProviderId) -> Option<&'a ProviderFragment> {
        self.fragments.fragment(provider)
    }
}

/// One advisory rule
pub trait FlagRule: Send + Sync {
    /// Rule identifier for logging
    fn name(&self) -> &'static str;

    /// Evaluate the rule; `None` means nothing to flag
    fn evaluate(&self, ctx: &FlagContext<'_>) -> Option<InsightFlag>;
}

/// True if `raw` denotes a writer-class role in `provider`'s vocabulary
///
/// - Discogs credits: substring "songwriter" or "lyrics"
/// - MusicBrainz relations: exactly composer, lyricist or writer
/// - Others: normalized role is writer-class
pub fn is_writer_role(provider: ProviderId, raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    match provider {
        ProviderId::Discogs => lower.contains("songwriter") || lower.contains("lyrics"),
        ProviderId::MusicBrainz => matches!(lower.as_str(), "composer" | "lyricist" | "writer"),
        _ => role_normalizer::normalize(Some(raw))
            .is_some_and(|role| role_normalizer::is_writer_class(&role)),
    }
}

/// Names a provider tags with a writer-class role, in first-seen order
pub fn writer_names(provider: ProviderId, fragment: Option<&ProviderFragment>) -> IndexSet<String> {
    let Some(fragment) = fragment else {
        return IndexSet::new();
    };

    fragment
        .contributors
        .iter()
        .filter(|c| c.role.as_deref().is_some_and(|r| is_writer_role(provider, r)))
        .filter_map(|c| c.name.as_deref().map(str::trim))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Rules
// ============================================================================

/// Writer sets of the two compared providers are both present and differ
pub struct ConflictingWriterRule;

impl FlagRule for ConflictingWriterRule {
    fn name(&self) -> &'static str {
        "conflicting_writers"
    }

    fn evaluate(&self, ctx: &FlagContext<'_>) -> Option<InsightFlag> {
        let [a, b] = ctx.priority.writer_comparison;
        let writers_a = writer_names(a, ctx.fragment(a));
        let writers_b = writer_names(b, ctx.fragment(b));

        // Absence is not evidence of conflict
        if writers_a.is_empty() || writers_b.is_empty() {
            return None;
        }

        // IndexSet equality is set equality
        if writers_a == writers_b {
            return None;
        }

        let mut details = FlagDetails::new();
        details.insert(a, writers_a.into_iter().collect());
        details.insert(b, writers_b.into_iter().collect());

        Some(
            InsightFlag::new(
                FlagKind::ConflictingInfo,
                format!(
                    "Contributor information differs between {} and {}",
                    a.display_name(),
                    b.display_name()
                ),
            )
            .with_details(details),
        )
    }
}

/// No publisher-reporting provider lists a publisher
pub struct MissingPublisherRule;

impl FlagRule for MissingPublisherRule {
    fn name(&self) -> &'static str {
        "missing_publisher"
    }

    fn evaluate(&self, ctx: &FlagContext<'_>) -> Option<InsightFlag> {
        let any_publisher = ctx
            .priority
            .publishers
            .iter()
            .filter_map(|p| ctx.fragment(*p))
            .any(|f| !f.publishers.is_empty());

        (!any_publisher).then(|| {
            InsightFlag::new(FlagKind::MissingPublisher, "Publisher information missing")
        })
    }
}

/// No contributor-reporting provider names a writer
pub struct MissingSongwriterRule;

impl FlagRule for MissingSongwriterRule {
    fn name(&self) -> &'static str {
        "missing_songwriter"
    }

    fn evaluate(&self, ctx: &FlagContext<'_>) -> Option<InsightFlag> {
        let any_writer = ctx
            .priority
            .contributors
            .iter()
            .any(|p| !writer_names(*p, ctx.fragment(*p)).is_empty());

        (!any_writer).then(|| {
            InsightFlag::new(FlagKind::MissingSongwriter, "No songwriter data available")
        })
    }
}

/// Works provider reports no ISWC
pub struct MissingIswcRule;

impl FlagRule for MissingIswcRule {
    fn name(&self) -> &'static str {
        "missing_iswc"
    }

    fn evaluate(&self, ctx: &FlagContext<'_>) -> Option<InsightFlag> {
        let has_iswc = ctx
            .fragment(ctx.priority.works)
            .and_then(|f| f.iswc.as_deref())
            .is_some_and(|iswc| !iswc.trim().is_empty());

        (!has_iswc).then(|| InsightFlag::new(FlagKind::MissingIswc, "Missing ISWC code"))
    }
}

/// No related works resolved for the song
pub struct NoDerivativesRule;

impl FlagRule for NoDerivativesRule {
    fn name(&self) -> &'static str {
        "no_derivatives"
    }

    fn evaluate(&self, ctx: &FlagContext<'_>) -> Option<InsightFlag> {
        ctx.derivatives.is_empty().then(|| {
            InsightFlag::new(
                FlagKind::NoDerivatives,
                "No derivative works found; potential orphan work",
            )
        })
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Ordered rule set; rule order is flag emission order
pub struct FlagGenerator {
    rules: Vec<Box<dyn FlagRule>>,
}

impl Default for FlagGenerator {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ConflictingWriterRule),
            Box::new(MissingPublisherRule),
            Box::new(MissingSongwriterRule),
            Box::new(MissingIswcRule),
            Box::new(NoDerivativesRule),
        ])
    }
}

impl FlagGenerator {
    pub fn new(rules: Vec<Box<dyn FlagRule>>) -> Self {
        Self { rules }
    }

    /// Only the cross-provider writer and publisher rules
    pub fn cross_provider() -> Self {
        Self::new(vec![
            Box::new(ConflictingWriterRule),
            Box::new(MissingPublisherRule),
        ])
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: Box<dyn FlagRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Evaluate every rule in order
    pub fn generate(&self, ctx: &FlagContext<'_>) -> Vec<InsightFlag> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let flag = rule.evaluate(ctx);
                if flag.is_some() {
                    debug!(
                        "Flag rule '{}' fired for {} - {}",
                        rule.name(),
                        ctx.fragments.artist,
                        ctx.fragments.title
                    );
                }
                flag
            })
            .collect()
    }
}
