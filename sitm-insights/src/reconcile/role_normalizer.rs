// Role Normalizer
//
// Concept: Canonicalize free-text contribution roles to a fixed vocabulary
// Synchronization: Used by ContributorMerger and FlagGenerator
//
// Algorithm:
// 1. Trim and lower-case the raw role; blank input has no role
// 2. Scan the keyword table in order; first keyword contained in the input wins
// 3. Otherwise capitalize the first character of the lower-cased input

/// Keyword → canonical role, tested in this order.
///
/// Order is significant: "Producer, Engineer" resolves to Producer.
const ROLE_KEYWORDS: &[(&str, &str)] = &[
    ("lyrics", "Lyricist"),
    ("composer", "Composer"),
    ("written", "Composer"),
    ("producer", "Producer"),
    ("engineer", "Engineer"),
    ("vocals", "Vocalist"),
    ("guitar", "Guitar"),
];

/// Canonical roles denoting authorship of musical or lyrical content
pub const WRITER_CLASS_ROLES: &[&str] = &["Composer", "Lyricist", "Writer"];

/// Normalize a raw provider role. `None` means "no role recorded".
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();

    if let Some((_, canonical)) = ROLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
    {
        return Some((*canonical).to_string());
    }

    Some(capitalize_first(&lower))
}

/// True for canonical roles in the writer class
pub fn is_writer_class(canonical: &str) -> bool {
    WRITER_CLASS_ROLES.contains(&canonical)
}

/// Upper-case only the first character (not title case)
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
