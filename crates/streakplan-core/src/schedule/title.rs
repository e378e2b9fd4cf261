//! Title normalization and the keyword checks built on it.

use chrono::Weekday;
use similar::{DiffTag, TextDiff};

/// Character similarity above which two titles count as duplicates.
pub const SIMILARITY_THRESHOLD: f32 = 0.8;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "to", "for", "in", "on", "at", "with", "my", "your", "by",
    "from", "is", "be",
];

/// Token prefixes that mark a task as needing photographable evidence.
const PROOF_KEYWORDS: &[&str] = &[
    "workout", "meal", "progress", "photo", "weigh", "run", "lift", "gym", "ride", "swim", "selfie",
    "video", "record",
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Lowercase, replace punctuation with spaces, drop stopwords and collapse
/// whitespace. A title made only of stopwords keeps them.
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();

    let kept: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect();
    if kept.is_empty() {
        return cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    kept.join(" ")
}

/// Equal or near-equal after normalization.
pub fn is_duplicate(a: &str, b: &str) -> bool {
    normalized_duplicate(&normalize_title(a), &normalize_title(b))
}

/// [`is_duplicate`] for titles that are already normalized.
pub fn normalized_duplicate(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.is_empty() || b.is_empty() {
        return false;
    }
    similarity(a, b) > SIMILARITY_THRESHOLD
}

/// Matched characters over the length of the longer string.
///
/// Unlike `TextDiff::ratio`, which divides by the mean length, every
/// inserted or deleted character costs as much as a substitution, so the
/// score tracks an edit-distance ratio.
pub fn similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let diff = TextDiff::from_chars(a, b);
    let matched: usize = diff
        .ops()
        .iter()
        .filter(|op| op.tag() == DiffTag::Equal)
        .map(|op| op.old_range().len())
        .sum();
    matched as f32 / longest as f32
}

/// Whether the title mentions something that should be proven with a photo.
pub fn requires_realtime_proof(title: &str) -> bool {
    normalize_title(title)
        .split(' ')
        .any(|token| PROOF_KEYWORDS.iter().any(|kw| token.starts_with(kw)))
}

/// First weekday named in the title, accepting plurals ("mondays").
pub fn mentioned_weekday(title: &str) -> Option<Weekday> {
    normalize_title(title).split(' ').find_map(|token| {
        let singular = token.strip_suffix('s').unwrap_or(token);
        WEEKDAYS
            .iter()
            .find(|(name, _)| *name == token || *name == singular)
            .map(|(_, day)| *day)
    })
}
