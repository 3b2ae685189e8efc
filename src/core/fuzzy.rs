//! Near-miss suggestions for path segments that do not name a field.

use crate::core::schema::Type;

/// Edits below this distance count as a suggestion.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Outcome of resolving the last segment of a path against its parent type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    Suggestions(Vec<String>),
    NotFound,
}

/// Field names of `parent` within [`MAX_SUGGESTION_DISTANCE`] edits of
/// `segment`, in declaration order.
pub fn suggest(parent: &Type, segment: &str) -> Vec<String> {
    parent
        .fields()
        .iter()
        .filter(|f| levenshtein(segment, &f.name) < MAX_SUGGESTION_DISTANCE)
        .map(|f| f.name.clone())
        .collect()
}

pub fn resolve(parent: &Type, segment: &str) -> Resolution {
    if parent.fields().iter().any(|f| f.name == segment) {
        return Resolution::Exact;
    }
    let matches = suggest(parent, segment);
    if matches.is_empty() {
        Resolution::NotFound
    } else {
        Resolution::Suggestions(matches)
    }
}

/// Character-level Levenshtein distance (two-row dynamic programming).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();
    if n == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, c) in a.chars().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = if c == b_chars[j - 1] { 0 } else { 1 };
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            let substitution = prev[j - 1] + cost;
            curr[j] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
