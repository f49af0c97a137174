//! # Fuzzy Matching
//!
//! Subsequence ranking for the selection lists, built on the skim scorer
//! from `fuzzy-matcher`. A candidate matches when every query character
//! appears in it, in order. Word boundaries, camel-case humps and
//! consecutive runs score higher; gaps score lower.
//!
//! Ranking is a pure function of the candidates and the query: equal scores
//! keep their original relative order.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

fn matcher(case_sensitive: bool) -> SkimMatcherV2 {
    let matcher = SkimMatcherV2::default();
    if case_sensitive {
        matcher.respect_case()
    } else {
        matcher.ignore_case()
    }
}

/// Score `candidate` against `query`. `None` when the query is not a
/// subsequence of the candidate.
pub fn score(candidate: &str, query: &str, case_sensitive: bool) -> Option<i64> {
    matcher(case_sensitive).fuzzy_match(candidate, query)
}

/// Rank `labels` against `query`, returning indices into `labels`.
///
/// An empty query returns every index in original order. Otherwise
/// non-matching labels are dropped and the rest are ordered by descending
/// score, ties by original position.
pub fn rank<S: AsRef<str>>(labels: &[S], query: &str, case_sensitive: bool) -> Vec<usize> {
    if query.is_empty() {
        return (0..labels.len()).collect();
    }
    let matcher = matcher(case_sensitive);
    let mut scored: Vec<(usize, i64)> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| matcher.fuzzy_match(label.as_ref(), query).map(|s| (i, s)))
        .collect();
    // Stable sort: equal scores keep original order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(i, _)| i).collect()
}
