//! Keyword-overlap retrieval over the fragment store.
//!
//! # Algorithm
//!
//! 1. Lowercase the question, split on whitespace, strip punctuation from
//!    both ends of each token, and keep tokens longer than
//!    `min_keyword_len` characters. Repeated tokens are kept.
//! 2. Score each fragment by the number of keywords that occur as a
//!    substring of its lowercased content. A keyword counts at most once
//!    per fragment, however often it appears.
//! 3. Drop fragments that score zero.
//! 4. Sort by descending score. The sort is stable, so equal scores keep
//!    their insertion order.
//! 5. Keep the first `top_k`.
//!
//! An empty result means there is nothing to ground an answer on; the
//! caller must not contact the model in that case.

use crate::config::RetrievalConfig;
use crate::models::{Fragment, ScoredFragment};

/// Extracts the scoring keywords from a question.
pub fn extract_keywords(question: &str, min_keyword_len: usize) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|token| token.chars().count() > min_keyword_len)
        .map(str::to_string)
        .collect()
}

/// Number of keywords found in `content`. Keywords must already be lowercase.
pub fn score_fragment(content: &str, keywords: &[String]) -> usize {
    let content_lower = content.to_lowercase();
    keywords
        .iter()
        .filter(|kw| content_lower.contains(kw.as_str()))
        .count()
}

/// Ranks `fragments` against `question` and returns at most `top_k` hits.
pub fn retrieve(
    question: &str,
    fragments: &[Fragment],
    params: &RetrievalConfig,
) -> Vec<ScoredFragment> {
    let keywords = extract_keywords(question, params.min_keyword_len);
    if keywords.is_empty() || fragments.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredFragment> = fragments
        .iter()
        .filter_map(|fragment| {
            let score = score_fragment(&fragment.content, &keywords);
            (score > 0).then(|| ScoredFragment {
                fragment: fragment.clone(),
                score,
            })
        })
        .collect();

    // `sort_by` is stable: ties stay in store order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(params.top_k);

    tracing::debug!(
        keywords = keywords.len(),
        candidates = fragments.len(),
        hits = scored.len(),
        "retrieval complete"
    );
    scored
}
