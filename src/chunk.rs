//! Paragraph-boundary text chunker.
//!
//! Splits extracted document text into [`Fragment`]s on blank lines. Any
//! whitespace run that contains at least one empty line is a boundary;
//! fragments that are empty after trimming are dropped.
//!
//! Fragment ids are `<document id>-<index>` where the index counts only
//! surviving fragments, so the same text always produces the same ids.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Fragment;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

/// Split text into fragments on paragraph boundaries.
/// Returns an empty vector when the text has no non-blank paragraph.
pub fn chunk_text(document_id: &str, document_name: &str, text: &str) -> Vec<Fragment> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .enumerate()
        .map(|(index, para)| Fragment {
            id: format!("{}-{}", document_id, index),
            source: document_name.to_string(),
            content: para.to_string(),
        })
        .collect()
}
