//! # Search & Highlight Engine
//!
//! Literal multi-keyword matching over already-lowercased text, producing
//! merged highlight intervals, plus the relevance sort keys used by the
//! post listing pipeline. Everything here is deterministic and
//! side-effect free; each request builds and discards its own spans.

use serde::Serialize;
use std::collections::BTreeSet;

/// A `[start, end)` byte span marking a keyword match within a text field.
/// Offsets index the lowercased text the match ran over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Normalize a raw keyword string: whitespace-split, lowercase, dedupe.
pub fn split_keywords(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

/// Locate every non-overlapping occurrence of each keyword in `text` and
/// merge the hits into the minimal ordered set of highlight spans.
///
/// Two spans merge when they touch or overlap, or when the text strictly
/// between them is whitespace-only — adjacent matches separated by spaces
/// read as one highlighted phrase. Caller lowercases both sides.
pub fn find_matching_intervals(text: &str, keywords: &BTreeSet<String>) -> Vec<Span> {
    let mut intervals = Vec::new();
    for keyword in keywords {
        if keyword.is_empty() {
            continue;
        }
        let mut cursor = 0;
        while let Some(offset) = text[cursor..].find(keyword.as_str()) {
            let start = cursor + offset;
            let end = start + keyword.len();
            intervals.push(Span::new(start, end));
            cursor = end;
        }
    }

    if intervals.len() < 2 {
        return intervals;
    }

    intervals.sort_by_key(|span| span.start);
    let mut merged: Vec<Span> = vec![intervals[0]];
    for span in intervals.into_iter().skip(1) {
        let previous = merged.last_mut().expect("merged is non-empty");
        let gap_is_blank = span.start <= previous.end
            || text[previous.end..span.start].trim().is_empty();
        if gap_is_blank {
            previous.end = previous.end.max(span.end);
        } else {
            merged.push(span);
        }
    }
    merged
}

/// The 4-tuple relevance key for keyword-ordered listings: longest single
/// match, longest title match, longest content match, total span count.
///
/// An empty span list contributes a sentinel length of 1 so that posts
/// without a match in one field do not tie at zero.
pub fn longest_matched_text(
    title_highlights: &[Span],
    content_highlights: &[Span],
) -> (usize, usize, usize, usize) {
    let longest = |spans: &[Span]| spans.iter().map(Span::len).max().unwrap_or(1).max(1);
    let longest_title = longest(title_highlights);
    let longest_content = longest(content_highlights);
    (
        longest_title.max(longest_content),
        longest_title,
        longest_content,
        title_highlights.len() + content_highlights.len(),
    )
}

/// Number of `tags` that appear in `wanted`; the sort key for tag-scoped
/// relevance ordering.
pub fn matched_tag_count(tags: &BTreeSet<String>, wanted: &[String]) -> usize {
    tags.iter().filter(|tag| wanted.contains(tag)).count()
}
