//! Mention and hashtag extraction from publication bodies.
//!
//! # Invariants
//! - `@` and `#` only start a token at the beginning of the body or after a
//!   character that cannot be part of a word, so `me@example.com` is not a
//!   mention and `C#` is not a tag.
//! - Results are deduplicated case-insensitively and sorted.

use crate::model::tag::normalize_tag_name;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w@])@(\w(?:[\w.-]*\w)?)").expect("valid mention regex")
});
static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w#])#(\w+)").expect("valid hashtag regex"));

/// Handles referenced with `@handle`, lowercased.
pub fn extract_mentions(body: &str) -> Vec<String> {
    let unique: BTreeSet<String> = MENTION_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()))
        .collect();
    unique.into_iter().collect()
}

/// Tag names referenced with `#tag`, normalized.
pub fn extract_hashtags(body: &str) -> Vec<String> {
    let unique: BTreeSet<String> = HASHTAG_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).and_then(|m| normalize_tag_name(m.as_str())))
        .collect();
    unique.into_iter().collect()
}
