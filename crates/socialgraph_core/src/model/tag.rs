//! Tag domain model.
//!
//! # Invariants
//! - `name` is stored normalized: trimmed, without leading `#`, lowercase.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tag identifier.
pub type TagId = Uuid;

/// Label attachable to publications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub created_at: i64,
    /// Last time the tag was attached to a publication.
    pub last_used_at: Option<i64>,
}

/// Normalizes one tag name. Returns `None` for blank input.
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
