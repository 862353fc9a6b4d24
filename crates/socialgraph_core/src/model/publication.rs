//! Publication domain model.
//!
//! # Invariants
//! - `author_id` and `created_at` never change after creation.
//! - `body` is never blank.

use super::publisher::PublisherId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable publication identifier.
pub type PublicationId = Uuid;

/// A single post authored by one publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    pub author_id: PublisherId,
    pub body: String,
    /// Unix epoch milliseconds, immutable.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last body change.
    pub updated_at: i64,
}

impl Publication {
    /// Creates a publication with a generated id and current timestamps.
    pub fn new(author_id: PublisherId, body: impl Into<String>) -> Self {
        let now = super::now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            author_id,
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a publication.
///
/// `author_id` is accepted only so callers that echo the full record back
/// get a clear error when it differs from the stored author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationPatch {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author_id: Option<PublisherId>,
}
