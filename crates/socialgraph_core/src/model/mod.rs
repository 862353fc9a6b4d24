//! Domain model for the social graph.
//!
//! # Responsibility
//! - Define entity records stored by the publisher/publication/tag stores.
//! - Define the edge vocabulary shared by the relationship index.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID assigned on creation.
//! - Entities never embed references to each other beyond `author_id`;
//!   all other relations live in the edge set.

pub mod edge;
pub mod publication;
pub mod publisher;
pub mod tag;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Entity families addressable by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Publisher,
    Publication,
    Tag,
}

impl EntityKind {
    /// Table that stores rows of this entity kind.
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Publisher => "publishers",
            Self::Publication => "publications",
            Self::Tag => "tags",
        }
    }
}

/// Typed reference to something a caller asked for.
///
/// Used by not-found errors so callers can tell which endpoint was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Publisher(Uuid),
    Publication(Uuid),
    Tag(Uuid),
    /// External account reference resolved through the account collaborator.
    Account(String),
}

impl EntityRef {
    /// Builds a reference for an id of the given entity kind.
    pub fn of(kind: EntityKind, id: Uuid) -> Self {
        match kind {
            EntityKind::Publisher => Self::Publisher(id),
            EntityKind::Publication => Self::Publication(id),
            EntityKind::Tag => Self::Tag(id),
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Publisher(id) => write!(f, "publisher {id}"),
            Self::Publication(id) => write!(f, "publication {id}"),
            Self::Tag(id) => write!(f, "tag {id}"),
            Self::Account(account_ref) => write!(f, "account `{account_ref}`"),
        }
    }
}

/// Current Unix time in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
