//! Edge vocabulary for the relationship index.
//!
//! # Responsibility
//! - Name the five directed relation kinds and their endpoint entity kinds.
//! - Provide the stable storage labels used in the `edges` table.
//!
//! # Invariants
//! - Each kind has exactly one authoritative edge set; inverse views are
//!   queries over that set, never a second stored relation.
//! - `follows` is the only kind whose endpoints share an entity kind, and it
//!   is irreflexive.

use super::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Directed relation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Publisher follows publisher.
    Follows,
    /// Publisher favourited publication.
    Favourites,
    /// Publisher liked publication.
    Likes,
    /// Publication mentions publisher.
    Mentions,
    /// Publication carries tag.
    HasTag,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 5] = [
        EdgeKind::Follows,
        EdgeKind::Favourites,
        EdgeKind::Likes,
        EdgeKind::Mentions,
        EdgeKind::HasTag,
    ];

    /// Entity kind of the `from` endpoint.
    pub fn source_kind(self) -> EntityKind {
        match self {
            Self::Follows | Self::Favourites | Self::Likes => EntityKind::Publisher,
            Self::Mentions | Self::HasTag => EntityKind::Publication,
        }
    }

    /// Entity kind of the `to` endpoint.
    pub fn target_kind(self) -> EntityKind {
        match self {
            Self::Follows | Self::Mentions => EntityKind::Publisher,
            Self::Favourites | Self::Likes => EntityKind::Publication,
            Self::HasTag => EntityKind::Tag,
        }
    }

    /// Whether an edge from an entity to itself is forbidden.
    pub fn is_irreflexive(self) -> bool {
        matches!(self, Self::Follows)
    }

    /// Storage label in `edges.kind`.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Follows => "follows",
            Self::Favourites => "favourites",
            Self::Likes => "likes",
            Self::Mentions => "mentions",
            Self::HasTag => "has_tag",
        }
    }

    /// Parses a storage label.
    pub fn from_db_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_db_str() == value)
    }
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Traversal direction relative to the queried id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Edges whose `from` is the queried id.
    Outbound,
    /// Edges whose `to` is the queried id.
    Inbound,
}

/// One directed relationship instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub from: Uuid,
    pub to: Uuid,
}

impl Edge {
    pub fn new(kind: EdgeKind, from: Uuid, to: Uuid) -> Self {
        Self { kind, from, to }
    }
}

/// Result of an add/remove call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeState {
    pub edge: Edge,
    /// Whether the edge is in the set after the call.
    pub present: bool,
    /// Whether this call changed the set.
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::EdgeKind;
    use crate::model::EntityKind;

    #[test]
    fn db_labels_roundtrip_for_every_kind() {
        for kind in EdgeKind::ALL {
            assert_eq!(EdgeKind::from_db_str(kind.as_db_str()), Some(kind));
        }
        assert_eq!(EdgeKind::from_db_str("followed_by"), None);
    }

    #[test]
    fn endpoint_kinds_match_relation_shape() {
        assert_eq!(EdgeKind::Follows.source_kind(), EntityKind::Publisher);
        assert_eq!(EdgeKind::Follows.target_kind(), EntityKind::Publisher);
        assert_eq!(EdgeKind::Mentions.source_kind(), EntityKind::Publication);
        assert_eq!(EdgeKind::Mentions.target_kind(), EntityKind::Publisher);
        assert_eq!(EdgeKind::HasTag.target_kind(), EntityKind::Tag);
        assert!(EdgeKind::Follows.is_irreflexive());
        assert!(!EdgeKind::Likes.is_irreflexive());
    }
}
