//! Relationship index use-case service.
//!
//! # Responsibility
//! - Validate edge writes (irreflexive `follows`) before they reach storage.
//! - Provide forward, inverse and degree queries over the edge set.
//! - Offer named views (followers, liked-by, ...) built from those queries.
//!
//! # Invariants
//! - Every view is derived from the one authoritative edge set per kind;
//!   `followers(b)` is `inverse_neighbors(Follows, b)`, never stored.
//! - Add and remove are idempotent and report whether the set changed.
//! - Queries on ids that do not exist return empty sets, not errors.

use crate::model::edge::{Edge, EdgeDirection, EdgeKind, EdgeState};
use crate::model::publication::PublicationId;
use crate::model::publisher::PublisherId;
use crate::model::tag::TagId;
use crate::repo::edge_repo::EdgeRepository;
use crate::service::{GraphError, GraphResult};
use log::debug;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Relationship index facade over repository implementations.
pub struct RelationshipService<R: EdgeRepository> {
    repo: R,
}

impl<R: EdgeRepository> RelationshipService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records `from -kind-> to` after validating both endpoints.
    ///
    /// # Errors
    /// - `InvalidOperation` for a self-follow.
    /// - `NotFound` when either endpoint is missing from its store.
    pub fn add_edge(&self, kind: EdgeKind, from: Uuid, to: Uuid) -> GraphResult<EdgeState> {
        if kind.is_irreflexive() && from == to {
            return Err(GraphError::InvalidOperation(format!(
                "{kind} edge from {from} to itself is not allowed"
            )));
        }

        let edge = Edge::new(kind, from, to);
        let changed = self.repo.insert_edge(edge)?;
        debug!(
            "event=edge_add module=graph status=ok kind={} changed={}",
            kind, changed
        );
        Ok(EdgeState {
            edge,
            present: true,
            changed,
        })
    }

    /// Removes `from -kind-> to` if present. Never fails on absence.
    pub fn remove_edge(&self, kind: EdgeKind, from: Uuid, to: Uuid) -> GraphResult<EdgeState> {
        let edge = Edge::new(kind, from, to);
        let changed = self.repo.delete_edge(edge)?;
        debug!(
            "event=edge_remove module=graph status=ok kind={} changed={}",
            kind, changed
        );
        Ok(EdgeState {
            edge,
            present: false,
            changed,
        })
    }

    pub fn contains(&self, kind: EdgeKind, from: Uuid, to: Uuid) -> GraphResult<bool> {
        Ok(self.repo.contains_edge(Edge::new(kind, from, to))?)
    }

    /// Forward traversal: every `to` with `from -kind-> to`.
    pub fn neighbors(&self, kind: EdgeKind, from: Uuid) -> GraphResult<BTreeSet<Uuid>> {
        Ok(self.repo.targets_of(kind, from)?)
    }

    /// Backward traversal: every `from` with `from -kind-> to`.
    pub fn inverse_neighbors(&self, kind: EdgeKind, to: Uuid) -> GraphResult<BTreeSet<Uuid>> {
        Ok(self.repo.sources_of(kind, to)?)
    }

    /// Neighbor count in one direction, without materializing the set.
    pub fn degree(&self, kind: EdgeKind, id: Uuid, direction: EdgeDirection) -> GraphResult<u64> {
        Ok(self.repo.count_edges(kind, id, direction)?)
    }

    /// Total edges per kind, in `EdgeKind::ALL` order.
    pub fn edge_counts(&self) -> GraphResult<Vec<(EdgeKind, u64)>> {
        EdgeKind::ALL
            .into_iter()
            .map(|kind| -> GraphResult<(EdgeKind, u64)> {
                Ok((kind, self.repo.count_kind(kind)?))
            })
            .collect()
    }

    pub fn follow(&self, follower: PublisherId, followed: PublisherId) -> GraphResult<EdgeState> {
        self.add_edge(EdgeKind::Follows, follower, followed)
    }

    pub fn unfollow(&self, follower: PublisherId, followed: PublisherId) -> GraphResult<EdgeState> {
        self.remove_edge(EdgeKind::Follows, follower, followed)
    }

    /// Publishers `publisher` follows.
    pub fn following(&self, publisher: PublisherId) -> GraphResult<BTreeSet<PublisherId>> {
        self.neighbors(EdgeKind::Follows, publisher)
    }

    /// Publishers following `publisher`.
    pub fn followers(&self, publisher: PublisherId) -> GraphResult<BTreeSet<PublisherId>> {
        self.inverse_neighbors(EdgeKind::Follows, publisher)
    }

    pub fn follower_count(&self, publisher: PublisherId) -> GraphResult<u64> {
        self.degree(EdgeKind::Follows, publisher, EdgeDirection::Inbound)
    }

    pub fn following_count(&self, publisher: PublisherId) -> GraphResult<u64> {
        self.degree(EdgeKind::Follows, publisher, EdgeDirection::Outbound)
    }

    pub fn favourite(
        &self,
        publisher: PublisherId,
        publication: PublicationId,
    ) -> GraphResult<EdgeState> {
        self.add_edge(EdgeKind::Favourites, publisher, publication)
    }

    pub fn unfavourite(
        &self,
        publisher: PublisherId,
        publication: PublicationId,
    ) -> GraphResult<EdgeState> {
        self.remove_edge(EdgeKind::Favourites, publisher, publication)
    }

    pub fn favourites_of(&self, publisher: PublisherId) -> GraphResult<BTreeSet<PublicationId>> {
        self.neighbors(EdgeKind::Favourites, publisher)
    }

    pub fn favourited_by(
        &self,
        publication: PublicationId,
    ) -> GraphResult<BTreeSet<PublisherId>> {
        self.inverse_neighbors(EdgeKind::Favourites, publication)
    }

    pub fn like(&self, publisher: PublisherId, publication: PublicationId) -> GraphResult<EdgeState> {
        self.add_edge(EdgeKind::Likes, publisher, publication)
    }

    pub fn unlike(
        &self,
        publisher: PublisherId,
        publication: PublicationId,
    ) -> GraphResult<EdgeState> {
        self.remove_edge(EdgeKind::Likes, publisher, publication)
    }

    pub fn likes_of(&self, publisher: PublisherId) -> GraphResult<BTreeSet<PublicationId>> {
        self.neighbors(EdgeKind::Likes, publisher)
    }

    pub fn liked_by(&self, publication: PublicationId) -> GraphResult<BTreeSet<PublisherId>> {
        self.inverse_neighbors(EdgeKind::Likes, publication)
    }

    pub fn like_count(&self, publication: PublicationId) -> GraphResult<u64> {
        self.degree(EdgeKind::Likes, publication, EdgeDirection::Inbound)
    }

    pub fn mention(
        &self,
        publication: PublicationId,
        publisher: PublisherId,
    ) -> GraphResult<EdgeState> {
        self.add_edge(EdgeKind::Mentions, publication, publisher)
    }

    /// Publishers mentioned by `publication`.
    pub fn mentions_in(&self, publication: PublicationId) -> GraphResult<BTreeSet<PublisherId>> {
        self.neighbors(EdgeKind::Mentions, publication)
    }

    /// Publications mentioning `publisher`.
    pub fn publications_mentioning(
        &self,
        publisher: PublisherId,
    ) -> GraphResult<BTreeSet<PublicationId>> {
        self.inverse_neighbors(EdgeKind::Mentions, publisher)
    }

    pub fn tag_publication(&self, publication: PublicationId, tag: TagId) -> GraphResult<EdgeState> {
        self.add_edge(EdgeKind::HasTag, publication, tag)
    }

    pub fn untag_publication(
        &self,
        publication: PublicationId,
        tag: TagId,
    ) -> GraphResult<EdgeState> {
        self.remove_edge(EdgeKind::HasTag, publication, tag)
    }

    pub fn tags_of(&self, publication: PublicationId) -> GraphResult<BTreeSet<TagId>> {
        self.neighbors(EdgeKind::HasTag, publication)
    }

    pub fn publications_with_tag(&self, tag: TagId) -> GraphResult<BTreeSet<PublicationId>> {
        self.inverse_neighbors(EdgeKind::HasTag, tag)
    }
}
