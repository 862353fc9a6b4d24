//! Request/response contract for presentation collaborators.
//!
//! # Responsibility
//! - Name every graph operation as one serializable request variant.
//! - Return a uniform envelope carrying either a payload or a typed error.
//!
//! # Invariants
//! - `GraphSession::handle` never panics and never returns a partial
//!   result: each request maps to exactly one atomic operation.
//! - Error `kind` values are stable snake_case strings.

use crate::account::AccountResolver;
use crate::logging::sanitize_message;
use crate::model::edge::{EdgeDirection, EdgeKind, EdgeState};
use crate::model::publication::{Publication, PublicationPatch};
use crate::model::publisher::{Publisher, PublisherPatch};
use crate::model::tag::Tag;
use crate::service::{ErrorKind, GraphError, GraphResult};
use crate::session::GraphSession;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use uuid::Uuid;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

/// One graph operation with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GraphRequest {
    CreatePublisher {
        #[serde(default)]
        account_ref: Option<String>,
        handle: String,
    },
    GetPublisher {
        id: Uuid,
    },
    FindPublisherByHandle {
        handle: String,
    },
    FindPublisherByAccount {
        account_ref: String,
    },
    ListPublishers,
    UpdatePublisher {
        id: Uuid,
        patch: PublisherPatch,
    },
    DeletePublisher {
        id: Uuid,
    },
    CreatePublication {
        author_id: Uuid,
        body: String,
    },
    GetPublication {
        id: Uuid,
    },
    ListPublicationsByAuthor {
        author_id: Uuid,
    },
    ListPublicationsByTag {
        tag_id: Uuid,
    },
    ListPublicationsMentioning {
        publisher_id: Uuid,
    },
    UpdatePublication {
        id: Uuid,
        patch: PublicationPatch,
    },
    DeletePublication {
        id: Uuid,
    },
    GetOrCreateTag {
        name: String,
    },
    GetTag {
        id: Uuid,
    },
    FindTagByName {
        name: String,
    },
    ListTags,
    RecentTags {
        days: u32,
    },
    TagsUsedSince {
        since_epoch_ms: i64,
    },
    DeleteTag {
        id: Uuid,
    },
    AddEdge {
        kind: EdgeKind,
        from: Uuid,
        to: Uuid,
    },
    RemoveEdge {
        kind: EdgeKind,
        from: Uuid,
        to: Uuid,
    },
    ContainsEdge {
        kind: EdgeKind,
        from: Uuid,
        to: Uuid,
    },
    Neighbors {
        kind: EdgeKind,
        from: Uuid,
    },
    InverseNeighbors {
        kind: EdgeKind,
        to: Uuid,
    },
    Degree {
        kind: EdgeKind,
        id: Uuid,
        direction: EdgeDirection,
    },
}

impl GraphRequest {
    /// Stable operation name used in logs.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::CreatePublisher { .. } => "create_publisher",
            Self::GetPublisher { .. } => "get_publisher",
            Self::FindPublisherByHandle { .. } => "find_publisher_by_handle",
            Self::FindPublisherByAccount { .. } => "find_publisher_by_account",
            Self::ListPublishers => "list_publishers",
            Self::UpdatePublisher { .. } => "update_publisher",
            Self::DeletePublisher { .. } => "delete_publisher",
            Self::CreatePublication { .. } => "create_publication",
            Self::GetPublication { .. } => "get_publication",
            Self::ListPublicationsByAuthor { .. } => "list_publications_by_author",
            Self::ListPublicationsByTag { .. } => "list_publications_by_tag",
            Self::ListPublicationsMentioning { .. } => "list_publications_mentioning",
            Self::UpdatePublication { .. } => "update_publication",
            Self::DeletePublication { .. } => "delete_publication",
            Self::GetOrCreateTag { .. } => "get_or_create_tag",
            Self::GetTag { .. } => "get_tag",
            Self::FindTagByName { .. } => "find_tag_by_name",
            Self::ListTags => "list_tags",
            Self::RecentTags { .. } => "recent_tags",
            Self::TagsUsedSince { .. } => "tags_used_since",
            Self::DeleteTag { .. } => "delete_tag",
            Self::AddEdge { .. } => "add_edge",
            Self::RemoveEdge { .. } => "remove_edge",
            Self::ContainsEdge { .. } => "contains_edge",
            Self::Neighbors { .. } => "neighbors",
            Self::InverseNeighbors { .. } => "inverse_neighbors",
            Self::Degree { .. } => "degree",
        }
    }
}

/// Successful result of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GraphPayload {
    Publisher(Publisher),
    MaybePublisher(Option<Publisher>),
    Publishers(Vec<Publisher>),
    Publication(Publication),
    CreatedPublication {
        publication: Publication,
        mentioned: Vec<Uuid>,
        tagged: Vec<Uuid>,
    },
    Publications(Vec<Publication>),
    Tag(Tag),
    MaybeTag(Option<Tag>),
    Tags(Vec<Tag>),
    Edge(EdgeState),
    Contains(bool),
    Ids(BTreeSet<Uuid>),
    Count(u64),
    Deleted,
}

/// Error half of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Response envelope for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<GraphPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl GraphResponse {
    fn success(payload: GraphPayload) -> Self {
        Self {
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    fn failure(err: &GraphError) -> Self {
        Self {
            ok: false,
            payload: None,
            error: Some(ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            }),
        }
    }

    /// Error kind, when the request failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|body| body.kind)
    }
}

impl<A: AccountResolver> GraphSession<A> {
    /// Executes one request and wraps the outcome in an envelope.
    pub fn handle(&self, request: GraphRequest) -> GraphResponse {
        let op = request.op_name();
        let started_at = Instant::now();
        match self.execute(request) {
            Ok(payload) => {
                info!(
                    "event=graph_request module=api status=ok op={} duration_ms={}",
                    op,
                    started_at.elapsed().as_millis()
                );
                GraphResponse::success(payload)
            }
            Err(err) => {
                warn!(
                    "event=graph_request module=api status=error op={} duration_ms={} error_kind={:?} error={}",
                    op,
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                GraphResponse::failure(&err)
            }
        }
    }

    fn execute(&self, request: GraphRequest) -> GraphResult<GraphPayload> {
        let payload = match request {
            GraphRequest::CreatePublisher {
                account_ref,
                handle,
            } => GraphPayload::Publisher(self.publishers()?.create(account_ref, handle)?),
            GraphRequest::GetPublisher { id } => GraphPayload::Publisher(self.publishers()?.get(id)?),
            GraphRequest::FindPublisherByHandle { handle } => {
                GraphPayload::MaybePublisher(self.publishers()?.find_by_handle(&handle)?)
            }
            GraphRequest::FindPublisherByAccount { account_ref } => {
                GraphPayload::MaybePublisher(self.publishers()?.find_by_account(&account_ref)?)
            }
            GraphRequest::ListPublishers => GraphPayload::Publishers(self.publishers()?.list()?),
            GraphRequest::UpdatePublisher { id, patch } => {
                GraphPayload::Publisher(self.publishers()?.update(id, patch)?)
            }
            GraphRequest::DeletePublisher { id } => {
                self.publishers()?.delete(id)?;
                GraphPayload::Deleted
            }
            GraphRequest::CreatePublication { author_id, body } => {
                let created = self.publications()?.create(author_id, body)?;
                GraphPayload::CreatedPublication {
                    publication: created.publication,
                    mentioned: created.links.mentioned,
                    tagged: created.links.tagged,
                }
            }
            GraphRequest::GetPublication { id } => {
                GraphPayload::Publication(self.publications()?.get(id)?)
            }
            GraphRequest::ListPublicationsByAuthor { author_id } => {
                GraphPayload::Publications(self.publications()?.list_by_author(author_id)?)
            }
            GraphRequest::ListPublicationsByTag { tag_id } => {
                GraphPayload::Publications(self.publications()?.list_by_tag(tag_id)?)
            }
            GraphRequest::ListPublicationsMentioning { publisher_id } => {
                GraphPayload::Publications(self.publications()?.list_mentioning(publisher_id)?)
            }
            GraphRequest::UpdatePublication { id, patch } => {
                GraphPayload::Publication(self.publications()?.update(id, patch)?)
            }
            GraphRequest::DeletePublication { id } => {
                self.publications()?.delete(id)?;
                GraphPayload::Deleted
            }
            GraphRequest::GetOrCreateTag { name } => {
                GraphPayload::Tag(self.tags()?.get_or_create(&name)?)
            }
            GraphRequest::GetTag { id } => GraphPayload::Tag(self.tags()?.get(id)?),
            GraphRequest::FindTagByName { name } => {
                GraphPayload::MaybeTag(self.tags()?.find_by_name(&name)?)
            }
            GraphRequest::ListTags => GraphPayload::Tags(self.tags()?.list()?),
            GraphRequest::RecentTags { days } => {
                GraphPayload::Tags(self.tags()?.recently_used_within_days(days)?)
            }
            GraphRequest::TagsUsedSince { since_epoch_ms } => {
                GraphPayload::Tags(self.tags()?.recently_used(since_epoch_ms)?)
            }
            GraphRequest::DeleteTag { id } => {
                self.tags()?.delete(id)?;
                GraphPayload::Deleted
            }
            GraphRequest::AddEdge { kind, from, to } => {
                GraphPayload::Edge(self.relationships()?.add_edge(kind, from, to)?)
            }
            GraphRequest::RemoveEdge { kind, from, to } => {
                GraphPayload::Edge(self.relationships()?.remove_edge(kind, from, to)?)
            }
            GraphRequest::ContainsEdge { kind, from, to } => {
                GraphPayload::Contains(self.relationships()?.contains(kind, from, to)?)
            }
            GraphRequest::Neighbors { kind, from } => {
                GraphPayload::Ids(self.relationships()?.neighbors(kind, from)?)
            }
            GraphRequest::InverseNeighbors { kind, to } => {
                GraphPayload::Ids(self.relationships()?.inverse_neighbors(kind, to)?)
            }
            GraphRequest::Degree {
                kind,
                id,
                direction,
            } => GraphPayload::Count(self.relationships()?.degree(kind, id, direction)?),
        };
        Ok(payload)
    }
}
