//! Core domain logic for the social graph.
//! This crate is the single source of truth for publishers, publications,
//! tags and the relationships between them.

pub mod account;
pub mod api;
pub mod config;
pub mod content;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use account::{
    AccountIdentity, AccountLookupError, AccountResolver, OpenAccountDirectory,
    StaticAccountDirectory,
};
pub use api::{ErrorBody, GraphPayload, GraphRequest, GraphResponse};
pub use config::{ConfigError, GraphConfig, TagDeletePolicy};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::edge::{Edge, EdgeDirection, EdgeKind, EdgeState};
pub use model::publication::{Publication, PublicationId, PublicationPatch};
pub use model::publisher::{Publisher, PublisherId, PublisherPatch};
pub use model::tag::{Tag, TagId};
pub use model::{EntityKind, EntityRef};
pub use repo::{Conflict, RepoError, RepoResult};
pub use service::graph_service::RelationshipService;
pub use service::publication_service::{CreatedPublication, PublicationService};
pub use service::publisher_service::PublisherService;
pub use service::tag_service::TagService;
pub use service::{ErrorKind, GraphError, GraphResult};
pub use session::GraphSession;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
