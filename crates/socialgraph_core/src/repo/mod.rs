//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for each store.
//! - Isolate SQLite query details from service orchestration.
//! - Enforce referential integrity inside write transactions.
//!
//! # Invariants
//! - Every multi-statement write runs in an `IMMEDIATE` transaction so
//!   writers on different connections serialize.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod edge_repo;
pub mod publication_repo;
pub mod publisher_repo;
pub mod tag_repo;

use crate::db::migrations::{schema_status, SchemaStatus};
use crate::db::DbError;
use crate::model::{EntityKind, EntityRef};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Why a write was refused without touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Conflict {
    /// Another publisher already uses this handle (case-insensitive).
    HandleTaken { handle: String },
    /// Another publisher is already linked to this account.
    AccountAlreadyLinked { account_ref: String },
    /// Publisher still authors publications or participates in edges.
    PublisherReferenced {
        publisher_id: Uuid,
        authored_publications: u64,
        edges: u64,
    },
    /// Tag is attached to publications and the delete policy blocks.
    TagInUse { tag_id: Uuid, publications: u64 },
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HandleTaken { handle } => write!(f, "handle `{handle}` is already taken"),
            Self::AccountAlreadyLinked { account_ref } => {
                write!(f, "account `{account_ref}` is already linked to a publisher")
            }
            Self::PublisherReferenced {
                publisher_id,
                authored_publications,
                edges,
            } => write!(
                f,
                "publisher {publisher_id} is still referenced by {authored_publications} publication(s) and {edges} edge(s)"
            ),
            Self::TagInUse {
                tag_id,
                publications,
            } => write!(
                f,
                "tag {tag_id} is attached to {publications} publication(s)"
            ),
        }
    }
}

/// Repository error for graph persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntityRef),
    Conflict(Conflict),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "graph repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted graph data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `open_db*`.
pub(crate) fn ensure_graph_connection_ready(conn: &Connection) -> RepoResult<()> {
    match schema_status(conn)? {
        SchemaStatus::Current => Ok(()),
        SchemaStatus::Behind { db_version, latest } | SchemaStatus::Ahead { db_version, latest } => {
            Err(RepoError::UninitializedConnection {
                expected_version: latest,
                actual_version: db_version,
            })
        }
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Checks whether an entity row exists. Safe to call inside a transaction.
pub(crate) fn entity_exists(conn: &Connection, kind: EntityKind, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE uuid = ?1);",
            kind.table()
        ),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn require_entity(conn: &Connection, kind: EntityKind, id: Uuid) -> RepoResult<()> {
    if entity_exists(conn, kind, id)? {
        Ok(())
    } else {
        Err(RepoError::NotFound(EntityRef::of(kind, id)))
    }
}
