//! Per-caller graph session.
//!
//! # Responsibility
//! - Own one SQLite connection for one caller session.
//! - Hand out services bound to that connection and the session config.
//!
//! # Invariants
//! - A session is used from one thread at a time (`Connection` is `!Sync`).
//!   Concurrent callers open their own sessions on the same file; SQLite
//!   serializes their writes.

use crate::account::AccountResolver;
use crate::config::GraphConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::edge_repo::SqliteEdgeRepository;
use crate::repo::publication_repo::SqlitePublicationRepository;
use crate::repo::publisher_repo::SqlitePublisherRepository;
use crate::repo::tag_repo::SqliteTagRepository;
use crate::service::graph_service::RelationshipService;
use crate::service::publication_service::PublicationService;
use crate::service::publisher_service::PublisherService;
use crate::service::tag_service::TagService;
use crate::service::GraphResult;
use rusqlite::Connection;

/// One caller's handle on the graph store.
pub struct GraphSession<A: AccountResolver> {
    conn: Connection,
    config: GraphConfig,
    accounts: A,
}

impl<A: AccountResolver> GraphSession<A> {
    /// Opens the configured database (in-memory when no path is set).
    pub fn open(config: GraphConfig, accounts: A) -> DbResult<Self> {
        let conn = match config.db_path.as_deref() {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        Ok(Self::with_connection(conn, config, accounts))
    }

    /// Wraps an already migrated connection.
    pub fn with_connection(conn: Connection, config: GraphConfig, accounts: A) -> Self {
        Self {
            conn,
            config,
            accounts,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn publishers(&self) -> GraphResult<PublisherService<SqlitePublisherRepository<'_>, &A>> {
        let repo = SqlitePublisherRepository::try_new(&self.conn)?;
        Ok(PublisherService::new(repo, &self.accounts))
    }

    pub fn publications(&self) -> GraphResult<PublicationService<SqlitePublicationRepository<'_>>> {
        let repo = SqlitePublicationRepository::try_new(&self.conn)?;
        Ok(PublicationService::new(repo))
    }

    pub fn tags(&self) -> GraphResult<TagService<SqliteTagRepository<'_>>> {
        let repo = SqliteTagRepository::try_new(&self.conn)?;
        Ok(TagService::new(repo, self.config.tag_delete_policy))
    }

    pub fn relationships(&self) -> GraphResult<RelationshipService<SqliteEdgeRepository<'_>>> {
        let repo = SqliteEdgeRepository::try_new(&self.conn)?;
        Ok(RelationshipService::new(repo))
    }
}
