//! Publisher store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist publisher identity records.
//! - Enforce handle and account uniqueness at write time.
//! - Refuse deletion while the publisher is still referenced.
//!
//! # Invariants
//! - Handles are unique by `handle_key` (Unicode lowercase); handle
//!   comparisons never rely on SQLite `NOCASE`, which folds ASCII only.
//! - A publisher that authored publications or participates in any edge is
//!   never deleted.

use crate::model::edge::EdgeKind;
use crate::model::publisher::{handle_key, Publisher, PublisherId};
use crate::model::{EntityKind, EntityRef};
use crate::repo::{
    ensure_graph_connection_ready, parse_uuid, require_entity, Conflict, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const PUBLISHER_SELECT_SQL: &str = "SELECT uuid, account_ref, handle, created_at FROM publishers";

/// Repository interface for publisher records.
pub trait PublisherRepository {
    /// Inserts a new publisher.
    fn create_publisher(&self, publisher: &Publisher) -> RepoResult<()>;
    /// Gets one publisher by id.
    fn get_publisher(&self, id: PublisherId) -> RepoResult<Option<Publisher>>;
    /// Finds a publisher by handle, ignoring case.
    fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Publisher>>;
    /// Finds the publisher linked to an external account.
    fn find_by_account(&self, account_ref: &str) -> RepoResult<Option<Publisher>>;
    /// Lists all publishers ordered by handle.
    fn list_publishers(&self) -> RepoResult<Vec<Publisher>>;
    /// Replaces mutable fields (`handle`, `account_ref`).
    fn update_publisher(&self, publisher: &Publisher) -> RepoResult<()>;
    /// Hard-deletes an unreferenced publisher.
    fn delete_publisher(&self, id: PublisherId) -> RepoResult<()>;
}

/// SQLite-backed publisher store.
pub struct SqlitePublisherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublisherRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PublisherRepository for SqlitePublisherRepository<'_> {
    fn create_publisher(&self, publisher: &Publisher) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_unique_identity(&tx, publisher)?;
        tx.execute(
            "INSERT INTO publishers (uuid, account_ref, handle, handle_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                publisher.id.to_string(),
                publisher.account_ref.as_deref(),
                publisher.handle.as_str(),
                handle_key(&publisher.handle),
                publisher.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_publisher(&self, id: PublisherId) -> RepoResult<Option<Publisher>> {
        load_one(
            self.conn,
            &format!("{PUBLISHER_SELECT_SQL} WHERE uuid = ?1;"),
            id.to_string().as_str(),
        )
    }

    fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Publisher>> {
        load_one(
            self.conn,
            &format!("{PUBLISHER_SELECT_SQL} WHERE handle_key = ?1;"),
            &handle_key(handle),
        )
    }

    fn find_by_account(&self, account_ref: &str) -> RepoResult<Option<Publisher>> {
        load_one(
            self.conn,
            &format!("{PUBLISHER_SELECT_SQL} WHERE account_ref = ?1;"),
            account_ref,
        )
    }

    fn list_publishers(&self) -> RepoResult<Vec<Publisher>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PUBLISHER_SELECT_SQL} ORDER BY handle_key ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut publishers = Vec::new();
        while let Some(row) = rows.next()? {
            publishers.push(parse_publisher_row(row)?);
        }
        Ok(publishers)
    }

    fn update_publisher(&self, publisher: &Publisher) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_entity(&tx, EntityKind::Publisher, publisher.id)?;
        ensure_unique_identity(&tx, publisher)?;
        tx.execute(
            "UPDATE publishers SET account_ref = ?2, handle = ?3, handle_key = ?4 WHERE uuid = ?1;",
            params![
                publisher.id.to_string(),
                publisher.account_ref.as_deref(),
                publisher.handle.as_str(),
                handle_key(&publisher.handle),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_publisher(&self, id: PublisherId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_entity(&tx, EntityKind::Publisher, id)?;

        let authored_publications: u64 = tx.query_row(
            "SELECT COUNT(*) FROM publications WHERE author_uuid = ?1;",
            [id_text.as_str()],
            |row| row.get(0),
        )?;
        let edges: u64 = tx.query_row(
            "SELECT COUNT(*)
             FROM edges
             WHERE (from_uuid = ?1 AND kind IN (?2, ?3, ?4))
                OR (to_uuid = ?1 AND kind IN (?2, ?5));",
            params![
                id_text.as_str(),
                EdgeKind::Follows.as_db_str(),
                EdgeKind::Favourites.as_db_str(),
                EdgeKind::Likes.as_db_str(),
                EdgeKind::Mentions.as_db_str(),
            ],
            |row| row.get(0),
        )?;
        if authored_publications > 0 || edges > 0 {
            return Err(RepoError::Conflict(Conflict::PublisherReferenced {
                publisher_id: id,
                authored_publications,
                edges,
            }));
        }

        tx.execute("DELETE FROM publishers WHERE uuid = ?1;", [id_text.as_str()])?;
        tx.commit()?;
        Ok(())
    }
}

/// Looks up a publisher id by handle, ignoring case, inside an open transaction.
pub(crate) fn publisher_id_by_handle(
    conn: &Connection,
    handle: &str,
) -> RepoResult<Option<PublisherId>> {
    let found: Option<String> = conn
        .query_row(
            "SELECT uuid FROM publishers WHERE handle_key = ?1;",
            [handle_key(handle)],
            |row| row.get(0),
        )
        .optional()?;
    found
        .map(|value| parse_uuid(&value, "publishers.uuid"))
        .transpose()
}

fn ensure_unique_identity(conn: &Connection, publisher: &Publisher) -> RepoResult<()> {
    let id_text = publisher.id.to_string();
    let handle_taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM publishers
            WHERE handle_key = ?1 AND uuid <> ?2
        );",
        params![handle_key(&publisher.handle), id_text.as_str()],
        |row| row.get(0),
    )?;
    if handle_taken == 1 {
        return Err(RepoError::Conflict(Conflict::HandleTaken {
            handle: publisher.handle.clone(),
        }));
    }

    if let Some(account_ref) = publisher.account_ref.as_deref() {
        let account_taken: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM publishers
                WHERE account_ref = ?1 AND uuid <> ?2
            );",
            params![account_ref, id_text.as_str()],
            |row| row.get(0),
        )?;
        if account_taken == 1 {
            return Err(RepoError::Conflict(Conflict::AccountAlreadyLinked {
                account_ref: account_ref.to_string(),
            }));
        }
    }

    Ok(())
}

fn load_one(conn: &Connection, sql: &str, key: &str) -> RepoResult<Option<Publisher>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([key])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_publisher_row(row)?)),
        None => Ok(None),
    }
}

fn parse_publisher_row(row: &Row<'_>) -> RepoResult<Publisher> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Publisher {
        id: parse_uuid(&uuid_text, "publishers.uuid")?,
        account_ref: row.get("account_ref")?,
        handle: row.get("handle")?,
        created_at: row.get("created_at")?,
    })
}

/// Returns `NotFound` for a missing publisher, used by services that need
/// the full record before patching it.
pub(crate) fn require_publisher(
    repo: &impl PublisherRepository,
    id: PublisherId,
) -> RepoResult<Publisher> {
    repo.get_publisher(id)?
        .ok_or(RepoError::NotFound(EntityRef::Publisher(id)))
}
