//! Publication store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist publications and their immutable authorship.
//! - Link body-derived mentions and hashtags in the creating transaction.
//! - Cascade edge removal when a publication is deleted.
//!
//! # Invariants
//! - `author_uuid` must reference an existing publisher (FK + explicit check).
//! - Delete removes every `favourites`/`likes` edge targeting the
//!   publication and every `mentions`/`has_tag` edge sourced from it, in the
//!   same transaction as the row.
//! - Lists are ordered `created_at DESC, uuid ASC`.

use crate::model::edge::EdgeKind;
use crate::model::publication::{Publication, PublicationId};
use crate::model::publisher::PublisherId;
use crate::model::tag::TagId;
use crate::model::{EntityKind, EntityRef};
use crate::repo::edge_repo::insert_edge_row;
use crate::repo::publisher_repo::publisher_id_by_handle;
use crate::repo::tag_repo::{get_or_create_tag_in, touch_tag};
use crate::repo::{
    ensure_graph_connection_ready, parse_uuid, require_entity, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const PUBLICATION_SELECT_SQL: &str =
    "SELECT
    p.uuid AS uuid,
    p.author_uuid AS author_uuid,
    p.body AS body,
    p.created_at AS created_at,
    p.updated_at AS updated_at
FROM publications p";
const PUBLICATION_ORDER_SQL: &str = "ORDER BY p.created_at DESC, p.uuid ASC";

/// Body-derived links recorded when a publication is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedLinks {
    /// Publishers that received a `mentions` edge.
    pub mentioned: Vec<PublisherId>,
    /// Tags that received a `has_tag` edge.
    pub tagged: Vec<TagId>,
}

/// Repository interface for publications.
pub trait PublicationRepository {
    /// Inserts a publication and links mentions/tags atomically.
    ///
    /// Unknown mention handles are skipped; tag names are get-or-created.
    fn create_publication(
        &self,
        publication: &Publication,
        mention_handles: &[String],
        tag_names: &[String],
    ) -> RepoResult<CreatedLinks>;
    fn get_publication(&self, id: PublicationId) -> RepoResult<Option<Publication>>;
    /// Lists publications authored by one publisher.
    fn list_by_author(&self, author_id: PublisherId) -> RepoResult<Vec<Publication>>;
    /// Lists publications carrying one tag.
    fn list_by_tag(&self, tag_id: TagId) -> RepoResult<Vec<Publication>>;
    /// Lists publications mentioning one publisher.
    fn list_mentioning(&self, publisher_id: PublisherId) -> RepoResult<Vec<Publication>>;
    /// Replaces the body and bumps `updated_at`.
    fn update_body(&self, id: PublicationId, body: &str, updated_at: i64) -> RepoResult<()>;
    /// Deletes a publication and every edge referencing it.
    ///
    /// Returns the number of edges removed by the cascade.
    fn delete_publication(&self, id: PublicationId) -> RepoResult<u64>;
}

/// SQLite-backed publication store.
pub struct SqlitePublicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublicationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn list_where(&self, clause: &str, key: String) -> RepoResult<Vec<Publication>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PUBLICATION_SELECT_SQL} {clause} {PUBLICATION_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([key])?;
        let mut publications = Vec::new();
        while let Some(row) = rows.next()? {
            publications.push(parse_publication_row(row)?);
        }
        Ok(publications)
    }
}

impl PublicationRepository for SqlitePublicationRepository<'_> {
    fn create_publication(
        &self,
        publication: &Publication,
        mention_handles: &[String],
        tag_names: &[String],
    ) -> RepoResult<CreatedLinks> {
        let id_text = publication.id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_entity(&tx, EntityKind::Publisher, publication.author_id)?;

        tx.execute(
            "INSERT INTO publications (uuid, author_uuid, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id_text.as_str(),
                publication.author_id.to_string(),
                publication.body.as_str(),
                publication.created_at,
                publication.updated_at,
            ],
        )?;

        let mut links = CreatedLinks::default();
        for handle in mention_handles {
            let Some(publisher_id) = publisher_id_by_handle(&tx, handle)? else {
                continue;
            };
            let inserted = insert_edge_row(
                &tx,
                EdgeKind::Mentions,
                &id_text,
                &publisher_id.to_string(),
                publication.created_at,
            )?;
            if inserted {
                links.mentioned.push(publisher_id);
            }
        }

        for name in tag_names {
            let tag = get_or_create_tag_in(&tx, name)?;
            let inserted = insert_edge_row(
                &tx,
                EdgeKind::HasTag,
                &id_text,
                &tag.id.to_string(),
                publication.created_at,
            )?;
            if inserted {
                links.tagged.push(tag.id);
            }
            touch_tag(&tx, tag.id, publication.created_at)?;
        }

        tx.commit()?;
        Ok(links)
    }

    fn get_publication(&self, id: PublicationId) -> RepoResult<Option<Publication>> {
        let mut publications = self.list_where("WHERE p.uuid = ?1", id.to_string())?;
        Ok(publications.pop())
    }

    fn list_by_author(&self, author_id: PublisherId) -> RepoResult<Vec<Publication>> {
        self.list_where("WHERE p.author_uuid = ?1", author_id.to_string())
    }

    fn list_by_tag(&self, tag_id: TagId) -> RepoResult<Vec<Publication>> {
        self.list_where(
            &format!(
                "INNER JOIN edges e
                    ON e.kind = '{}' AND e.from_uuid = p.uuid
                 WHERE e.to_uuid = ?1",
                EdgeKind::HasTag.as_db_str()
            ),
            tag_id.to_string(),
        )
    }

    fn list_mentioning(&self, publisher_id: PublisherId) -> RepoResult<Vec<Publication>> {
        self.list_where(
            &format!(
                "INNER JOIN edges e
                    ON e.kind = '{}' AND e.from_uuid = p.uuid
                 WHERE e.to_uuid = ?1",
                EdgeKind::Mentions.as_db_str()
            ),
            publisher_id.to_string(),
        )
    }

    fn update_body(&self, id: PublicationId, body: &str, updated_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE publications SET body = ?2, updated_at = ?3 WHERE uuid = ?1;",
            params![id.to_string(), body, updated_at],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Publication(id)));
        }
        Ok(())
    }

    fn delete_publication(&self, id: PublicationId) -> RepoResult<u64> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_entity(&tx, EntityKind::Publication, id)?;

        let inbound = tx.execute(
            "DELETE FROM edges WHERE kind IN (?1, ?2) AND to_uuid = ?3;",
            params![
                EdgeKind::Favourites.as_db_str(),
                EdgeKind::Likes.as_db_str(),
                id_text.as_str(),
            ],
        )?;
        let outbound = tx.execute(
            "DELETE FROM edges WHERE kind IN (?1, ?2) AND from_uuid = ?3;",
            params![
                EdgeKind::Mentions.as_db_str(),
                EdgeKind::HasTag.as_db_str(),
                id_text.as_str(),
            ],
        )?;
        tx.execute("DELETE FROM publications WHERE uuid = ?1;", [id_text.as_str()])?;
        tx.commit()?;
        Ok((inbound + outbound) as u64)
    }
}

fn parse_publication_row(row: &Row<'_>) -> RepoResult<Publication> {
    let uuid_text: String = row.get("uuid")?;
    let author_text: String = row.get("author_uuid")?;
    Ok(Publication {
        id: parse_uuid(&uuid_text, "publications.uuid")?,
        author_id: parse_uuid(&author_text, "publications.author_uuid")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
