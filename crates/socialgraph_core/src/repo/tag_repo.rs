//! Tag store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tags keyed by normalized name.
//! - Apply the configured delete policy against `has_tag` edges.
//!
//! # Invariants
//! - Callers pass names already normalized by `normalize_tag_name`.
//! - `get_or_create_tag` never creates two rows for one name.
//! - Deleting a tag under `Detach` removes its edges in the same
//!   transaction as the row.

use crate::config::TagDeletePolicy;
use crate::model::edge::EdgeKind;
use crate::model::tag::{Tag, TagId};
use crate::model::{now_epoch_ms, EntityKind};
use crate::repo::{
    ensure_graph_connection_ready, parse_uuid, require_entity, Conflict, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const TAG_SELECT_SQL: &str = "SELECT uuid, name, created_at, last_used_at FROM tags";

/// Repository interface for tags.
pub trait TagRepository {
    /// Returns the tag with this normalized name, creating it when missing.
    fn get_or_create_tag(&self, name: &str) -> RepoResult<Tag>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    /// Lists all tags ordered by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Lists tags attached at or after `since_epoch_ms`, most recent first.
    fn list_used_since(&self, since_epoch_ms: i64) -> RepoResult<Vec<Tag>>;
    /// Deletes a tag under the given policy. Returns detached edge count.
    fn delete_tag(&self, id: TagId, policy: TagDeletePolicy) -> RepoResult<u64>;
}

/// SQLite-backed tag store.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn get_or_create_tag(&self, name: &str) -> RepoResult<Tag> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tag = get_or_create_tag_in(&tx, name)?;
        tx.commit()?;
        Ok(tag)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        load_one(
            self.conn,
            &format!("{TAG_SELECT_SQL} WHERE uuid = ?1;"),
            id.to_string().as_str(),
        )
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        load_one(
            self.conn,
            &format!("{TAG_SELECT_SQL} WHERE name = ?1 COLLATE NOCASE;"),
            name,
        )
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TAG_SELECT_SQL} ORDER BY name ASC;"))?;
        let rows = stmt.query([])?;
        collect_tags(rows)
    }

    fn list_used_since(&self, since_epoch_ms: i64) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL}
             WHERE last_used_at IS NOT NULL AND last_used_at >= ?1
             ORDER BY last_used_at DESC, name ASC;"
        ))?;
        let rows = stmt.query([since_epoch_ms])?;
        collect_tags(rows)
    }

    fn delete_tag(&self, id: TagId, policy: TagDeletePolicy) -> RepoResult<u64> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_entity(&tx, EntityKind::Tag, id)?;

        let detached = match policy {
            TagDeletePolicy::Block => {
                let publications: u64 = tx.query_row(
                    "SELECT COUNT(*) FROM edges WHERE kind = ?1 AND to_uuid = ?2;",
                    params![EdgeKind::HasTag.as_db_str(), id_text.as_str()],
                    |row| row.get(0),
                )?;
                if publications > 0 {
                    return Err(RepoError::Conflict(Conflict::TagInUse {
                        tag_id: id,
                        publications,
                    }));
                }
                0
            }
            TagDeletePolicy::Detach => tx.execute(
                "DELETE FROM edges WHERE kind = ?1 AND to_uuid = ?2;",
                params![EdgeKind::HasTag.as_db_str(), id_text.as_str()],
            )? as u64,
        };

        tx.execute("DELETE FROM tags WHERE uuid = ?1;", [id_text.as_str()])?;
        tx.commit()?;
        Ok(detached)
    }
}

/// Get-or-create by normalized name on an already open transaction.
pub(crate) fn get_or_create_tag_in(conn: &Connection, name: &str) -> RepoResult<Tag> {
    conn.execute(
        "INSERT OR IGNORE INTO tags (uuid, name, created_at) VALUES (?1, ?2, ?3);",
        params![Uuid::new_v4().to_string(), name, now_epoch_ms()],
    )?;
    load_one(
        conn,
        &format!("{TAG_SELECT_SQL} WHERE name = ?1 COLLATE NOCASE;"),
        name,
    )?
    .ok_or_else(|| RepoError::InvalidData(format!("tag `{name}` missing after insert")))
}

/// Records that a tag was just attached to a publication.
pub(crate) fn touch_tag(conn: &Connection, id: TagId, used_at: i64) -> RepoResult<()> {
    conn.execute(
        "UPDATE tags SET last_used_at = MAX(COALESCE(last_used_at, 0), ?2) WHERE uuid = ?1;",
        params![id.to_string(), used_at],
    )?;
    Ok(())
}

fn load_one(conn: &Connection, sql: &str, key: &str) -> RepoResult<Option<Tag>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([key])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_tag_row(row)?)),
        None => Ok(None),
    }
}

fn collect_tags(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Tag>> {
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(parse_tag_row(row)?);
    }
    Ok(tags)
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Tag {
        id: parse_uuid(&uuid_text, "tags.uuid")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        last_used_at: row.get("last_used_at")?,
    })
}
