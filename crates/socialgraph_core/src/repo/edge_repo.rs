//! Relationship index contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the single authoritative edge set for every relation kind.
//! - Answer forward, inverse and degree queries from that one set.
//!
//! # Invariants
//! - Endpoints are checked against their stores inside the insert
//!   transaction; a concurrent delete cannot leave a dangling edge.
//! - Insert and delete are idempotent.
//! - Inverse traversal uses the `(kind, to_uuid)` index; nothing is mirrored.

use crate::model::edge::{Edge, EdgeDirection, EdgeKind};
use crate::model::tag::TagId;
use crate::model::now_epoch_ms;
use crate::repo::tag_repo::touch_tag;
use crate::repo::{ensure_graph_connection_ready, parse_uuid, require_entity, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Repository interface for the relationship index.
pub trait EdgeRepository {
    /// Inserts an edge after validating both endpoints exist.
    ///
    /// Returns `true` when the edge was not present before.
    fn insert_edge(&self, edge: Edge) -> RepoResult<bool>;
    /// Removes an edge. Returns `true` when it was present.
    fn delete_edge(&self, edge: Edge) -> RepoResult<bool>;
    fn contains_edge(&self, edge: Edge) -> RepoResult<bool>;
    /// Ids reachable from `from` over `kind`.
    fn targets_of(&self, kind: EdgeKind, from: Uuid) -> RepoResult<BTreeSet<Uuid>>;
    /// Ids with a `kind` edge into `to`.
    fn sources_of(&self, kind: EdgeKind, to: Uuid) -> RepoResult<BTreeSet<Uuid>>;
    /// Counts edges touching `id` in one direction.
    fn count_edges(&self, kind: EdgeKind, id: Uuid, direction: EdgeDirection) -> RepoResult<u64>;
    /// Counts every edge of one kind.
    fn count_kind(&self, kind: EdgeKind) -> RepoResult<u64>;
}

/// SQLite-backed relationship index.
pub struct SqliteEdgeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEdgeRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_graph_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn collect_ids(&self, sql: &str, kind: EdgeKind, key: Uuid) -> RepoResult<BTreeSet<Uuid>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![kind.as_db_str(), key.to_string()])?;
        let mut ids = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.insert(parse_uuid(&value, "edges")?);
        }
        Ok(ids)
    }
}

impl EdgeRepository for SqliteEdgeRepository<'_> {
    fn insert_edge(&self, edge: Edge) -> RepoResult<bool> {
        let now = now_epoch_ms();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_entity(&tx, edge.kind.source_kind(), edge.from)?;
        require_entity(&tx, edge.kind.target_kind(), edge.to)?;

        let inserted = insert_edge_row(
            &tx,
            edge.kind,
            &edge.from.to_string(),
            &edge.to.to_string(),
            now,
        )?;
        if edge.kind == EdgeKind::HasTag {
            let tag_id: TagId = edge.to;
            touch_tag(&tx, tag_id, now)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn delete_edge(&self, edge: Edge) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM edges WHERE kind = ?1 AND from_uuid = ?2 AND to_uuid = ?3;",
            params![
                edge.kind.as_db_str(),
                edge.from.to_string(),
                edge.to.to_string()
            ],
        )?;
        Ok(removed == 1)
    }

    fn contains_edge(&self, edge: Edge) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM edges WHERE kind = ?1 AND from_uuid = ?2 AND to_uuid = ?3
            );",
            params![
                edge.kind.as_db_str(),
                edge.from.to_string(),
                edge.to.to_string()
            ],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn targets_of(&self, kind: EdgeKind, from: Uuid) -> RepoResult<BTreeSet<Uuid>> {
        self.collect_ids(
            "SELECT to_uuid FROM edges WHERE kind = ?1 AND from_uuid = ?2;",
            kind,
            from,
        )
    }

    fn sources_of(&self, kind: EdgeKind, to: Uuid) -> RepoResult<BTreeSet<Uuid>> {
        self.collect_ids(
            "SELECT from_uuid FROM edges WHERE kind = ?1 AND to_uuid = ?2;",
            kind,
            to,
        )
    }

    fn count_edges(&self, kind: EdgeKind, id: Uuid, direction: EdgeDirection) -> RepoResult<u64> {
        let sql = match direction {
            EdgeDirection::Outbound => "SELECT COUNT(*) FROM edges WHERE kind = ?1 AND from_uuid = ?2;",
            EdgeDirection::Inbound => "SELECT COUNT(*) FROM edges WHERE kind = ?1 AND to_uuid = ?2;",
        };
        let count: u64 = self.conn.query_row(
            sql,
            params![kind.as_db_str(), id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_kind(&self, kind: EdgeKind) -> RepoResult<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM edges WHERE kind = ?1;",
            [kind.as_db_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Inserts one edge row, ignoring duplicates. Returns whether a row was added.
pub(crate) fn insert_edge_row(
    conn: &Connection,
    kind: EdgeKind,
    from: &str,
    to: &str,
    created_at: i64,
) -> RepoResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO edges (kind, from_uuid, to_uuid, created_at)
         VALUES (?1, ?2, ?3, ?4);",
        params![kind.as_db_str(), from, to, created_at],
    )?;
    Ok(inserted == 1)
}
