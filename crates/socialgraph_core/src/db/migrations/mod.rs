//! Graph schema migrations.
//!
//! # Responsibility
//! - Register named schema migrations in strictly increasing order.
//! - Run every pending migration in one transaction, step by step.
//! - Report the schema state of a connection to repositories.
//!
//! # Invariants
//! - `version` values are monotonic and mirrored to `PRAGMA user_version`.
//! - A failed step rolls back every migration of the same run.
//! - Steps that need Unicode-aware text folding run in Rust, since SQLite's
//!   `lower()` and `NOCASE` only fold ASCII.

use crate::db::{DbError, DbResult};
use crate::model::publisher::handle_key;
use log::{debug, info};
use rusqlite::{params, Connection, Transaction};

/// One unit of work inside a migration.
#[derive(Clone, Copy)]
enum Step {
    Sql(&'static str),
    Rust(fn(&Transaction<'_>) -> rusqlite::Result<()>),
}

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    steps: &'static [Step],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "stores",
        steps: &[Step::Sql(include_str!("0001_init.sql"))],
    },
    Migration {
        version: 2,
        name: "edges",
        steps: &[Step::Sql(include_str!("0002_edges.sql"))],
    },
    Migration {
        version: 3,
        name: "tag_last_used_index",
        steps: &[Step::Sql(include_str!("0003_tag_last_used_index.sql"))],
    },
    Migration {
        version: 4,
        name: "publisher_handle_key",
        steps: &[
            Step::Sql(include_str!("0004_publisher_handle_key.sql")),
            Step::Rust(backfill_handle_keys),
            Step::Sql(include_str!("0004_publisher_handle_key_index.sql")),
        ],
    },
];

/// Where a connection's schema stands relative to this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Current,
    Behind { db_version: u32, latest: u32 },
    Ahead { db_version: u32, latest: u32 },
}

/// Summary of one migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the migrations applied, in order.
    pub applied: Vec<&'static str>,
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Compares the connection's schema version with `latest_version()`.
pub fn schema_status(conn: &Connection) -> DbResult<SchemaStatus> {
    let db_version = current_user_version(conn)?;
    let latest = latest_version();
    Ok(match db_version.cmp(&latest) {
        std::cmp::Ordering::Equal => SchemaStatus::Current,
        std::cmp::Ordering::Less => SchemaStatus::Behind { db_version, latest },
        std::cmp::Ordering::Greater => SchemaStatus::Ahead { db_version, latest },
    })
}

/// Brings the connection's schema up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `Migration` naming the first failing migration; nothing is applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version = match schema_status(conn)? {
        SchemaStatus::Current => {
            let version = latest_version();
            return Ok(MigrationReport {
                from_version: version,
                to_version: version,
                applied: Vec::new(),
            });
        }
        SchemaStatus::Ahead { db_version, latest } => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported: latest,
            });
        }
        SchemaStatus::Behind { db_version, .. } => db_version,
    };

    let tx = conn.transaction()?;
    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        run_migration(&tx, migration).map_err(|source| DbError::Migration {
            version: migration.version,
            name: migration.name,
            source,
        })?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            migration.version, migration.name
        );
        applied.push(migration.name);
    }
    tx.commit()?;

    let report = MigrationReport {
        from_version,
        to_version: latest_version(),
        applied,
    };
    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        report.from_version,
        report.to_version,
        report.applied.join(",")
    );
    Ok(report)
}

fn run_migration(tx: &Transaction<'_>, migration: &Migration) -> rusqlite::Result<()> {
    for step in migration.steps {
        match step {
            Step::Sql(sql) => tx.execute_batch(sql)?,
            Step::Rust(apply) => apply(tx)?,
        }
    }
    tx.pragma_update(None, "user_version", migration.version)
}

/// Fills `publishers.handle_key` with the Unicode-lowercased handle.
fn backfill_handle_keys(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    let rows: Vec<(String, String)> = {
        let mut stmt = tx.prepare("SELECT uuid, handle FROM publishers;")?;
        let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        mapped.collect::<rusqlite::Result<_>>()?
    };
    for (uuid, handle) in rows {
        tx.execute(
            "UPDATE publishers SET handle_key = ?2 WHERE uuid = ?1;",
            params![uuid, handle_key(&handle)],
        )?;
    }
    Ok(())
}
