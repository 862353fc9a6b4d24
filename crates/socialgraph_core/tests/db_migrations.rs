use rusqlite::Connection;
use socialgraph_core::db::migrations::{apply_migrations, latest_version, schema_status};
use socialgraph_core::db::{open_db, open_db_in_memory, DbError, SchemaStatus};
use socialgraph_core::repo::edge_repo::SqliteEdgeRepository;
use socialgraph_core::RepoError;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "publishers");
    assert_table_exists(&conn, "publications");
    assert_table_exists(&conn, "tags");
    assert_table_exists(&conn, "edges");
    assert_index_exists(&conn, "idx_edges_inverse");
    assert_index_exists(&conn, "idx_tags_last_used");
    assert_index_exists(&conn, "idx_publishers_handle_key");
    assert_eq!(schema_status(&conn).unwrap(), SchemaStatus::Current);
}

#[test]
fn upgrading_from_version_three_backfills_handle_keys() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0002_edges.sql"))
        .unwrap();
    conn.execute_batch(include_str!(
        "../src/db/migrations/0003_tag_last_used_index.sql"
    ))
    .unwrap();
    conn.execute_batch(
        "PRAGMA user_version = 3;
         INSERT INTO publishers (uuid, account_ref, handle, created_at)
         VALUES ('00000000-0000-4000-8000-000000000001', NULL, 'Émile', 1);",
    )
    .unwrap();
    assert_eq!(
        schema_status(&conn).unwrap(),
        SchemaStatus::Behind {
            db_version: 3,
            latest: latest_version()
        }
    );

    let report = apply_migrations(&mut conn).unwrap();
    assert_eq!(report.from_version, 3);
    assert_eq!(report.to_version, latest_version());
    assert_eq!(report.applied, vec!["publisher_handle_key"]);

    let key: String = conn
        .query_row(
            "SELECT handle_key FROM publishers WHERE handle = 'Émile';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(key, "émile");

    let duplicate = conn.execute(
        "INSERT INTO publishers (uuid, account_ref, handle, handle_key, created_at)
         VALUES ('00000000-0000-4000-8000-000000000002', NULL, 'ÉMILE', 'émile', 2);",
        [],
    );
    assert!(duplicate.is_err());

    let rerun = apply_migrations(&mut conn).unwrap();
    assert!(rerun.applied.is_empty());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("socialgraph.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "edges");
}

#[test]
fn file_database_uses_wal_journal() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("wal.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteEdgeRepository::try_new(&conn).err().unwrap();
    match err {
        RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        } => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn edges_table_rejects_unknown_kinds_and_self_follows() {
    let conn = open_db_in_memory().unwrap();

    let unknown_kind = conn.execute(
        "INSERT INTO edges (kind, from_uuid, to_uuid, created_at) VALUES ('blocks', 'a', 'b', 1);",
        [],
    );
    assert!(unknown_kind.is_err());

    let self_follow = conn.execute(
        "INSERT INTO edges (kind, from_uuid, to_uuid, created_at) VALUES ('follows', 'a', 'a', 1);",
        [],
    );
    assert!(self_follow.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, object_type: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [object_type, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{object_type} {name} does not exist");
}
