use roster_core::config::DatabaseConfig;
use roster_core::db::migrations::{latest_version, schema_version};
use roster_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use roster_core::{RepoError, SqliteMemberRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_roster_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "team");
    assert_table_exists(&conn, "member");
}

#[test]
fn foreign_keys_are_enabled() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");

    let first = open_db(&path).unwrap();
    first
        .execute("INSERT INTO team (name) VALUES ('teamA');", [])
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), latest_version());
    let teams: i64 = second
        .query_row("SELECT COUNT(*) FROM team;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(teams, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn config_without_path_opens_memory_database() {
    let conn = open_db_with_config(&DatabaseConfig::default()).unwrap();
    assert_table_exists(&conn, "member");
    assert!(conn.path().map_or(true, str::is_empty));
}

#[test]
fn config_with_path_opens_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: Some(dir.path().join("configured.db")),
        busy_timeout_ms: 100,
    };

    let conn = open_db_with_config(&config).unwrap();
    assert_table_exists(&conn, "team");
    assert!(dir.path().join("configured.db").exists());
}

#[test]
fn repository_rejects_unbootstrapped_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteMemberRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("team")));
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
