use notepad_core::db::migrations::{
    apply_migrations, latest_version, pending_steps, schema_version,
};
use notepad_core::db::{
    open_db, open_db_in_memory, table_columns, DbError, KV_COLUMNS, KV_TABLE,
};
use notepad_core::{KvRepository, SqliteKvRepository};
use rusqlite::Connection;

#[test]
fn fresh_database_gets_the_slot_table_columns() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_eq!(table_columns(&conn, KV_TABLE).unwrap(), KV_COLUMNS.to_vec());
}

#[test]
fn slot_key_is_the_primary_key_and_timestamp_has_a_default() {
    let conn = open_db_in_memory().unwrap();

    let mut stmt = conn
        .prepare("SELECT name, pk, \"notnull\", dflt_value FROM pragma_table_info(?1);")
        .unwrap();
    let columns: Vec<(String, i64, bool, Option<String>)> = stmt
        .query_map([KV_TABLE], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let key = columns.iter().find(|column| column.0 == "key").unwrap();
    assert_eq!(key.1, 1, "key must be the primary key");
    assert!(columns
        .iter()
        .filter(|column| column.0 != "key")
        .all(|column| column.1 == 0));
    assert!(columns.iter().all(|column| column.2), "all columns are NOT NULL");

    let updated_at = columns
        .iter()
        .find(|column| column.0 == "updated_at")
        .unwrap();
    assert!(updated_at.3.is_some(), "updated_at needs a default");
}

#[test]
fn raw_insert_fills_updated_at_and_rejects_duplicate_keys() {
    let conn = open_db_in_memory().unwrap();

    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('@notepad_notes', '[]');",
        [],
    )
    .unwrap();
    let stamped: i64 = conn
        .query_row(
            "SELECT updated_at FROM kv_store WHERE key = '@notepad_notes';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(stamped > 0);

    let duplicate = conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('@notepad_notes', '[1]');",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn repeated_writes_upsert_a_single_row_per_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::try_new(&conn).unwrap();

    repo.set_item("@notepad_notes", "[]").unwrap();
    repo.set_item("@notepad_notes", "[{\"id\":\"1\"}]").unwrap();
    repo.set_item("@other", "x").unwrap();

    let rows: Vec<(String, String)> = conn
        .prepare("SELECT key, value FROM kv_store ORDER BY key;")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("@notepad_notes".to_string(), "[{\"id\":\"1\"}]".to_string()),
            ("@other".to_string(), "x".to_string()),
        ]
    );
}

#[test]
fn reopening_a_file_runs_no_steps_and_keeps_slots() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notepad.db");

    let conn = open_db(&path).unwrap();
    SqliteKvRepository::try_new(&conn)
        .unwrap()
        .set_item("@notepad_notes", "[]")
        .unwrap();
    drop(conn);

    let mut conn = open_db(&path).unwrap();
    assert!(pending_steps(schema_version(&conn).unwrap()).is_empty());
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
    assert_eq!(
        SqliteKvRepository::try_new(&conn)
            .unwrap()
            .get_item("@notepad_notes")
            .unwrap()
            .as_deref(),
        Some("[]")
    );
}

#[test]
fn bare_file_is_migrated_from_version_zero() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert_eq!(pending_steps(0).len(), latest_version() as usize);

    let applied = apply_migrations(&mut conn).unwrap();
    assert_eq!(applied, pending_steps(0).len());
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
}

#[test]
fn file_from_a_newer_build_is_refused_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert!(table_columns(&conn, KV_TABLE).unwrap().is_empty());
}
