use league_db::open_memory;
use league_db::schema::{CURRENT_VERSION, create_schema};

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "divisions",
        "locations",
        "teams",
        "timeslots",
        "location_availability",
        "team_availability",
        "previous_games",
        "import_log",
        "import_sessions",
        "audit_log",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table {table} should exist");
    }
}

#[test]
fn open_database_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("league.db");
    let conn = league_db::open_database(&path).unwrap();
    drop(conn);
    assert!(path.exists());

    // Reopening an existing database keeps the schema version.
    let conn = league_db::open_database(&path).unwrap();
    let version: i32 = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn migrates_version_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.db");
    {
        let conn = league_db::open_database(&path).unwrap();
        conn.execute_batch("DROP TABLE audit_log; DELETE FROM schema_version; INSERT INTO schema_version (version) VALUES (1);")
            .unwrap();
    }
    let conn = league_db::open_database(&path).unwrap();
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='audit_log')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
}
