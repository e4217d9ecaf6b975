// Integration tests for the migration framework

use rusqlite::Connection;
use topo_store::migrations::{applied_migrations, apply_migrations};

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = apply_migrations(&mut conn);

    // Then: All migrations succeed
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());

    // And: the expected tables exist (sqlite_sequence comes from AUTOINCREMENT)
    let tables = get_table_names(&conn);
    for expected in ["schema_version", "objects", "instances", "sqlite_sequence"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with migrations already applied
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    // When: Migrations are applied again
    apply_migrations(&mut conn).unwrap();

    // Then: Each migration is recorded once
    let ids = applied_migrations(&conn).unwrap();
    assert_eq!(ids, vec!["001_topology_schema", "002_builtin_set_object"]);

    let objects: i64 = conn
        .query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))
        .unwrap();
    assert_eq!(objects, 1, "Seed rows must not be duplicated");
}

#[test]
fn test_checksums_recorded() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = '001_topology_schema'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(checksum.len(), 64);
}

#[test]
fn test_tampered_checksum_is_rejected() {
    // Given: a migrated database whose recorded checksum no longer matches
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_topology_schema'",
        [],
    )
    .unwrap();

    // When / Then: the runner refuses to continue
    let err = apply_migrations(&mut conn).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Checksum mismatch"), "got: {}", message);
}
