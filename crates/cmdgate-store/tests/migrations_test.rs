// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = cmdgate_store::migrations::apply_migrations(&mut conn);
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    let tables = get_table_names(&conn);
    let expected_tables = [
        "schema_version",
        "principals",
        "rules",
        "rule_set_state",
        "commands",
        "audit_log",
        "sqlite_sequence", // Auto-created by SQLite for AUTOINCREMENT columns
    ];
    assert_eq!(tables.len(), expected_tables.len(), "tables: {:?}", tables);
    for expected_table in &expected_tables {
        assert!(
            tables.contains(&expected_table.to_string()),
            "Missing table: {}",
            expected_table
        );
    }
}

#[test]
fn test_rule_set_revision_starts_at_zero() {
    let mut conn = setup_test_db();
    cmdgate_store::migrations::apply_migrations(&mut conn).unwrap();

    assert_eq!(cmdgate_store::RuleRepo::revision(&conn).unwrap(), 0);
}

#[test]
fn test_balance_check_constraint() {
    let mut conn = setup_test_db();
    cmdgate_store::migrations::apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO principals (id, name, credential_digest, role, balance, created_at)
         VALUES ('p', 'p', 'd', 'member', -1, 0)",
        [],
    );
    assert!(result.is_err(), "negative balance must violate CHECK");
}

#[test]
fn test_migrations_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("gateway.db");

    {
        let mut conn = cmdgate_store::db::open(&path).unwrap();
        cmdgate_store::migrations::apply_migrations(&mut conn).unwrap();
    }

    let mut conn = cmdgate_store::db::open(&path).unwrap();
    cmdgate_store::migrations::apply_migrations(&mut conn).unwrap();
    assert_eq!(
        cmdgate_store::migrations::applied_migrations(&conn).unwrap(),
        vec!["001_initial_schema", "002_audit_log"]
    );
}
