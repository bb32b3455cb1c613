//! Query execution integration tests.
//!
//! Tests SQL execution, SELECT classification and failure handling.

use super::users_connector;
use pretty_assertions::assert_eq;
use sql_connector::ConnectorError;

#[test]
fn test_users_scenario() {
    let mut conn = users_connector();

    conn.query("SELECT id,name FROM users ORDER BY id").unwrap();

    assert_eq!(conn.row_count(), 2);
    assert_eq!(conn.field_count(), 2);
    assert_eq!(conn.field(0, 1).unwrap(), "Alice");
    assert_eq!(conn.field(1, 0).unwrap(), "2");
}

#[test]
fn test_every_cell_matches_library_text() {
    let mut conn = users_connector();

    conn.query("SELECT * FROM users ORDER BY id").unwrap();

    let expected = [
        ["1", "Alice", "alice@example.com"],
        ["2", "Bob", "NULL"],
    ];
    assert_eq!(conn.row_count(), expected.len());
    assert_eq!(conn.field_count(), 3);
    for (r, row) in expected.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            assert_eq!(conn.field(r, c).unwrap(), *cell, "cell ({r}, {c})");
        }
    }
}

#[test]
fn test_lowercase_select_is_cached() {
    let mut conn = users_connector();
    conn.query("select name from users where id = 2").unwrap();
    assert_eq!(conn.row_count(), 1);
    assert_eq!(conn.field(0, 0).unwrap(), "Bob");
}

#[test]
fn test_mixed_case_select_runs_but_is_not_cached() {
    let mut conn = users_connector();
    conn.query("Select * from users").unwrap();

    assert_eq!(conn.row_count(), 0);
    assert_eq!(conn.field_count(), 0);
}

#[test]
fn test_null_command_never_touches_counts() {
    let mut conn = users_connector();
    conn.query("SELECT id FROM users").unwrap();

    assert_eq!(conn.query(None), Err(ConnectorError::NullCommand));
    assert_eq!(conn.query(""), Err(ConnectorError::NullCommand));

    assert_eq!(conn.row_count(), 2);
    assert_eq!(conn.field_count(), 1);
}

#[test]
fn test_failed_query_keeps_previous_cache() {
    let mut conn = users_connector();
    conn.query("SELECT name FROM users ORDER BY id").unwrap();

    let result = conn.query("SELECT * FROM nonexistent_table_xyz");
    assert_eq!(result, Err(ConnectorError::QueryFailure));

    assert_eq!(conn.row_count(), 2);
    assert_eq!(conn.field(0, 0).unwrap(), "Alice");
}

#[test]
fn test_syntax_error_is_query_failure() {
    let mut conn = users_connector();
    assert_eq!(
        conn.query("UPDATE users SET WHERE"),
        Err(ConnectorError::QueryFailure)
    );
}

#[test]
fn test_affected_rows() {
    let mut conn = users_connector();

    conn.query("UPDATE users SET email = 'x@example.com'").unwrap();
    assert_eq!(conn.affected_rows(), 2);

    conn.query("DELETE FROM users WHERE id = 1").unwrap();
    assert_eq!(conn.affected_rows(), 1);
}

#[test]
fn test_select_reports_no_affected_rows() {
    let mut conn = users_connector();

    conn.query("INSERT INTO users (id, name) VALUES (3, 'Carol'), (4, 'Dave')")
        .unwrap();
    assert_eq!(conn.affected_rows(), 2);

    conn.query("SELECT id FROM users").unwrap();
    assert_eq!(conn.row_count(), 4);
    assert_eq!(conn.affected_rows(), 0);

    conn.query("DELETE FROM users WHERE id > 2").unwrap();
    conn.query("SELECT id FROM users WHERE id > 2").unwrap();
    assert_eq!(conn.row_count(), 0);
    assert_eq!(conn.affected_rows(), 0);
}

#[test]
fn test_real_column_keeps_library_text() {
    let mut conn = users_connector();
    conn.query("CREATE TABLE prices (amount REAL)").unwrap();
    conn.query("INSERT INTO prices VALUES (1.0), (0.5)").unwrap();

    conn.query("SELECT amount, CAST(amount AS TEXT) FROM prices").unwrap();
    assert_eq!(conn.field(0, 0).unwrap(), "1.0");
    assert_eq!(conn.field(0, 0).unwrap(), conn.field(0, 1).unwrap());
    assert_eq!(conn.field(1, 0).unwrap(), "0.5");
}
