//! Connection integration tests.
//!
//! Tests connecting, reconnecting, database switching and configuration.

use pretty_assertions::assert_eq;
use sql_connector::{ConnectionConfig, Connector, ConnectorError, DatabaseBackend};

#[test]
fn test_connect_to_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");

    let mut conn = Connector::with_config(ConnectionConfig::sqlite(path.to_str().unwrap()));
    conn.connect().unwrap();
    conn.query("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (42)")
        .unwrap();
    drop(conn);

    // The data outlives the connector
    let mut conn = Connector::with_config(ConnectionConfig::sqlite(path.to_str().unwrap()));
    conn.connect().unwrap();
    conn.query("SELECT x FROM t").unwrap();
    assert_eq!(conn.field(0, 0).unwrap(), "42");
}

#[test]
fn test_connect_failure() {
    let mut conn =
        Connector::with_config(ConnectionConfig::sqlite("/nonexistent/dir/for/sure/app.db"));

    assert_eq!(conn.connect(), Err(ConnectorError::ConnectFailure));
    assert!(!conn.is_connected());
    assert_eq!(conn.row_count(), 0);
    assert_eq!(conn.field_count(), 0);
}

#[test]
fn test_connect_refused_mysql() {
    // Nothing listens on port 1
    let mut conn = Connector::new("127.0.0.1", "nobody", "nothing", "shop", 1);
    assert_eq!(conn.connect(), Err(ConnectorError::ConnectFailure));
    assert!(!conn.is_connected());
}

#[test]
fn test_retry_after_failed_connect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("later").join("app.db");

    let mut conn = Connector::with_config(ConnectionConfig::sqlite(path.to_str().unwrap()));
    assert_eq!(conn.connect(), Err(ConnectorError::ConnectFailure));

    std::fs::create_dir(dir.path().join("later")).unwrap();
    conn.connect().unwrap();
    assert!(conn.is_connected());
}

#[test]
fn test_change_database_none_is_noop() {
    let mut conn = Connector::with_config(ConnectionConfig::sqlite_memory());
    conn.connect().unwrap();
    assert_eq!(conn.change_database(None), Ok(()));
    assert!(conn.is_connected());
}

#[test]
fn test_change_database_missing() {
    let mut conn = Connector::with_config(ConnectionConfig::sqlite_memory());
    conn.connect().unwrap();
    conn.query("CREATE TABLE still_here (x INTEGER)").unwrap();

    assert_eq!(
        conn.change_database("nonexistent_db"),
        Err(ConnectorError::DatabaseNotExists)
    );

    // The first connection is still active
    conn.query("SELECT * FROM still_here").unwrap();
    assert_eq!(conn.field_count(), 1);
}

#[test]
fn test_connector_from_connection_string() {
    let config = ConnectionConfig::from_connection_string("sqlite::memory:").unwrap();
    assert_eq!(config.backend, DatabaseBackend::Sqlite);

    let mut conn = Connector::with_config(config);
    conn.connect().unwrap();
    conn.query("SELECT 'ok'").unwrap();
    assert_eq!(conn.field(0, 0).unwrap(), "ok");
}

#[test]
fn test_connector_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Connector>();
}
