//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL and MariaDB servers using sqlx.
//!
//! Statements are sent unprepared (`COM_QUERY`), so every cell arrives in the
//! server's text representation and is kept as text.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ConnectorError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection, Either, Executor, Row as SqlxRow};
use sqlx::{Statement, TypeInfo};
use std::time::Instant;
use tracing::{debug, warn};

/// MySQL database client holding a single live connection.
#[derive(Debug)]
pub struct MySqlClient {
    conn: MySqlConnection,
}

impl MySqlClient {
    /// Opens a connection using the host, port, credentials and default
    /// database in `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config);

        debug!("Connecting to {}", config.display_string());
        let conn = options.connect().await.map_err(|e| {
            warn!("Connection to {} failed: {e}", config.display_string());
            ConnectorError::ConnectFailure
        })?;
        debug!("Successfully connected to database");

        Ok(Self { conn })
    }
}

/// Builds driver options from a connection config.
fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .port(config.port());

    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }

    options
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let mut columns = Vec::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut rows_affected = 0;

        let mut stream = (&mut self.conn).fetch_many(sql);
        while let Some(item) = stream.try_next().await.map_err(|e| {
            warn!("Query failed: {}", format_query_error(&e));
            ConnectorError::QueryFailure
        })? {
            match item {
                Either::Left(done) => rows_affected += done.rows_affected(),
                Either::Right(row) => {
                    if columns.is_empty() {
                        columns = column_info(&row);
                    }
                    rows.push(convert_row(&row));
                }
            }
        }
        drop(stream);

        let execution_time = start.elapsed();
        debug!(
            "Query returned {} rows ({} affected) in {:?}",
            rows.len(),
            rows_affected,
            execution_time
        );

        Ok(QueryResult {
            columns,
            rows,
            rows_affected,
            execution_time,
        })
    }

    async fn describe_columns(&mut self, sql: &str) -> Result<Vec<ColumnInfo>> {
        let statement = (&mut self.conn).prepare(sql).await.map_err(|e| {
            debug!("Could not describe statement: {e}");
            ConnectorError::QueryFailure
        })?;

        Ok(statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect())
    }

    async fn select_database(&mut self, name: &str) -> Result<()> {
        let sql = format!("USE {}", quote_identifier(name));
        (&mut self.conn).execute(sql.as_str()).await.map_err(|e| {
            warn!("Cannot switch to database '{name}': {e}");
            ConnectorError::DatabaseNotExists
        })?;
        debug!("Switched to database '{name}'");
        Ok(())
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            warn!("Error while closing MySQL connection: {e}");
        }
    }
}

/// Quotes a MySQL identifier with backticks.
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn column_info(row: &MySqlRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts a single text-protocol cell.
///
/// Cells that are not valid UTF-8 (binary columns) are kept as raw bytes.
fn convert_value(row: &MySqlRow, index: usize) -> Value {
    match row.try_get_unchecked::<Option<String>, _>(index) {
        Ok(text) => text.map(Value::String).unwrap_or(Value::Null),
        Err(_) => row
            .try_get_unchecked::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
    }
}

/// Formats a query error with the server error code if available.
fn format_query_error(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.code() {
            Some(code) => format!("ERROR {code}: {}", db_error.message()),
            None => format!("ERROR: {}", db_error.message()),
        },
        None => error.to_string(),
    }
}
