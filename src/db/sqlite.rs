//! SQLite database client implementation.
//!
//! A SQLite "database" is a file, so switching databases reopens the
//! connection on another existing file.

use crate::config::{ConnectionConfig, SQLITE_MEMORY};
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ConnectorError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Connection, Either, Executor, Row as SqlxRow};
use sqlx::{Statement, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::{debug, warn};

/// SQLite database client holding a single live connection.
#[derive(Debug)]
pub struct SqliteClient {
    conn: SqliteConnection,
    path: String,
}

impl SqliteClient {
    /// Opens the database file named by `config.database`, creating it when
    /// missing. No database name means a private in-memory database.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let path = config.database.as_deref().unwrap_or(SQLITE_MEMORY);
        let conn = open(path, true).await.map_err(|e| {
            warn!("Cannot open SQLite database '{path}': {e}");
            ConnectorError::ConnectFailure
        })?;
        debug!("Opened SQLite database '{path}'");

        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// Returns the path of the currently open database.
    pub fn path(&self) -> &str {
        &self.path
    }
}

async fn open(path: &str, create_if_missing: bool) -> sqlx::Result<SqliteConnection> {
    let options = if path == SQLITE_MEMORY {
        "sqlite::memory:".parse::<SqliteConnectOptions>()?
    } else {
        SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create_if_missing)
    };
    options.connect().await
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let mut columns = Vec::new();
        let mut rows: Vec<Row> = Vec::new();

        // sqlite3_changes() keeps the count of the last write across reads,
        // so the statement's own count is the difference in total changes.
        let changes_before = total_changes(&mut self.conn).await?;

        let mut stream = (&mut self.conn).fetch_many(sql);
        while let Some(item) = stream.try_next().await.map_err(|e| {
            warn!("Query failed: {e}");
            ConnectorError::QueryFailure
        })? {
            match item {
                Either::Left(_) => {}
                Either::Right(row) => {
                    if columns.is_empty() {
                        columns = column_info(&row);
                    }
                    rows.push(convert_row(&row));
                }
            }
        }
        drop(stream);

        let changes_after = total_changes(&mut self.conn).await?;
        let rows_affected = u64::try_from(changes_after - changes_before).unwrap_or(0);

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
        let conn = open(name, false).await.map_err(|e| {
            warn!("Cannot switch to SQLite database '{name}': {e}");
            ConnectorError::DatabaseNotExists
        })?;

        let old = std::mem::replace(&mut self.conn, conn);
        if let Err(e) = old.close().await {
            warn!("Error while closing SQLite database '{}': {e}", self.path);
        }
        debug!("Switched from '{}' to '{name}'", self.path);
        self.path = name.to_string();
        Ok(())
    }

    async fn close(self: Box<Self>) {
        let SqliteClient { conn, path } = *self;
        if let Err(e) = conn.close().await {
            warn!("Error while closing SQLite database '{path}': {e}");
        }
    }
}

async fn total_changes(conn: &mut SqliteConnection) -> Result<i64> {
    sqlx::query_scalar("SELECT total_changes()")
        .fetch_one(conn)
        .await
        .map_err(|e| {
            warn!("Cannot read SQLite change counter: {e}");
            ConnectorError::QueryFailure
        })
}

fn column_info(row: &SqliteRow) -> Vec<ColumnInfo> {
    row.columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Converts a single cell by its storage class, not its declared type.
///
/// INTEGER, REAL and TEXT cells all take SQLite's own text rendering, so
/// `1.0` stays `1.0` instead of being parsed and printed as `1`.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
