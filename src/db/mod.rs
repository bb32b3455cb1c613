//! Database abstraction layer.
//!
//! Provides a trait-based interface over the client library, so the
//! connector can drive different database backends interchangeably.

mod mysql;
mod sqlite;
mod types;

pub use mysql::MySqlClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value, NULL_TEXT};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend (0 for serverless SQLite).
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Sqlite => 0,
        }
    }
}

/// Creates a database client for the given backend and configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::MySql => {
            let client = MySqlClient::connect(config).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(config).await?;
            Ok(Box::new(client))
        }
    }
}

/// Trait defining the interface for database clients.
///
/// Each client owns exactly one live connection. Failures are reported as
/// fixed `ConnectorError` variants; driver details go to the log.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes a SQL statement and returns everything it produced.
    ///
    /// Statements that return no rows yield an empty `rows` and, when the
    /// driver cannot report them, empty `columns`.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Reports the result columns of a statement without running it.
    async fn describe_columns(&mut self, sql: &str) -> Result<Vec<ColumnInfo>>;

    /// Switches the active database on the live connection.
    async fn select_database(&mut self, name: &str) -> Result<()>;

    /// Closes the connection. Close errors are logged, not returned.
    async fn close(self: Box<Self>);
}
