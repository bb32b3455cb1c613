//! Blocking connector with an indexed result cache.
//!
//! [`Connector`] owns the credentials, one live connection and the text table
//! built from the most recent `SELECT`. Every call blocks the calling thread
//! until the client library returns.
//!
//! ```no_run
//! use sql_connector::Connector;
//!
//! fn main() -> sql_connector::Result<()> {
//!     let mut conn = Connector::new("localhost", "root", "secret", "shop", 3306);
//!     conn.connect()?;
//!     conn.query("SELECT id, name FROM users")?;
//!     for row in 0..conn.row_count() {
//!         for column in 0..conn.field_count() {
//!             print!("{:<15}", conn.field(row, column)?);
//!         }
//!         println!();
//!     }
//!     Ok(())
//! }
//! ```

use crate::config::ConnectionConfig;
use crate::db::{self, DatabaseClient, QueryResult, Row};
use crate::error::{ConnectorError, Result};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

/// Returns true if the command populates the result cache.
///
/// Only the exact prefixes `SELECT` and `select` count; `Select ...` runs but
/// is not cached.
pub fn is_select_command(command: &str) -> bool {
    command.starts_with("SELECT") || command.starts_with("select")
}

/// Row-major text copy of a `SELECT` result.
///
/// Every cell is stored as text; SQL NULL is stored as `"NULL"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCache {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultCache {
    /// Builds a complete cache from a raw result.
    pub fn from_result(result: &QueryResult) -> Self {
        let columns: Vec<String> = result.columns.iter().map(|c| c.name.clone()).collect();
        let rows = result
            .rows
            .iter()
            .map(|row| {
                // Pad or cut so every row has exactly one cell per column.
                (0..columns.len())
                    .map(|i| row.get(i).map(|v| v.to_display_string()).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Number of cached rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cached columns.
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the cell at `(row, column)`, if inside the extent.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Returns the name of a column.
    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Returns the index of the first column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterates over the cached rows.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// The live part of a connector: its runtime and connection.
struct Session {
    runtime: Runtime,
    client: Box<dyn DatabaseClient>,
}

impl Session {
    fn close(self) {
        let Session { runtime, client } = self;
        runtime.block_on(client.close());
    }
}

/// A single-owner SQL connection with a cached, indexable result set.
///
/// The connector is move-only. It drives the async client on a private
/// current-thread runtime, so it must not be used from inside another tokio
/// runtime; async callers use [`db::connect`] directly.
///
/// This includes dropping: `Drop` closes a live connection with
/// `block_on`, which panics inside a tokio context. Call
/// [`Connector::close`] or drop the connector outside the runtime.
pub struct Connector {
    config: ConnectionConfig,
    session: Option<Session>,
    last_result: Option<QueryResult>,
    cursor: usize,
    cache: Option<ResultCache>,
    affected_rows: u64,
}

impl Connector {
    /// Creates a MySQL connector. All text arguments are copied.
    ///
    /// Nothing is contacted until [`Connector::connect`].
    pub fn new(host: &str, user: &str, password: &str, database: &str, port: u16) -> Self {
        Self::with_config(ConnectionConfig::mysql(host, user, password, database, port))
    }

    /// Creates a connector for any backend.
    pub fn with_config(config: ConnectionConfig) -> Self {
        Self {
            config,
            session: None,
            last_result: None,
            cursor: 0,
            cache: None,
            affected_rows: 0,
        }
    }

    /// Returns the stored connection settings.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns true while a live connection is held.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Connects using the stored credentials.
    ///
    /// Any previous connection, raw result and cache are released first.
    /// Credentials are kept, so a failed connect can be retried.
    pub fn connect(&mut self) -> Result<()> {
        self.release();

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                warn!("Cannot start connector runtime: {e}");
                ConnectorError::ConnectFailure
            })?;

        let client = runtime.block_on(db::connect(&self.config))?;
        info!("Connected to {}", self.config.display_string());

        self.session = Some(Session { runtime, client });
        Ok(())
    }

    /// Closes the live connection and drops any cached result.
    pub fn close(&mut self) {
        if self.session.is_some() {
            info!("Closing connection to {}", self.config.display_string());
        }
        self.release();
    }

    fn release(&mut self) {
        self.last_result = None;
        self.cursor = 0;
        self.cache = None;
        self.affected_rows = 0;
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    /// Executes a SQL command.
    ///
    /// A missing or empty command fails with `NullCommand` before the
    /// connection is touched. A successful command starting with `SELECT` or
    /// `select` replaces the result cache in full; any other command, and any
    /// failed command, leaves the previous cache as it was.
    pub fn query<'a>(&mut self, command: impl Into<Option<&'a str>>) -> Result<()> {
        let command = match command.into() {
            Some(command) if !command.is_empty() => command,
            _ => return Err(ConnectorError::NullCommand),
        };

        let session = self.session.as_mut().ok_or(ConnectorError::NotConnected)?;
        let Session { runtime, client } = session;

        let mut result = runtime.block_on(client.execute_query(command))?;
        self.affected_rows = result.rows_affected;

        if !is_select_command(command) {
            debug!("Command is not a SELECT; result cache unchanged");
            return Ok(());
        }

        if result.columns.is_empty() {
            // No rows came back, so the column shape has to be asked for.
            result.columns = runtime
                .block_on(client.describe_columns(command))
                .unwrap_or_default();
        }

        let cache = ResultCache::from_result(&result);
        debug!(
            "Cached {} rows x {} fields",
            cache.row_count(),
            cache.field_count()
        );
        self.cache = Some(cache);
        self.last_result = Some(result);
        self.cursor = 0;
        Ok(())
    }

    /// Number of rows in the most recent `SELECT` result.
    pub fn row_count(&self) -> usize {
        self.cache.as_ref().map_or(0, ResultCache::row_count)
    }

    /// Number of columns in the most recent `SELECT` result.
    pub fn field_count(&self) -> usize {
        self.cache.as_ref().map_or(0, ResultCache::field_count)
    }

    /// Rows changed by the most recent successful command.
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// Switches the active database. `None` is a no-op.
    ///
    /// The result cache is not affected.
    pub fn change_database<'a>(&mut self, name: impl Into<Option<&'a str>>) -> Result<()> {
        let Some(name) = name.into() else {
            return Ok(());
        };

        let session = self.session.as_mut().ok_or(ConnectorError::NotConnected)?;
        session
            .runtime
            .block_on(session.client.select_database(name))?;
        info!("Active database is now '{name}'");
        Ok(())
    }

    /// Returns the cached text at `(row, column)`.
    ///
    /// Fails with `IndexOutOfBounds` unless `row < row_count()` and
    /// `column < field_count()`.
    pub fn field(&self, row: usize, column: usize) -> Result<&str> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.get(row, column))
            .ok_or(ConnectorError::IndexOutOfBounds)
    }

    /// Returns the cached text at `row` in the first column called `name`.
    pub fn field_by_name(&self, row: usize, name: &str) -> Result<&str> {
        let cache = self.cache.as_ref().ok_or(ConnectorError::IndexOutOfBounds)?;
        let column = cache
            .column_index(name)
            .ok_or(ConnectorError::IndexOutOfBounds)?;
        self.field(row, column)
    }

    /// Returns the name of a cached column.
    pub fn column_name(&self, column: usize) -> Result<&str> {
        self.cache
            .as_ref()
            .and_then(|cache| cache.column_name(column))
            .ok_or(ConnectorError::IndexOutOfBounds)
    }

    /// Iterates over the cached rows.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cache.iter().flat_map(|cache| cache.rows())
    }

    /// Returns the first cached row, or `NoElement` if there is none.
    pub fn first_row(&self) -> Result<&[String]> {
        self.rows().next().ok_or(ConnectorError::NoElement)
    }

    /// Returns the whole cache, if a `SELECT` has succeeded.
    pub fn result_cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    /// Returns the next raw row of the last `SELECT` result.
    ///
    /// Advances a fetch cursor of its own: reading cells through
    /// [`Connector::field`] does not move it, and it restarts at the first
    /// row after every successful `SELECT`. Returns `None` once exhausted.
    #[deprecated(note = "use `field` for indexed access to the cached result")]
    pub fn fetch_row(&mut self) -> Option<&Row> {
        let row = self.last_result.as_ref()?.rows.get(self.cursor)?;
        self.cursor += 1;
        Some(row)
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("connection", &self.config.display_string())
            .field("connected", &self.is_connected())
            .field("row_count", &self.row_count())
            .field("field_count", &self.field_count())
            .finish()
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        self.release();
    }
}
