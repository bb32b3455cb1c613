//! sql-connector - a simple blocking SQL connector.
//!
//! Connect with a set of credentials, run statements one at a time and read
//! the most recent `SELECT` result back by row and column index.

pub mod config;
pub mod connector;
pub mod db;
pub mod error;
pub mod logging;

pub use config::{Config, ConnectionConfig};
pub use connector::{is_select_command, Connector, ResultCache};
pub use db::DatabaseBackend;
pub use error::{ConnectorError, Result};
