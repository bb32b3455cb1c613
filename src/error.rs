//! Error types for the SQL connector.
//!
//! Every failure the connector can report is a fixed variant of
//! [`ConnectorError`]. Driver details are logged, not carried.

use thiserror::Error;

/// Main error type for connector operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// Connection establishment failed (host unreachable, bad credentials, etc.)
    #[error("SQL connect failure")]
    ConnectFailure,

    /// The server or driver rejected the command.
    #[error("SQL query failure")]
    QueryFailure,

    /// The cached result set has no rows.
    #[error("No element in result")]
    NoElement,

    /// Switching the active database failed.
    #[error("Database does not exist")]
    DatabaseNotExists,

    /// Cell access outside the cached row/column extent.
    #[error("Index is not in range")]
    IndexOutOfBounds,

    /// The command was missing or empty.
    #[error("Null command: SQL command is empty")]
    NullCommand,

    /// An operation needed a live connection but `connect` has not succeeded.
    #[error("Not connected to a database")]
    NotConnected,

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConnectorError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConnectFailure | Self::NotConnected => "Connection Error",
            Self::QueryFailure | Self::NullCommand => "Query Error",
            Self::DatabaseNotExists => "Database Error",
            Self::NoElement | Self::IndexOutOfBounds => "Result Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

/// Result type alias using ConnectorError.
pub type Result<T> = std::result::Result<T, ConnectorError>;
