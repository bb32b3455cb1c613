//! Query result types.
//!
//! Defines the raw result of a statement as the client library reports it,
//! before the connector flattens it into text cells.

use std::fmt;
use std::time::Duration;

/// Text stored for a SQL NULL cell.
pub const NULL_TEXT: &str = "NULL";

/// Represents the result of executing a SQL statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data.
    pub rows: Vec<Row>,

    /// Rows changed by the statement, as reported by the server.
    pub rows_affected: u64,

    /// Time taken to execute the statement.
    pub execution_time: Duration,
}

impl QueryResult {
    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type, as named by the driver.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single cell as the client library hands it over.
///
/// Cells keep the library's own text rendering; numbers are never parsed
/// and printed again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Text as rendered by the library.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the text form of the value, with NULL rendered as `"NULL"`.
    ///
    /// Binary data is decoded as UTF-8 with replacement characters, the way a
    /// text-protocol client would hand it over.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => NULL_TEXT.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}
