//! Result types for ch-glance.
//!
//! Defines the normalized tabular result produced from ClickHouse responses.

use crate::error::{ClientError, Result};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Outcome of interpreting one HTTP response.
///
/// Decided once from the requested format and the first byte of the body.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A JSON body parsed into columns and rows.
    Table(TabularResult),

    /// Body returned unmodified (no format or a non-JSON format was requested).
    Raw(String),

    /// JSON was requested but the server sent no JSON document (e.g. DDL).
    Empty,
}

impl Response {
    /// Converts the response into a table; `Empty` becomes an empty table.
    pub fn into_table(self) -> Result<TabularResult> {
        match self {
            Self::Table(table) => Ok(table),
            Self::Empty => Ok(TabularResult::new()),
            Self::Raw(_) => Err(ClientError::unexpected(
                "expected a JSON result set, got raw text",
            )),
        }
    }

    /// Returns the raw body text, if this is a passthrough response.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Raw(text) => Some(text),
            _ => None,
        }
    }
}

/// Normalized column/row representation of a query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    /// Column metadata for the result set, in server order.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data; each row has exactly one value per column.
    pub rows: Vec<Row>,

    /// Server-side statistics, when the server reported them.
    pub statistics: Option<QueryStatistics>,
}

impl TabularResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a result, rejecting duplicate column names and ragged rows.
    pub fn try_new(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(ClientError::Parse {
                excerpt: format!("duplicate column '{}' in result metadata", dup.name),
            });
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ClientError::Parse {
                excerpt: format!(
                    "row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    columns.len()
                ),
            });
        }

        Ok(Self {
            columns,
            rows,
            statistics: None,
        })
    }

    /// Attaches server statistics.
    pub fn with_statistics(mut self, statistics: QueryStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the first value of the first row.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Flattens all rows into a single sequence of values, row-major.
    pub fn into_flat_values(self) -> Vec<Value> {
        self.rows.into_iter().flatten().collect()
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// ClickHouse type as reported in `meta` (e.g. `UInt32`, `Nullable(String)`).
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

/// Statistics block written when `output_format_write_statistics=1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStatistics {
    /// Server-side elapsed time.
    pub elapsed: Duration,

    /// Rows read by the server.
    pub rows_read: u64,

    /// Bytes read by the server.
    pub bytes_read: u64,
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single cell decoded from a JSON response.
///
/// 64-bit integers arrive quoted in ClickHouse JSON output and therefore
/// surface as `String`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Unsigned integer that does not fit in i64.
    UInt(u64),

    /// Floating point number.
    Float(f64),

    /// Text value.
    String(String),

    /// Array or tuple.
    Array(Vec<Value>),

    /// Map or named tuple, in key order.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let inner: Vec<String> = items.iter().map(Value::to_display_string).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Object(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_display_string()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }

    /// Converts back to a JSON value for serialization.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::UInt(u) => Json::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
