//! Table and column descriptors for ch-glance.
//!
//! Derived from `DESCRIBE TABLE` and `SHOW CREATE TABLE` results.

use super::types::{TabularResult, Value};
use crate::error::{ClientError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// One column of a described table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,

    /// Declared ClickHouse type (e.g. `Nullable(String)`).
    pub data_type: String,

    /// Whether the declared type is `Nullable(...)`.
    pub is_nullable: bool,

    /// Default expression, if one is declared.
    pub default: Option<String>,
}

impl ColumnDescriptor {
    /// Builds descriptors from a `DESCRIBE TABLE` result.
    ///
    /// Columns are looked up by name (`name`, `type`, `default_expression`)
    /// and fall back to positions 0, 1 and 3.
    pub fn from_describe(result: &TabularResult) -> Result<Vec<Self>> {
        let name_idx = result.column_index("name").unwrap_or(0);
        let type_idx = result.column_index("type").unwrap_or(1);
        let default_idx = result.column_index("default_expression").unwrap_or(3);

        result
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let name = text_cell(row.get(name_idx)).ok_or_else(|| ClientError::Parse {
                    excerpt: format!("describe row {} has no column name", idx),
                })?;
                let data_type = text_cell(row.get(type_idx)).ok_or_else(|| ClientError::Parse {
                    excerpt: format!("describe row {} has no column type", idx),
                })?;
                let default = text_cell(row.get(default_idx)).filter(|d| !d.is_empty());

                Ok(Self {
                    name,
                    is_nullable: data_type.contains("Nullable"),
                    data_type,
                    default,
                })
            })
            .collect()
    }

    /// Returns the abstract kind of the declared type, if it has one.
    pub fn native_type(&self) -> Option<NativeType> {
        NativeType::from_sql_type(&self.data_type)
    }

    /// Returns the byte limit implied by the declared type.
    pub fn limit(&self) -> Option<u32> {
        type_limit(&self.data_type)
    }
}

fn text_cell(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_display_string()),
    }
}

/// A described table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,

    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,

    /// Whether the relation is a view or materialized view.
    pub is_view: bool,
}

impl TableDescriptor {
    /// Returns the primary key column name.
    ///
    /// The store has no declared primary keys here; a table whose first column
    /// is `id` is treated as keyed by it.
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .first()
            .filter(|c| c.name == "id")
            .map(|c| c.name.as_str())
    }
}

/// Returns true if a `SHOW CREATE` statement defines a view.
pub(crate) fn is_view_definition(create_sql: &str) -> bool {
    let normalized = create_sql.trim_start().to_uppercase();
    normalized.starts_with("CREATE VIEW")
        || normalized.starts_with("CREATE MATERIALIZED VIEW")
        || normalized.starts_with("CREATE LIVE VIEW")
}

/// Abstract column kinds and the store types they map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    String,
    Integer,
    BigInteger,
    Float,
    Decimal,
    DateTime,
    Date,
    Boolean,
}

impl NativeType {
    /// Returns the store type used when creating a column of this kind.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "UInt32",
            Self::BigInteger => "UInt64",
            Self::Float => "Float32",
            Self::Decimal => "Decimal",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Boolean => "UInt8",
        }
    }

    /// Returns the kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::BigInteger => "big_integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }

    /// Classifies a declared store type, looking through `Nullable(...)`.
    pub fn from_sql_type(sql_type: &str) -> Option<Self> {
        let inner = sql_type
            .strip_prefix("Nullable(")
            .and_then(|t| t.strip_suffix(')'))
            .unwrap_or(sql_type);

        match inner {
            "String" => Some(Self::String),
            t if t.starts_with("FixedString(") => Some(Self::String),
            "UInt8" | "UInt16" | "UInt32" | "Int8" | "Int16" | "Int32" => Some(Self::Integer),
            "UInt64" | "Int64" => Some(Self::BigInteger),
            "Float32" | "Float64" => Some(Self::Float),
            t if t.starts_with("Decimal") => Some(Self::Decimal),
            t if t.starts_with("DateTime") => Some(Self::DateTime),
            "Date" | "Date32" => Some(Self::Date),
            "Bool" => Some(Self::Boolean),
            _ => None,
        }
    }
}

impl FromStr for NativeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "big_integer" => Ok(Self::BigInteger),
            "float" => Ok(Self::Float),
            "decimal" => Ok(Self::Decimal),
            "datetime" => Ok(Self::DateTime),
            "date" => Ok(Self::Date),
            "boolean" => Ok(Self::Boolean),
            _ => Err(format!("Unknown column kind: {s}")),
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn small_int_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Nullable\(U?Int(8|16)\)").expect("valid regex"))
}

fn large_int_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"Nullable\(U?Int(32|64)\)").expect("valid regex"))
}

/// Returns the byte limit implied by a nullable store type.
pub fn type_limit(sql_type: &str) -> Option<u32> {
    if sql_type == "Nullable(String)" {
        Some(255)
    } else if small_int_pattern().is_match(sql_type) {
        Some(4)
    } else if large_int_pattern().is_match(sql_type) {
        Some(8)
    } else {
        None
    }
}
