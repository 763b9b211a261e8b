//! Response interpretation.
//!
//! Checks the HTTP status and turns the body into a [`Response`] according to
//! the format that was requested.

use super::statement::OutputFormat;
use super::types::{ColumnInfo, QueryStatistics, Response, Row, TabularResult, Value};
use super::RawResponse;
use crate::error::{ClientError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Interprets a raw HTTP response for the given output format.
///
/// - any status other than 200 is an [`ClientError::Http`] carrying the body
/// - `JSON` / `JSONCompact` bodies are parsed only when they start with `{`,
///   otherwise the response is [`Response::Empty`]
/// - every other format, including none, returns the body as [`Response::Raw`]
pub fn interpret(raw: RawResponse, format: Option<&OutputFormat>) -> Result<Response> {
    if raw.status != 200 {
        return Err(ClientError::http(raw.status, raw.body));
    }

    match format {
        Some(format) if format.is_json() => {
            if raw.body.trim_start().starts_with('{') {
                parse_json_table(&raw.body).map(Response::Table)
            } else {
                Ok(Response::Empty)
            }
        }
        _ => Ok(Response::Raw(raw.body)),
    }
}

/// Parses a `JSON` or `JSONCompact` document into a table.
///
/// `JSON` rows are objects keyed by column name; they are laid out in `meta`
/// order so both formats yield the same shape.
pub fn parse_json_table(body: &str) -> Result<TabularResult> {
    let document: JsonDocument =
        serde_json::from_str(body).map_err(|_| ClientError::parse(body))?;

    let columns: Vec<ColumnInfo> = document
        .meta
        .into_iter()
        .map(|m| ColumnInfo::new(m.name, m.data_type))
        .collect();

    let rows = document
        .data
        .into_iter()
        .enumerate()
        .map(|(idx, row)| decode_row(idx, row, &columns))
        .collect::<Result<Vec<Row>>>()?;

    let result = TabularResult::try_new(columns, rows)?;

    Ok(match document.statistics {
        Some(stats) => result.with_statistics(stats.into()),
        None => result,
    })
}

fn decode_row(idx: usize, row: serde_json::Value, columns: &[ColumnInfo]) -> Result<Row> {
    match row {
        serde_json::Value::Array(cells) => Ok(cells.into_iter().map(Value::from).collect()),
        serde_json::Value::Object(mut cells) => {
            let values = columns
                .iter()
                .map(|column| {
                    cells
                        .remove(&column.name)
                        .map(Value::from)
                        .ok_or_else(|| ClientError::Parse {
                            excerpt: format!("row {} is missing column '{}'", idx, column.name),
                        })
                })
                .collect::<Result<Row>>()?;

            if !cells.is_empty() {
                let extra: Vec<&str> = cells.keys().map(String::as_str).collect();
                return Err(ClientError::Parse {
                    excerpt: format!(
                        "row {} has unexpected column(s) {}",
                        idx,
                        extra.join(", ")
                    ),
                });
            }
            Ok(values)
        }
        other => Err(ClientError::Parse {
            excerpt: format!("row {} is not an array or object: {}", idx, other),
        }),
    }
}

// ClickHouse JSON document shape

#[derive(Debug, Deserialize)]
struct JsonDocument {
    meta: Vec<MetaColumn>,
    data: Vec<serde_json::Value>,
    #[serde(default)]
    statistics: Option<JsonStatistics>,
}

#[derive(Debug, Deserialize)]
struct MetaColumn {
    name: String,
    #[serde(rename = "type", default)]
    data_type: String,
}

#[derive(Debug, Deserialize)]
struct JsonStatistics {
    #[serde(default)]
    elapsed: f64,
    #[serde(default)]
    rows_read: u64,
    #[serde(default)]
    bytes_read: u64,
}

impl From<JsonStatistics> for QueryStatistics {
    fn from(stats: JsonStatistics) -> Self {
        Self {
            elapsed: Duration::try_from_secs_f64(stats.elapsed).unwrap_or_default(),
            rows_read: stats.rows_read,
            bytes_read: stats.bytes_read,
        }
    }
}
