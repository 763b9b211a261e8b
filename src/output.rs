//! Command output rendering.
//!
//! Converts command results into plain text or JSON for stdout.

use crate::db::{ColumnDescriptor, TabularResult};
use serde_json::json;

/// Output from a CLI command.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// Informational message (success, status, etc.).
    Info(String),

    /// Verbatim text such as a `CREATE` statement or a schema dump.
    Text(String),

    /// Query result.
    Table(TabularResult),

    /// One item per line (table names).
    List(Vec<String>),

    /// Described columns.
    Columns(Vec<ColumnDescriptor>),
}

impl CommandOutput {
    /// Creates an info message.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    /// Renders as aligned plain text.
    pub fn to_text(&self) -> String {
        match self {
            Self::Info(msg) | Self::Text(msg) => msg.clone(),
            Self::Table(table) => {
                let headers: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
                let rows: Vec<Vec<String>> = table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|v| v.to_display_string()).collect())
                    .collect();
                let mut text = render_grid(&headers, &rows);
                text.push_str(&format!("\n({} rows)", table.len()));
                text
            }
            Self::List(items) => items.join("\n"),
            Self::Columns(columns) => {
                let headers = ["name", "type", "nullable", "default"].map(String::from);
                let rows: Vec<Vec<String>> = columns
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.data_type.clone(),
                            if c.is_nullable { "YES" } else { "NO" }.to_string(),
                            c.default.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                render_grid(&headers, &rows)
            }
        }
    }

    /// Renders as a JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Info(msg) => json!({ "message": msg }),
            Self::Text(text) => json!({ "text": text }),
            Self::Table(table) => {
                let columns: Vec<_> = table
                    .columns
                    .iter()
                    .map(|c| json!({ "name": c.name, "type": c.data_type }))
                    .collect();
                let rows: Vec<Vec<_>> = table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|v| v.to_json()).collect())
                    .collect();
                json!({ "columns": columns, "rows": rows })
            }
            Self::List(items) => json!(items),
            Self::Columns(columns) => columns
                .iter()
                .map(|c| {
                    json!({
                        "name": c.name,
                        "type": c.data_type,
                        "nullable": c.is_nullable,
                        "default": c.default,
                    })
                })
                .collect(),
        }
    }

    /// Renders in the requested style.
    pub fn render(&self, as_json: bool) -> String {
        if as_json {
            self.to_json().to_string()
        } else {
            self.to_text()
        }
    }
}

/// Lays out a header row and data rows in padded columns.
fn render_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    std::iter::once(format_row(headers))
        .chain(std::iter::once(separator))
        .chain(rows.iter().map(|row| format_row(row)))
        .collect::<Vec<_>>()
        .join("\n")
}
