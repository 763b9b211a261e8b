//! Statement formatting for the ClickHouse HTTP interface.
//!
//! Turns raw SQL plus an optional output format into the query string of a
//! `POST /?...` request. No SQL parsing happens here; every transform is a
//! textual one.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Output format requested from the server with a trailing `FORMAT` clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `JSON`: rows as objects keyed by column name.
    Json,
    /// `JSONCompact`: rows as positional arrays.
    #[default]
    JsonCompact,
    /// Any other format, passed through verbatim; the body is returned raw.
    Other(String),
}

impl OutputFormat {
    /// Returns the format token as sent to the server.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json => "JSON",
            Self::JsonCompact => "JSONCompact",
            Self::Other(token) => token,
        }
    }

    /// Returns true if responses in this format are parsed as JSON tables.
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact)
    }
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "JSON" => Self::Json,
            "JSONCompact" => Self::JsonCompact,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the store, built per call.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text without any `FORMAT` clause.
    pub sql: String,

    /// Requested output format; `None` sends the SQL unchanged.
    pub format: Option<OutputFormat>,

    /// Optional request body (bulk INSERT payloads).
    pub body: Option<String>,
}

impl Statement {
    /// Creates a read statement using the default `JSONCompact` format.
    pub fn query(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            format: Some(OutputFormat::JsonCompact),
            body: None,
        }
    }

    /// Creates a statement without a `FORMAT` clause; the body comes back raw.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            format: None,
            body: None,
        }
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the SQL with the format clause applied.
    pub fn formatted_sql(&self) -> String {
        format_statement(&self.sql, self.format.as_ref())
    }
}

/// Appends ` FORMAT <format>` to the SQL when a non-empty format is given.
pub fn format_statement(sql: &str, format: Option<&OutputFormat>) -> String {
    match format.map(OutputFormat::as_str) {
        Some(token) if !token.is_empty() => format!("{sql} FORMAT {token}"),
        _ => sql.to_string(),
    }
}

/// Builds the URL-encoded query string for a statement.
///
/// Keys are always written in the order `database`, `query`,
/// `output_format_write_statistics`.
pub fn encode_params(database: &str, sql: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("database", database)
        .append_pair("query", sql)
        .append_pair("output_format_write_statistics", "1")
        .finish()
}

fn insert_values_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(" (DEFAULT )?VALUES").expect("valid regex"))
}

/// Rewrites the first ` VALUES` / ` DEFAULT VALUES` token to ` VALUES`.
///
/// Known limitation: the match is textual, so a literal containing
/// ` DEFAULT VALUES` ahead of the real clause is rewritten instead.
pub fn normalize_insert(sql: &str) -> String {
    insert_values_pattern().replace(sql, " VALUES").into_owned()
}
