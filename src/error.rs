//! Error types for ch-glance.
//!
//! Defines the error enum surfaced by every statement and by connection setup.

use thiserror::Error;

/// Main error type for ch-glance operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The liveness probe failed while connecting (bad status or unreachable host).
    #[error("Connection error: {0}")]
    Connect(String),

    /// The server answered a statement with a non-200 status.
    #[error("HTTP error {status}:\n{body}")]
    Http { status: u16, body: String },

    /// The body claimed to be JSON but could not be turned into a table.
    #[error("Parse error: {excerpt}")]
    Parse { excerpt: String },

    /// The store does not support this kind of statement.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// `DESCRIBE TABLE` returned no columns.
    #[error("Could not find table '{name}'")]
    TableNotFound { name: String },

    /// Network failure while sending a statement.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The response kind does not fit the operation that requested it.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Longest body prefix kept in a parse error.
const EXCERPT_LEN: usize = 200;

impl ClientError {
    /// Creates a connection error with the given message.
    pub fn connect(msg: impl Into<String>) -> Self {
        Self::Connect(msg.into())
    }

    /// Creates an HTTP status error carrying the full response body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Creates a parse error from the offending body, keeping only a short excerpt.
    pub fn parse(body: &str) -> Self {
        let excerpt = match body.char_indices().nth(EXCERPT_LEN) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Parse { excerpt }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// Creates a table-not-found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an unexpected-response error with the given message.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connect(_) => "Connection Error",
            Self::Http { .. } => "HTTP Error",
            Self::Parse { .. } => "Parse Error",
            Self::UnsupportedOperation(_) => "Unsupported Operation",
            Self::TableNotFound { .. } => "Table Not Found",
            Self::Transport(_) => "Transport Error",
            Self::Config(_) => "Configuration Error",
            Self::UnexpectedResponse(_) => "Unexpected Response",
        }
    }
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;
