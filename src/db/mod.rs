//! ClickHouse HTTP access layer for ch-glance.
//!
//! Provides a trait-based transport so the statement pipeline can run
//! against a real server or a recording mock interchangeably.

mod client;
mod http;
mod mock;
mod response;
mod schema;
mod statement;
mod types;

pub use client::ClickhouseClient;
pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};
pub use response::{interpret, parse_json_table};
pub use schema::{type_limit, ColumnDescriptor, NativeType, TableDescriptor};
pub use statement::{encode_params, format_statement, normalize_insert, OutputFormat, Statement};
pub use types::{ColumnInfo, QueryStatistics, Response, Row, TabularResult, Value};

use crate::config::EndpointConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A validated ClickHouse endpoint.
///
/// Built from [`EndpointConfig::to_endpoint`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request timeout, including the liveness probe.
    pub timeout: Duration,
    /// Log statements at info level.
    pub debug: bool,
}

impl Endpoint {
    /// Returns `scheme://host:port`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Returns the basic auth pair, if any credential is set.
    ///
    /// The user defaults to `default` when only a password is configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty());
        let password = self.password.as_deref().filter(|p| !p.is_empty());

        if username.is_none() && password.is_none() {
            return None;
        }

        Some((
            username.unwrap_or("default").to_string(),
            password.unwrap_or_default().to_string(),
        ))
    }
}

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Trait for sending encoded statements to a ClickHouse server.
///
/// Implementations must be thread-safe (Send + Sync) so a client can be shared
/// across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `POST /?<query>` with an optional body and returns the raw response.
    ///
    /// Only network failures are errors here; status handling belongs to
    /// [`interpret`].
    async fn send(&self, query: &str, body: Option<String>) -> Result<RawResponse>;

    /// Target database used for every statement.
    fn database(&self) -> &str;

    /// Log statements at info level.
    fn debug(&self) -> bool {
        false
    }
}

/// Connects to the configured endpoint over HTTP.
///
/// This is the central factory function: it validates the config, builds the
/// transport and runs the liveness probe.
pub async fn connect(config: &EndpointConfig) -> Result<ClickhouseClient<HttpTransport>> {
    let endpoint = config.to_endpoint()?;
    let transport = HttpTransport::connect(endpoint).await?;
    Ok(ClickhouseClient::new(transport))
}
