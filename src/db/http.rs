//! HTTP transport backed by reqwest.
//!
//! Owns the endpoint and its credentials. Construction performs a single
//! liveness probe (`GET /`) so a dead endpoint fails at connect time.

use super::{Endpoint, RawResponse, Transport};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::debug;

/// HTTP transport for a single ClickHouse endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Endpoint,
    client: Client,
}

impl HttpTransport {
    /// Builds the HTTP client and probes the endpoint.
    pub async fn connect(endpoint: Endpoint) -> Result<Self> {
        let transport = Self::new(endpoint)?;
        transport.ping().await?;
        Ok(transport)
    }

    /// Builds the HTTP client without probing the endpoint.
    fn new(endpoint: Endpoint) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some((username, password)) = endpoint.credentials() {
            let mut value = HeaderValue::from_str(&basic_auth_header(&username, &password))
                .map_err(|e| ClientError::config(format!("Invalid credentials: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(endpoint.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::connect(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { endpoint, client })
    }

    /// Returns the endpoint this transport talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Issues `GET /` and requires a 200 answer.
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/", self.endpoint.base_url());
        debug!("Probing {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::connect(format!(
                    "Liveness probe timed out after {:?}",
                    self.endpoint.timeout
                ))
            } else {
                ClientError::connect(format!("Failed to reach {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(ClientError::connect(format!(
                "Unexpected response status: {}",
                status.as_u16()
            )));
        }

        debug!("Endpoint {} is alive", self.endpoint.base_url());
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, query: &str, body: Option<String>) -> Result<RawResponse> {
        let url = format!("{}/?{}", self.endpoint.base_url(), query);

        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::transport(format!(
                    "Request timed out after {:?}",
                    self.endpoint.timeout
                ))
            } else if e.is_connect() {
                ClientError::transport(format!(
                    "Failed to connect to {}",
                    self.endpoint.base_url()
                ))
            } else {
                ClientError::transport(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(format!("Failed to read response: {}", e)))?;

        Ok(RawResponse { status, body })
    }

    fn database(&self) -> &str {
        &self.endpoint.database
    }

    fn debug(&self) -> bool {
        self.endpoint.debug
    }
}

/// Returns the `Authorization` header value for HTTP basic auth.
fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
