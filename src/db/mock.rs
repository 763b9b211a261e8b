//! Mock transport for testing.
//!
//! Replays queued responses and records every request it receives, so tests
//! can assert on what would have gone over the wire.

use super::{RawResponse, Transport};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Encoded query string, as it would follow `/?`.
    pub query: String,

    /// Request body, if any.
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Returns the decoded value of a query parameter.
    pub fn param(&self, key: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Returns the decoded SQL sent under `query`.
    pub fn sql(&self) -> Option<String> {
        self.param("query")
    }
}

enum Scripted {
    Response(RawResponse),
    Failure(String),
}

/// A transport that returns scripted responses.
///
/// When the script runs out it answers `200` with an empty body.
pub struct MockTransport {
    database: String,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Creates a mock for the given database with an empty script.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Scripted::Response(RawResponse::new(status, body)));
        self
    }

    /// Queues a network failure.
    pub fn fail(self, msg: impl Into<String>) -> Self {
        self.push(Scripted::Failure(msg.into()));
        self
    }

    /// Returns a copy of every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Returns how many requests were received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn push(&self, entry: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new("default")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, query: &str, body: Option<String>) -> Result<RawResponse> {
        self.requests
            .lock()
            .map_err(|_| ClientError::transport("mock request log poisoned"))?
            .push(RecordedRequest {
                query: query.to_string(),
                body,
            });

        let next = self
            .script
            .lock()
            .map_err(|_| ClientError::transport("mock script poisoned"))?
            .pop_front();

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(msg)) => Err(ClientError::transport(msg)),
            None => Ok(RawResponse::new(200, "")),
        }
    }

    fn database(&self) -> &str {
        &self.database
    }
}
