//! Port interfaces for the HTTP transport

use std::collections::BTreeMap;

use async_trait::async_trait;
use purchases_domain::{JsonObject, TransportError};

/// Request headers, ordered for stable logging.
pub type Headers = BTreeMap<String, String>;

/// Raw transport outcome: a status code plus the decoded JSON object, if the
/// body was one.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status as returned by the server.
    pub status_code: u16,
    /// `None` when the body was empty or not a JSON object.
    pub body: Option<JsonObject>,
}

impl HttpResponse {
    /// Response carrying an optional decoded body.
    pub fn new(status_code: u16, body: Option<JsonObject>) -> Self {
        Self { status_code, body }
    }

    /// Response with no body.
    pub fn empty(status_code: u16) -> Self {
        Self { status_code, body: None }
    }
}

/// Outcome of one transport call.
pub type TransportResult = Result<HttpResponse, TransportError>;

/// Trait for performing authenticated calls against the backend.
///
/// Paths are relative to the configured base URL and already escaped.
/// Implementations own retries and timeouts; callers issue each logical
/// request exactly once.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, path: &str, headers: &Headers) -> TransportResult;

    async fn post(&self, path: &str, headers: &Headers, body: &JsonObject) -> TransportResult;

    /// Drop any response caches the transport keeps.
    fn clear_caches(&self) {}
}
