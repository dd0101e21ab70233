//! Error types used throughout the client
//!
//! Every backend call resolves to either a typed domain value or a
//! [`PurchasesError`]. All error types are `Clone + PartialEq` because a
//! single resolution is fanned out, value-equal, to every coalesced caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::impl_domain_status_conversions;
use crate::types::CustomerInfo;

/// Failure raised by the HTTP transport before any status code was observed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Local precondition failures. These never reach the network.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("app user id is missing or cannot be escaped")]
    MissingAppUserId,

    #[error("subscriber attributes are empty")]
    EmptySubscriberAttributes,
}

/// Distinguishes the ways a success-status response can still be unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnexpectedResponseSubcode {
    CustomerInfoResponseMalformed,
    CustomerInfoResponseParsing,
    LoginMissingResponse,
    LoginResponseDecoding,
    GetOfferUnexpectedResponse,
    PostOfferEmptyResponse,
    PostOfferIdBadResponse,
    PostOfferIdMissingOffersInResponse,
    PostOfferIdSignature,
}

impl_domain_status_conversions!(UnexpectedResponseSubcode {
    CustomerInfoResponseMalformed => "customer_info_response_malformed",
    CustomerInfoResponseParsing => "customer_info_response_parsing",
    LoginMissingResponse => "login_missing_response",
    LoginResponseDecoding => "login_response_decoding",
    GetOfferUnexpectedResponse => "get_offer_unexpected_response",
    PostOfferEmptyResponse => "post_offer_empty_response",
    PostOfferIdBadResponse => "post_offer_id_bad_response",
    PostOfferIdMissingOffersInResponse => "post_offer_id_missing_offers_in_response",
    PostOfferIdSignature => "post_offer_id_signature",
});

/// Structured error code from the backend envelope.
///
/// The backend sends an integer `code`; anything absent or non-numeric is
/// kept as unknown rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendErrorCode(Option<i64>);

impl BackendErrorCode {
    pub const UNKNOWN: Self = Self(None);

    pub fn new(code: i64) -> Self {
        Self(Some(code))
    }

    /// Read a code from a raw JSON value, accepting integers and numeric strings.
    pub fn from_value(value: Option<&Value>) -> Self {
        let code = match value {
            Some(Value::Number(number)) => number.as_i64(),
            Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        Self(code)
    }

    pub fn code(&self) -> Option<i64> {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{code}"),
            None => write!(f, "unknown"),
        }
    }
}

/// Partial-failure metadata attached to a backend error.
///
/// A single error can report both failure and partial success: a receipt post
/// whose subscriber attributes were rejected still carries the decoded
/// customer info here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendErrorContext {
    /// Whether the purchase may be finished despite the error (status < 500).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishable: Option<bool>,
    /// Whether subscriber attributes count as synced (not a 5xx, not a 404).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successfully_synced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_errors: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_info: Option<Box<CustomerInfo>>,
}

impl BackendErrorContext {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Error built from a non-success status plus the `code`/`message` envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendError {
    pub code: BackendErrorCode,
    pub message: Option<String>,
    #[serde(default)]
    pub context: BackendErrorContext,
}

impl BackendError {
    pub fn new(code: BackendErrorCode, message: Option<String>) -> Self {
        Self { code, message, context: BackendErrorContext::default() }
    }

    pub fn with_context(mut self, context: BackendErrorContext) -> Self {
        self.context = context;
        self
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "backend error {}: {}", self.code, message),
            None => write!(f, "backend error {}", self.code),
        }
    }
}

impl std::error::Error for BackendError {}

/// Main error type delivered to completion callbacks.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum PurchasesError {
    #[error("network error: {source}")]
    Network { source: TransportError },

    #[error("{0}")]
    Backend(BackendError),

    #[error("unexpected backend response ({subcode})")]
    UnexpectedResponse {
        subcode: UnexpectedResponseSubcode,
        /// Raw status/payload captured for diagnostics.
        context: Option<String>,
        /// Message of the decoder failure that caused this, if any.
        underlying: Option<String>,
    },

    #[error("validation failed: {0}")]
    Validation(ValidationError),
}

impl PurchasesError {
    pub fn network(source: TransportError) -> Self {
        Self::Network { source }
    }

    pub fn unexpected(subcode: UnexpectedResponseSubcode) -> Self {
        Self::UnexpectedResponse { subcode, context: None, underlying: None }
    }

    pub fn unexpected_with_context(
        subcode: UnexpectedResponseSubcode,
        context: impl Into<String>,
    ) -> Self {
        Self::UnexpectedResponse { subcode, context: Some(context.into()), underlying: None }
    }

    /// Attach the message of an underlying failure to an unexpected-response
    /// error. Other variants are returned unchanged.
    #[must_use]
    pub fn with_underlying(self, cause: impl fmt::Display) -> Self {
        match self {
            Self::UnexpectedResponse { subcode, context, .. } => {
                Self::UnexpectedResponse { subcode, context, underlying: Some(cause.to_string()) }
            }
            other => other,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Backend(_) => "backend",
            Self::UnexpectedResponse { .. } => "unexpected_response",
            Self::Validation(_) => "validation",
        }
    }

    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(error) => Some(error),
            _ => None,
        }
    }

    pub fn subcode(&self) -> Option<UnexpectedResponseSubcode> {
        match self {
            Self::UnexpectedResponse { subcode, .. } => Some(*subcode),
            _ => None,
        }
    }
}

impl From<BackendError> for PurchasesError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<ValidationError> for PurchasesError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TransportError> for PurchasesError {
    fn from(value: TransportError) -> Self {
        Self::network(value)
    }
}

/// Configuration loading and validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(String),

    #[error("invalid configuration value: {0}")]
    Invalid(String),

    #[error("failed to read configuration: {0}")]
    Io(String),

    #[error("invalid configuration format: {0}")]
    Format(String),
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, PurchasesError>;
