//! Response handlers
//!
//! Each handler turns one transport outcome into a typed result. The shared
//! shape is: transport error → `Network`; error status → `Backend` built from
//! the `code`/`message` envelope; otherwise decode, and a success status whose
//! body cannot be used → `UnexpectedResponse` with an endpoint subcode.

pub mod customer_info;
pub mod intro_eligibility;
pub mod login;
pub mod offer_signing;
pub mod offerings;
pub mod post_request;

use purchases_domain::constants::{
    ATTRIBUTE_ERRORS_KEY, ATTRIBUTE_ERRORS_RESPONSE_KEY, ERROR_CODE_KEY, ERROR_MESSAGE_KEY,
    HTTP_INTERNAL_SERVER_ERROR, HTTP_NOT_FOUND,
};
use purchases_domain::{BackendError, BackendErrorCode, BackendErrorContext, JsonObject};
use serde_json::Value;

pub use customer_info::handle_customer_info;
pub use intro_eligibility::handle_intro_eligibility;
pub use login::handle_log_in;
pub use offer_signing::handle_offer_signing;
pub use offerings::handle_offerings;
pub use post_request::{handle_attributes_post, handle_post};

/// Build a backend error from the `code`/`message` envelope of `body`.
pub(crate) fn backend_error(body: Option<&JsonObject>) -> BackendError {
    let code = BackendErrorCode::from_value(body.and_then(|body| body.get(ERROR_CODE_KEY)));
    let message = body
        .and_then(|body| body.get(ERROR_MESSAGE_KEY))
        .and_then(Value::as_str)
        .map(str::to_owned);
    BackendError::new(code, message)
}

/// Attribute errors, read from the `attributes_error_response` container when
/// present and from the top level otherwise.
pub(crate) fn attribute_errors(body: Option<&JsonObject>) -> Option<Value> {
    let body = body?;
    match body.get(ATTRIBUTE_ERRORS_RESPONSE_KEY) {
        Some(container) => container.get(ATTRIBUTE_ERRORS_KEY).cloned(),
        None => body.get(ATTRIBUTE_ERRORS_KEY).cloned(),
    }
}

/// Subscriber-attribute sync metadata for a response.
pub(crate) fn attribute_sync_context(status: u16, body: Option<&JsonObject>) -> BackendErrorContext {
    let successfully_synced = !(status >= HTTP_INTERNAL_SERVER_ERROR || status == HTTP_NOT_FOUND);
    BackendErrorContext {
        successfully_synced: Some(successfully_synced),
        attribute_errors: attribute_errors(body),
        ..BackendErrorContext::default()
    }
}

/// Diagnostic context recorded on unexpected-response errors.
pub(crate) fn describe(status: u16, body: Option<&JsonObject>) -> String {
    match body {
        Some(body) => format!("status_code: {status}, json: {}", Value::Object(body.clone())),
        None => format!("status_code: {status}, json: none"),
    }
}
