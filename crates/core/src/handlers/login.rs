//! Login (identify) responses

use purchases_domain::constants::{HTTP_CREATED, HTTP_REDIRECT};
use purchases_domain::{
    CustomerInfo, LogInResult, PurchasesError, Result, UnexpectedResponseSubcode,
};
use tracing::error;

use super::{backend_error, describe};
use crate::ports::{HttpResponse, TransportResult};

/// Classify an identify response. `created` is true only for `201 Created`.
pub fn handle_log_in(outcome: TransportResult) -> Result<LogInResult> {
    let HttpResponse { status_code: status, body } = outcome.map_err(PurchasesError::network)?;

    let Some(json) = body.as_ref() else {
        return Err(PurchasesError::unexpected(UnexpectedResponseSubcode::LoginMissingResponse));
    };

    if status >= HTTP_REDIRECT {
        return Err(backend_error(Some(json)).into());
    }

    match CustomerInfo::from_json(json) {
        Ok(customer_info) => Ok(LogInResult { customer_info, created: status == HTTP_CREATED }),
        Err(decode_error) => {
            error!(status, error = %decode_error, "Login response could not be decoded");
            Err(PurchasesError::unexpected_with_context(
                UnexpectedResponseSubcode::LoginResponseDecoding,
                describe(status, Some(json)),
            )
            .with_underlying(decode_error))
        }
    }
}
