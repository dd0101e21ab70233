//! Offerings responses

use purchases_domain::constants::HTTP_REDIRECT;
use purchases_domain::{Offerings, PurchasesError, Result, UnexpectedResponseSubcode};
use tracing::error;

use super::{backend_error, describe};
use crate::ports::{HttpResponse, TransportResult};

/// Decode the offerings configured for a subscriber.
pub fn handle_offerings(outcome: TransportResult) -> Result<Offerings> {
    let HttpResponse { status_code: status, body } = outcome.map_err(PurchasesError::network)?;
    let unexpected = || {
        PurchasesError::unexpected_with_context(
            UnexpectedResponseSubcode::GetOfferUnexpectedResponse,
            describe(status, body.as_ref()),
        )
    };

    let Some(json) = body.as_ref() else {
        error!(status, "Offerings response had no body");
        return Err(unexpected());
    };

    if status >= HTTP_REDIRECT {
        return Err(backend_error(Some(json)).into());
    }

    Offerings::from_json(json).map_err(|decode_error| {
        error!(status, error = %decode_error, "Offerings response could not be decoded");
        unexpected().with_underlying(decode_error)
    })
}
