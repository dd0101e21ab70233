//! Promotional offer signing responses

use purchases_domain::constants::HTTP_REDIRECT;
use purchases_domain::{JsonObject, PurchasesError, Result, SignedOffer, UnexpectedResponseSubcode};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use super::{backend_error, describe};
use crate::ports::{HttpResponse, TransportResult};

/// Extract the first signed offer from an offer signing response.
pub fn handle_offer_signing(outcome: TransportResult) -> Result<SignedOffer> {
    let HttpResponse { status_code: status, body } = outcome.map_err(PurchasesError::network)?;

    if status >= HTTP_REDIRECT {
        return Err(backend_error(body.as_ref()).into());
    }

    let Some(json) = body.as_ref() else {
        debug!("Offer signing response was empty");
        return Err(PurchasesError::unexpected(UnexpectedResponseSubcode::PostOfferEmptyResponse));
    };

    let Some(offers) = json.get("offers").and_then(Value::as_array) else {
        let response = Value::Object(json.clone());
        debug!(response = %response, "Offer signing response had no offers array");
        return Err(PurchasesError::unexpected_with_context(
            UnexpectedResponseSubcode::PostOfferIdBadResponse,
            describe(status, Some(json)),
        ));
    };

    let Some(offer) = offers.first() else {
        debug!("Offer signing response had an empty offers array");
        return Err(PurchasesError::unexpected(
            UnexpectedResponseSubcode::PostOfferIdMissingOffersInResponse,
        ));
    };

    if let Some(signature_error) = offer.get("signature_error").and_then(Value::as_object) {
        return Err(backend_error(Some(signature_error)).into());
    }

    match offer.get("signature_data").and_then(Value::as_object) {
        Some(signature_data) => signed_offer(offer, signature_data).ok_or_else(|| {
            let signature_data = Value::Object(signature_data.clone());
            error!(signature_data = %signature_data, "Signature data was malformed");
            PurchasesError::unexpected_with_context(
                UnexpectedResponseSubcode::PostOfferIdSignature,
                describe(status, Some(json)),
            )
        }),
        None => {
            error!(offer = %offer, "Offer carried neither signature data nor a signature error");
            Err(PurchasesError::unexpected(UnexpectedResponseSubcode::PostOfferIdSignature))
        }
    }
}

fn signed_offer(offer: &Value, signature_data: &JsonObject) -> Option<SignedOffer> {
    Some(SignedOffer {
        signature: signature_data.get("signature")?.as_str()?.to_owned(),
        key_id: offer.get("key_id")?.as_str()?.to_owned(),
        nonce: Uuid::parse_str(signature_data.get("nonce")?.as_str()?).ok()?,
        timestamp: signature_data.get("timestamp")?.as_i64()?,
    })
}
