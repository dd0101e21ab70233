//! Offerings, eligibility, offer signing and attribution endpoints

use purchases_domain::constants::OFFERS_PATH;
use purchases_domain::{
    fetch_token, unknown_eligibilities, AttributionNetwork, IntroEligibilityMap, JsonObject,
    OfferSigningRequest, Offerings, PurchasesError, SignedOffer,
};
use serde_json::{json, Value};
use tracing::debug;

use super::subscribers::object;
use super::{escaped_app_user_id, Backend};
use crate::cache_key::CacheKey;
use crate::handlers::{handle_intro_eligibility, handle_offer_signing, handle_offerings, handle_post};
use crate::operation::Request;

impl Backend {
    /// Fetch the offerings configured for a subscriber. Concurrent calls for
    /// the same user share one request.
    pub fn get_offerings<F>(&self, app_user_id: &str, completion: F)
    where
        F: FnOnce(Result<Offerings, PurchasesError>) + Send + 'static,
    {
        let app_user_id = match escaped_app_user_id(app_user_id) {
            Ok(id) => id,
            Err(error) => return completion(Err(error)),
        };

        let key = CacheKey::offerings(&app_user_id);
        self.coalesced(
            "get_offerings",
            &self.offerings_callbacks,
            key,
            || Request::Get { path: format!("/subscribers/{app_user_id}/offerings") },
            Box::new(handle_offerings),
            Box::new(completion),
        );
    }

    /// Check introductory-offer eligibility for `product_ids`.
    ///
    /// No request is made when there are no products (empty map) or no
    /// receipt (every product unknown).
    pub fn get_intro_eligibility<F>(
        &self,
        app_user_id: &str,
        receipt_data: &[u8],
        product_ids: Vec<String>,
        completion: F,
    ) where
        F: FnOnce(Result<IntroEligibilityMap, PurchasesError>) + Send + 'static,
    {
        if product_ids.is_empty() {
            return completion(Ok(IntroEligibilityMap::new()));
        }
        if receipt_data.is_empty() {
            debug!(products = product_ids.len(), "No receipt; eligibility is unknown");
            return completion(Ok(unknown_eligibilities(&product_ids)));
        }
        let app_user_id = match escaped_app_user_id(app_user_id) {
            Ok(id) => id,
            Err(error) => return completion(Err(error)),
        };

        let body = object(json!({
            "product_identifiers": product_ids,
            "fetch_token": fetch_token(receipt_data),
        }));
        self.direct(
            "get_intro_eligibility",
            Request::Post { path: format!("/subscribers/{app_user_id}/intro_eligibility"), body },
            Box::new(move |outcome| handle_intro_eligibility(outcome, &product_ids)),
            Box::new(completion),
        );
    }

    /// Ask the backend to sign a promotional offer.
    pub fn post_offer_for_signing<F>(&self, request: &OfferSigningRequest, completion: F)
    where
        F: FnOnce(Result<SignedOffer, PurchasesError>) + Send + 'static,
    {
        self.direct(
            "post_offer_for_signing",
            Request::Post { path: OFFERS_PATH.to_string(), body: object(request.to_body()) },
            Box::new(handle_offer_signing),
            Box::new(completion),
        );
    }

    /// Forward attribution data collected by a third-party network.
    pub fn post_attribution_data<F>(
        &self,
        data: JsonObject,
        network: AttributionNetwork,
        app_user_id: &str,
        completion: F,
    ) where
        F: FnOnce(Result<(), PurchasesError>) + Send + 'static,
    {
        let app_user_id = match escaped_app_user_id(app_user_id) {
            Ok(id) => id,
            Err(error) => return completion(Err(error)),
        };

        let mut body = JsonObject::new();
        body.insert("network".into(), json!(network.raw_value()));
        body.insert("data".into(), Value::Object(data));
        self.direct(
            "post_attribution_data",
            Request::Post { path: format!("/subscribers/{app_user_id}/attribution"), body },
            Box::new(handle_post),
            Box::new(completion),
        );
    }
}
