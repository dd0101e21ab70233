//! Promotional offer signing

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::receipt::fetch_token;

/// Signature material produced by the backend for a promotional offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOffer {
    pub signature: String,
    pub key_id: String,
    pub nonce: Uuid,
    pub timestamp: i64,
}

/// Parameters for `POST /offers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSigningRequest {
    pub offer_id: String,
    pub product_id: String,
    pub subscription_group: String,
    pub receipt_data: Vec<u8>,
    pub app_user_id: String,
}

impl OfferSigningRequest {
    pub fn to_body(&self) -> Value {
        json!({
            "app_user_id": self.app_user_id,
            "fetch_token": fetch_token(&self.receipt_data),
            "generate_offers": [{
                "offer_id": self.offer_id,
                "product_id": self.product_id,
                "subscription_group": self.subscription_group,
            }],
        })
    }
}
