//! Domain types and models
//!
//! Typed backend payloads returned to callers and the request parameter
//! types the facade serializes into request bodies.

pub mod attributes;
pub mod customer_info;
pub mod eligibility;
pub mod offerings;
pub mod offers;
pub mod receipt;

/// JSON object as carried by request and response bodies.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use attributes::{
    attributes_to_backend_json, AttributionNetwork, SubscriberAttribute, SubscriberAttributeDict,
};
pub use customer_info::{CustomerInfo, EntitlementInfo, LogInResult, SubscriberInfo};
pub use eligibility::{unknown_eligibilities, IntroEligibilityMap, IntroEligibilityStatus};
pub use offerings::{Offering, Offerings, Package};
pub use offers::{OfferSigningRequest, SignedOffer};
pub use receipt::{
    fetch_token, IntroDurationType, PaymentMode, ProductInfo, PromotionalOffer, ReceiptPost,
};
