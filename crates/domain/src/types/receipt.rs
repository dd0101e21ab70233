//! Receipt posting parameters

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::attributes::{attributes_to_backend_json, SubscriberAttributeDict};
use super::JsonObject;

/// Encode raw receipt bytes as the `fetch_token` the backend expects.
pub fn fetch_token(receipt_data: &[u8]) -> String {
    STANDARD.encode(receipt_data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    PayAsYouGo,
    PayUpFront,
    FreeTrial,
}

impl PaymentMode {
    pub fn raw_value(self) -> u8 {
        match self {
            Self::PayAsYouGo => 0,
            Self::PayUpFront => 1,
            Self::FreeTrial => 2,
        }
    }
}

/// Which duration key the intro period is reported under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntroDurationType {
    #[default]
    None,
    FreeTrial,
    IntroPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionalOffer {
    pub offer_identifier: String,
    pub price: f64,
    pub payment_mode: PaymentMode,
}

impl PromotionalOffer {
    fn to_backend_json(&self) -> Value {
        json!({
            "offer_identifier": self.offer_identifier,
            "price": self.price,
            "payment_mode": self.payment_mode.raw_value(),
        })
    }
}

/// Store product details sent alongside a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: String,
    pub price: f64,
    pub currency: Option<String>,
    pub payment_mode: Option<PaymentMode>,
    pub intro_price: Option<f64>,
    /// ISO 8601 period, e.g. `P1M`.
    pub normal_duration: Option<String>,
    pub intro_duration: Option<String>,
    #[serde(default)]
    pub intro_duration_type: IntroDurationType,
    pub subscription_group_id: Option<String>,
    #[serde(default)]
    pub offers: Vec<PromotionalOffer>,
}

impl ProductInfo {
    pub fn new(product_id: impl Into<String>, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            price,
            currency: None,
            payment_mode: None,
            intro_price: None,
            normal_duration: None,
            intro_duration: None,
            intro_duration_type: IntroDurationType::None,
            subscription_group_id: None,
            offers: Vec::new(),
        }
    }

    /// Fields merged into the receipt body. Absent optionals are omitted.
    pub fn to_backend_json(&self) -> JsonObject {
        let mut body = JsonObject::new();
        body.insert("product_id".into(), json!(self.product_id));
        body.insert("price".into(), json!(self.price));
        if let Some(currency) = &self.currency {
            body.insert("currency".into(), json!(currency));
        }
        if let Some(mode) = self.payment_mode {
            body.insert("payment_mode".into(), json!(mode.raw_value()));
        }
        if let Some(intro_price) = self.intro_price {
            body.insert("introductory_price".into(), json!(intro_price));
        }
        if let Some(duration) = &self.normal_duration {
            body.insert("normal_duration".into(), json!(duration));
        }
        if let Some(duration) = &self.intro_duration {
            match self.intro_duration_type {
                IntroDurationType::FreeTrial => {
                    body.insert("trial_duration".into(), json!(duration));
                }
                IntroDurationType::IntroPrice => {
                    body.insert("intro_duration".into(), json!(duration));
                }
                IntroDurationType::None => {}
            }
        }
        if let Some(group) = &self.subscription_group_id {
            body.insert("subscription_group_id".into(), json!(group));
        }
        if !self.offers.is_empty() {
            let offers: Vec<Value> = self.offers.iter().map(PromotionalOffer::to_backend_json).collect();
            body.insert("offers".into(), Value::Array(offers));
        }
        body
    }

    /// Stable textual identity used when building receipt cache keys.
    ///
    /// This is the serialized backend JSON, so two products share a key
    /// exactly when they marshal to the same body fields.
    pub fn cache_key(&self) -> String {
        Value::Object(self.to_backend_json()).to_string()
    }
}

/// Parameters for `POST /receipts`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptPost {
    pub receipt_data: Vec<u8>,
    pub app_user_id: String,
    pub is_restore: bool,
    pub product_info: Option<ProductInfo>,
    pub presented_offering_identifier: Option<String>,
    pub observer_mode: bool,
    pub subscriber_attributes: Option<SubscriberAttributeDict>,
}

impl ReceiptPost {
    pub fn new(receipt_data: impl Into<Vec<u8>>, app_user_id: impl Into<String>) -> Self {
        Self {
            receipt_data: receipt_data.into(),
            app_user_id: app_user_id.into(),
            is_restore: false,
            product_info: None,
            presented_offering_identifier: None,
            observer_mode: false,
            subscriber_attributes: None,
        }
    }

    #[must_use]
    pub fn restore(mut self, is_restore: bool) -> Self {
        self.is_restore = is_restore;
        self
    }

    #[must_use]
    pub fn product_info(mut self, product_info: ProductInfo) -> Self {
        self.product_info = Some(product_info);
        self
    }

    #[must_use]
    pub fn presented_offering(mut self, identifier: impl Into<String>) -> Self {
        self.presented_offering_identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn observer_mode(mut self, observer_mode: bool) -> Self {
        self.observer_mode = observer_mode;
        self
    }

    #[must_use]
    pub fn subscriber_attributes(mut self, attributes: SubscriberAttributeDict) -> Self {
        self.subscriber_attributes = Some(attributes);
        self
    }

    pub fn fetch_token(&self) -> String {
        fetch_token(&self.receipt_data)
    }

    pub fn to_body(&self) -> JsonObject {
        let mut body = JsonObject::new();
        body.insert("fetch_token".into(), json!(self.fetch_token()));
        body.insert("app_user_id".into(), json!(self.app_user_id));
        body.insert("is_restore".into(), json!(self.is_restore));
        body.insert("observer_mode".into(), json!(self.observer_mode));

        if let Some(product_info) = &self.product_info {
            body.extend(product_info.to_backend_json());
        }
        if let Some(attributes) = &self.subscriber_attributes {
            body.insert("attributes".into(), Value::Object(attributes_to_backend_json(attributes)));
        }
        if let Some(offering) = &self.presented_offering_identifier {
            body.insert("presented_offering_identifier".into(), json!(offering));
        }
        body
    }
}
