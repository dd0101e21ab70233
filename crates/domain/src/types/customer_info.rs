//! Subscriber snapshot returned by the customer-info, receipt and login calls

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonObject;

/// Current entitlement and purchase state of one subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub request_date: Option<DateTime<Utc>>,
    pub subscriber: SubscriberInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberInfo {
    pub original_app_user_id: String,
    pub first_seen: DateTime<Utc>,
    #[serde(default)]
    pub original_application_version: Option<String>,
    #[serde(default)]
    pub original_purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub management_url: Option<String>,
    #[serde(default)]
    pub entitlements: BTreeMap<String, EntitlementInfo>,
    /// Per-product subscription records, kept raw.
    #[serde(default)]
    pub subscriptions: BTreeMap<String, Value>,
    #[serde(default)]
    pub non_subscriptions: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementInfo {
    pub product_identifier: String,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_date: Option<DateTime<Utc>>,
}

impl CustomerInfo {
    /// Decode a snapshot from a response body.
    pub fn from_json(body: &JsonObject) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(body.clone()))
    }

    pub fn original_app_user_id(&self) -> &str {
        &self.subscriber.original_app_user_id
    }

    /// Entitlements whose expiry lies after `now`. Lifetime entitlements
    /// (no expiry) are always active.
    pub fn active_entitlements(&self, now: DateTime<Utc>) -> Vec<&str> {
        self.subscriber
            .entitlements
            .iter()
            .filter(|(_, info)| info.expires_date.map_or(true, |expires| expires > now))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Outcome of logging in as a different app user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResult {
    pub customer_info: CustomerInfo,
    /// True when the backend created a new subscriber (HTTP 201).
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn decodes_minimal_subscriber() {
        let info = CustomerInfo::from_json(&body(json!({
            "request_date": "2024-03-01T10:00:00Z",
            "subscriber": {
                "original_app_user_id": "u1",
                "first_seen": "2024-01-01T00:00:00Z"
            }
        })))
        .unwrap();

        assert_eq!(info.original_app_user_id(), "u1");
        assert!(info.subscriber.entitlements.is_empty());
        assert_eq!(info.request_date, Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()));
    }

    #[test]
    fn missing_subscriber_fails_to_decode() {
        let result = CustomerInfo::from_json(&body(json!({"request_date": "2024-03-01T10:00:00Z"})));
        assert!(result.unwrap_err().to_string().contains("subscriber"));
    }

    #[test]
    fn active_entitlements_respects_expiry() {
        let info = CustomerInfo::from_json(&body(json!({
            "subscriber": {
                "original_app_user_id": "u1",
                "first_seen": "2024-01-01T00:00:00Z",
                "entitlements": {
                    "pro": {"product_identifier": "monthly", "expires_date": "2030-01-01T00:00:00Z"},
                    "old": {"product_identifier": "weekly", "expires_date": "2020-01-01T00:00:00Z"},
                    "forever": {"product_identifier": "lifetime"}
                }
            }
        })))
        .unwrap();

        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(info.active_entitlements(now), vec!["forever", "pro"]);
    }
}
