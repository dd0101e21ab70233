//! Subscriber attributes and attribution networks

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::JsonObject;

/// One key/value attribute set on a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberAttribute {
    pub key: String,
    /// `None` deletes the attribute on the backend.
    pub value: Option<String>,
    pub set_time: DateTime<Utc>,
    #[serde(default)]
    pub is_synced: bool,
}

impl SubscriberAttribute {
    pub fn new(key: impl Into<String>, value: Option<String>, set_time: DateTime<Utc>) -> Self {
        Self { key: key.into(), value, set_time, is_synced: false }
    }

    /// Wire form: `{"value": ..., "updated_at_ms": ...}`.
    pub fn to_backend_json(&self) -> Value {
        json!({
            "value": self.value,
            "updated_at_ms": self.set_time.timestamp_millis(),
        })
    }
}

/// Attributes keyed by attribute name. Ordered, so serialized forms are
/// deterministic.
pub type SubscriberAttributeDict = BTreeMap<String, SubscriberAttribute>;

/// Marshal an attribute set into the object placed under `"attributes"`.
pub fn attributes_to_backend_json(attributes: &SubscriberAttributeDict) -> JsonObject {
    attributes.iter().map(|(key, attribute)| (key.clone(), attribute.to_backend_json())).collect()
}

/// Third-party attribution providers. The numeric value is what the backend
/// expects in the `network` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionNetwork {
    AppleSearchAds,
    Adjust,
    AppsFlyer,
    Branch,
    Tenjin,
    Facebook,
    MParticle,
}

impl AttributionNetwork {
    pub fn raw_value(self) -> u8 {
        match self {
            Self::AppleSearchAds => 0,
            Self::Adjust => 1,
            Self::AppsFlyer => 2,
            Self::Branch => 3,
            Self::Tenjin => 4,
            Self::Facebook => 5,
            Self::MParticle => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn attributes_marshal_with_millisecond_timestamps() {
        let set_time = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let mut attributes = SubscriberAttributeDict::new();
        attributes.insert(
            "$email".into(),
            SubscriberAttribute::new("$email", Some("a@b.c".into()), set_time),
        );
        attributes.insert("nickname".into(), SubscriberAttribute::new("nickname", None, set_time));

        let marshalled = attributes_to_backend_json(&attributes);

        assert_eq!(
            Value::Object(marshalled),
            json!({
                "$email": {"value": "a@b.c", "updated_at_ms": 1_700_000_000_123_i64},
                "nickname": {"value": null, "updated_at_ms": 1_700_000_000_123_i64}
            })
        );
    }

    #[test]
    fn attribution_networks_have_stable_raw_values() {
        assert_eq!(AttributionNetwork::AppleSearchAds.raw_value(), 0);
        assert_eq!(AttributionNetwork::Branch.raw_value(), 3);
        assert_eq!(AttributionNetwork::MParticle.raw_value(), 6);
    }
}
