//! Offerings payload

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonObject;

/// Offerings configured for a subscriber, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offerings {
    #[serde(default)]
    pub current_offering_id: Option<String>,
    pub offerings: Vec<Offering>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub identifier: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub identifier: String,
    pub platform_product_identifier: String,
}

impl Offerings {
    pub fn from_json(body: &JsonObject) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(body.clone()))
    }

    pub fn current(&self) -> Option<&Offering> {
        let current = self.current_offering_id.as_deref()?;
        self.offerings.iter().find(|offering| offering.identifier == current)
    }
}
