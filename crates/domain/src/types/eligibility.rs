//! Introductory-offer eligibility

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroEligibilityStatus {
    #[default]
    Unknown,
    Ineligible,
    Eligible,
}

impl_domain_status_conversions!(IntroEligibilityStatus {
    Unknown => "unknown",
    Ineligible => "ineligible",
    Eligible => "eligible",
});

impl IntroEligibilityStatus {
    /// Map one per-product value from the eligibility response. Only JSON
    /// booleans are meaningful; anything else is unknown.
    pub fn from_backend_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(true)) => Self::Eligible,
            Some(Value::Bool(false)) => Self::Ineligible,
            _ => Self::Unknown,
        }
    }
}

/// Product identifier to eligibility status.
pub type IntroEligibilityMap = BTreeMap<String, IntroEligibilityStatus>;

/// Every requested product marked [`IntroEligibilityStatus::Unknown`].
pub fn unknown_eligibilities<S: AsRef<str>>(product_ids: &[S]) -> IntroEligibilityMap {
    product_ids
        .iter()
        .map(|id| (id.as_ref().to_string(), IntroEligibilityStatus::Unknown))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn only_booleans_are_meaningful() {
        assert_eq!(
            IntroEligibilityStatus::from_backend_value(Some(&json!(true))),
            IntroEligibilityStatus::Eligible
        );
        assert_eq!(
            IntroEligibilityStatus::from_backend_value(Some(&json!(false))),
            IntroEligibilityStatus::Ineligible
        );
        assert_eq!(
            IntroEligibilityStatus::from_backend_value(Some(&json!(1))),
            IntroEligibilityStatus::Unknown
        );
        assert_eq!(
            IntroEligibilityStatus::from_backend_value(Some(&Value::Null)),
            IntroEligibilityStatus::Unknown
        );
        assert_eq!(IntroEligibilityStatus::from_backend_value(None), IntroEligibilityStatus::Unknown);
    }

    #[test]
    fn unknown_eligibilities_covers_every_product() {
        let map = unknown_eligibilities(&["a", "b"]);
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|status| *status == IntroEligibilityStatus::Unknown));
    }
}
