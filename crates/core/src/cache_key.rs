//! Coalescing keys
//!
//! A key names one logical request. Two calls share an in-flight network
//! request exactly when their keys are equal, so every parameter that changes
//! the request must feed into the key.

use std::fmt;

use purchases_domain::ReceiptPost;

const SEPARATOR: char = '|';

/// Endpoint-namespaced identity of a logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    fn build<'a>(endpoint: &str, parts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut key = String::from(endpoint);
        for part in parts {
            key.push(SEPARATOR);
            escape_into(&mut key, part);
        }
        Self(key)
    }

    /// `GET /subscribers/{id}` and the receipt posts sharing its cache.
    pub fn customer_info(app_user_id: &str) -> Self {
        Self::build("customer_info", [app_user_id])
    }

    /// `GET /subscribers/{id}/offerings`.
    pub fn offerings(app_user_id: &str) -> Self {
        Self::build("offerings", [app_user_id])
    }

    /// `POST /subscribers/identify` from one user to another.
    pub fn log_in(current_app_user_id: &str, new_app_user_id: &str) -> Self {
        Self::build("log_in", [current_app_user_id, new_app_user_id])
    }

    /// `POST /subscribers/{id}/alias`.
    pub fn create_alias(app_user_id: &str, new_app_user_id: &str) -> Self {
        Self::build("create_alias", [app_user_id, new_app_user_id])
    }

    /// Key over every parameter of a receipt post. Absent optionals and
    /// present-but-empty values are kept distinct.
    pub fn receipt(post: &ReceiptPost) -> Self {
        let product = post
            .product_info
            .as_ref()
            .map_or_else(|| "-".to_string(), |info| format!("+{}", info.cache_key()));
        let offering = post
            .presented_offering_identifier
            .as_ref()
            .map_or_else(|| "-".to_string(), |id| format!("+{id}"));
        let attributes = post.subscriber_attributes.as_ref().map_or_else(
            || "-".to_string(),
            |attributes| format!("+{}", serde_json::to_string(attributes).unwrap_or_default()),
        );

        Self::build(
            "receipt",
            [
                post.app_user_id.as_str(),
                bool_part(post.is_restore),
                post.fetch_token().as_str(),
                product.as_str(),
                offering.as_str(),
                bool_part(post.observer_mode),
                attributes.as_str(),
            ],
        )
    }

    /// The escaped key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn bool_part(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn escape_into(key: &mut String, part: &str) {
    for ch in part.chars() {
        if ch == '\\' || ch == SEPARATOR {
            key.push('\\');
        }
        key.push(ch);
    }
}
