//! Subscriber endpoints: customer info, receipts, identity and attributes

use purchases_domain::constants::{IDENTIFY_PATH, RECEIPTS_PATH};
use purchases_domain::{
    attributes_to_backend_json, CustomerInfo, JsonObject, LogInResult, PurchasesError,
    ReceiptPost, SubscriberAttributeDict, ValidationError,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{escaped_app_user_id, Backend};
use crate::cache_key::CacheKey;
use crate::handlers::{handle_attributes_post, handle_customer_info, handle_log_in, handle_post};
use crate::operation::Request;

impl Backend {
    /// Fetch the subscriber's current customer info. Concurrent calls for the
    /// same user share one request.
    pub fn get_customer_info<F>(&self, app_user_id: &str, completion: F)
    where
        F: FnOnce(Result<CustomerInfo, PurchasesError>) + Send + 'static,
    {
        let app_user_id = match escaped_app_user_id(app_user_id) {
            Ok(id) => id,
            Err(error) => return completion(Err(error)),
        };

        let key = CacheKey::customer_info(&app_user_id);
        self.coalesced(
            "get_customer_info",
            &self.customer_info_callbacks,
            key,
            || Request::Get { path: format!("/subscribers/{app_user_id}") },
            Box::new(handle_customer_info),
            Box::new(completion),
        );
    }

    /// Post a receipt and receive the updated customer info. Posts with
    /// identical parameters share one request.
    pub fn post_receipt_data<F>(&self, post: ReceiptPost, completion: F)
    where
        F: FnOnce(Result<CustomerInfo, PurchasesError>) + Send + 'static,
    {
        let key = CacheKey::receipt(&post);
        debug!(
            app_user_id = %post.app_user_id,
            is_restore = post.is_restore,
            observer_mode = post.observer_mode,
            "Posting receipt"
        );
        self.coalesced(
            "post_receipt_data",
            &self.customer_info_callbacks,
            key,
            || Request::Post { path: RECEIPTS_PATH.to_string(), body: post.to_body() },
            Box::new(handle_customer_info),
            Box::new(completion),
        );
    }

    /// Switch from `current_app_user_id` to `new_app_user_id`.
    pub fn log_in<F>(&self, current_app_user_id: &str, new_app_user_id: &str, completion: F)
    where
        F: FnOnce(Result<LogInResult, PurchasesError>) + Send + 'static,
    {
        if current_app_user_id.trim().is_empty() || new_app_user_id.trim().is_empty() {
            return completion(Err(ValidationError::MissingAppUserId.into()));
        }

        let key = CacheKey::log_in(current_app_user_id, new_app_user_id);
        let body = object(json!({
            "app_user_id": current_app_user_id,
            "new_app_user_id": new_app_user_id,
        }));
        info!(new_app_user_id, "Logging in");
        self.coalesced(
            "log_in",
            &self.log_in_callbacks,
            key,
            || Request::Post { path: IDENTIFY_PATH.to_string(), body },
            Box::new(handle_log_in),
            Box::new(completion),
        );
    }

    /// Alias `new_app_user_id` to `app_user_id`.
    pub fn create_alias<F>(&self, app_user_id: &str, new_app_user_id: &str, completion: F)
    where
        F: FnOnce(Result<(), PurchasesError>) + Send + 'static,
    {
        let app_user_id = match escaped_app_user_id(app_user_id) {
            Ok(id) => id,
            Err(error) => return completion(Err(error)),
        };

        let key = CacheKey::create_alias(&app_user_id, new_app_user_id);
        let body = object(json!({ "new_app_user_id": new_app_user_id }));
        info!(app_user_id = %app_user_id, new_app_user_id, "Creating alias");
        self.coalesced(
            "create_alias",
            &self.alias_callbacks,
            key,
            || Request::Post { path: format!("/subscribers/{app_user_id}/alias"), body },
            Box::new(handle_post),
            Box::new(completion),
        );
    }

    /// Sync subscriber attributes. An empty set is rejected without a request.
    pub fn post_subscriber_attributes<F>(
        &self,
        attributes: &SubscriberAttributeDict,
        app_user_id: &str,
        completion: F,
    ) where
        F: FnOnce(Result<(), PurchasesError>) + Send + 'static,
    {
        if attributes.is_empty() {
            warn!("Refusing to post an empty set of subscriber attributes");
            return completion(Err(ValidationError::EmptySubscriberAttributes.into()));
        }
        let app_user_id = match escaped_app_user_id(app_user_id) {
            Ok(id) => id,
            Err(error) => return completion(Err(error)),
        };

        let mut body = JsonObject::new();
        body.insert("attributes".into(), Value::Object(attributes_to_backend_json(attributes)));
        self.direct(
            "post_subscriber_attributes",
            Request::Post { path: format!("/subscribers/{app_user_id}/attributes"), body },
            Box::new(handle_attributes_post),
            Box::new(completion),
        );
    }
}

pub(super) fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
