//! Backend facade
//!
//! Public surface for every backend call. Each method validates its inputs,
//! registers the caller with the right coalescing cache when the endpoint is
//! coalesced, and submits at most one operation per logical request to the
//! serial queue. Results arrive through the completion callback, on the
//! queue's worker task.

mod offerings;
mod subscribers;

use std::sync::Arc;

use purchases_domain::{
    CustomerInfo, LogInResult, Offerings, PurchasesError, TransportError, ValidationError,
};
use tracing::{debug, info};

use crate::cache_key::CacheKey;
use crate::coalescer::{CacheStatus, CallbackCache, CoalescerStats, Completion};
use crate::operation::{CompletionTarget, Handler, NetworkOperation, Request};
use crate::ports::{Headers, HttpTransport};
use crate::queue::{Operation, OperationQueue, QueueError};

/// Coalescing statistics for each coalesced endpoint family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalescingStats {
    /// Subscriber fetches and receipt posts, which share one cache.
    pub customer_info: CoalescerStats,
    pub offerings: CoalescerStats,
    pub log_in: CoalescerStats,
    pub create_alias: CoalescerStats,
}

/// Client for the subscription backend.
pub struct Backend {
    transport: Arc<dyn HttpTransport>,
    headers: Arc<Headers>,
    queue: OperationQueue,
    customer_info_callbacks: Arc<CallbackCache<CustomerInfo>>,
    offerings_callbacks: Arc<CallbackCache<Offerings>>,
    log_in_callbacks: Arc<CallbackCache<LogInResult>>,
    alias_callbacks: Arc<CallbackCache<()>>,
}

impl Backend {
    /// Create a backend whose queue runs on the current tokio runtime.
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: &str) -> Result<Self, QueueError> {
        Ok(Self::with_queue(transport, api_key, OperationQueue::start()?))
    }

    /// Create a backend that dispatches through an existing queue.
    pub fn with_queue(
        transport: Arc<dyn HttpTransport>,
        api_key: &str,
        queue: OperationQueue,
    ) -> Self {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), format!("Bearer {api_key}"));
        info!("Backend client initialised");

        Self {
            transport,
            headers: Arc::new(headers),
            queue,
            customer_info_callbacks: Arc::new(CallbackCache::new("customer_info")),
            offerings_callbacks: Arc::new(CallbackCache::new("offerings")),
            log_in_callbacks: Arc::new(CallbackCache::new("log_in")),
            alias_callbacks: Arc::new(CallbackCache::new("create_alias")),
        }
    }

    /// Drop any response caches held by the transport.
    pub fn clear_caches(&self) {
        debug!("Clearing transport caches");
        self.transport.clear_caches();
    }

    /// Snapshot of the coalescing counters for every coalesced endpoint.
    pub fn coalescing_stats(&self) -> CoalescingStats {
        CoalescingStats {
            customer_info: self.customer_info_callbacks.stats(),
            offerings: self.offerings_callbacks.stats(),
            log_in: self.log_in_callbacks.stats(),
            create_alias: self.alias_callbacks.stats(),
        }
    }

    /// Finish every queued request and stop the worker. Requests made
    /// afterwards fail with a network error.
    pub async fn shutdown(&self) -> Result<(), QueueError> {
        self.queue.shutdown().await
    }

    /// Register `completion` under `key` and dispatch the request only when no
    /// identical request is already in flight.
    fn coalesced<T>(
        &self,
        name: &'static str,
        cache: &Arc<CallbackCache<T>>,
        key: CacheKey,
        request: impl FnOnce() -> Request,
        handler: Handler<T>,
        completion: Completion<T>,
    ) where
        T: Clone + Send + 'static,
    {
        if cache.add(&key, completion) == CacheStatus::AddedToExisting {
            return;
        }

        let target = CompletionTarget::Coalesced { cache: Arc::clone(cache), key };
        self.dispatch(Box::new(self.operation(name, request(), handler, target)));
    }

    fn direct<T>(
        &self,
        name: &'static str,
        request: Request,
        handler: Handler<T>,
        completion: Completion<T>,
    ) where
        T: Clone + Send + 'static,
    {
        let target = CompletionTarget::Direct(completion);
        self.dispatch(Box::new(self.operation(name, request, handler, target)));
    }

    fn operation<T>(
        &self,
        name: &'static str,
        request: Request,
        handler: Handler<T>,
        target: CompletionTarget<T>,
    ) -> NetworkOperation<T> {
        NetworkOperation::new(
            name,
            Arc::clone(&self.transport),
            Arc::clone(&self.headers),
            request,
            handler,
            target,
        )
    }

    fn dispatch(&self, operation: Box<dyn Operation>) {
        if let Err(rejected) = self.queue.submit(operation) {
            rejected.reject(TransportError::Unavailable("operation queue is shut down".to_string()));
        }
    }
}

/// Percent-encode an app user id for use in a path. Blank ids are rejected.
pub(crate) fn escaped_app_user_id(app_user_id: &str) -> Result<String, PurchasesError> {
    if app_user_id.trim().is_empty() {
        return Err(ValidationError::MissingAppUserId.into());
    }
    Ok(urlencoding::encode(app_user_id).into_owned())
}
