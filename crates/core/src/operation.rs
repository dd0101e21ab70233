//! Network operations executed by the queue

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use purchases_domain::{JsonObject, PurchasesError, TransportError};
use tracing::{debug, warn};

use crate::cache_key::CacheKey;
use crate::coalescer::{CallbackCache, Completion};
use crate::ports::{Headers, HttpTransport, TransportResult};
use crate::queue::Operation;

/// The single transport call an operation performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `GET` of an already-escaped path.
    Get { path: String },
    /// `POST` of a JSON object body.
    Post { path: String, body: JsonObject },
}

impl Request {
    /// Path relative to the transport's base URL.
    pub fn path(&self) -> &str {
        match self {
            Self::Get { path } | Self::Post { path, .. } => path,
        }
    }

    fn method(&self) -> &'static str {
        match self {
            Self::Get { .. } => "GET",
            Self::Post { .. } => "POST",
        }
    }
}

/// Maps the raw transport outcome to a typed result.
pub type Handler<T> = Box<dyn FnOnce(TransportResult) -> Result<T, PurchasesError> + Send>;

/// Where an operation delivers its result.
pub enum CompletionTarget<T> {
    /// Every callback parked under `key` in `cache`.
    Coalesced { cache: Arc<CallbackCache<T>>, key: CacheKey },
    /// A single caller that was never coalesced.
    Direct(Completion<T>),
}

impl<T: Clone> CompletionTarget<T> {
    /// Deliver `result` to every waiting caller.
    pub fn complete(self, result: Result<T, PurchasesError>) {
        match self {
            Self::Coalesced { cache, key } => cache.resolve(&key, result),
            Self::Direct(completion) => completion(result),
        }
    }
}

/// One request bound to its handler and completion target.
pub struct NetworkOperation<T> {
    name: &'static str,
    transport: Arc<dyn HttpTransport>,
    headers: Arc<Headers>,
    request: Request,
    handler: Handler<T>,
    target: CompletionTarget<T>,
}

impl<T> NetworkOperation<T> {
    /// Bind `request` to `handler`; the outcome goes to `target` once run.
    pub fn new(
        name: &'static str,
        transport: Arc<dyn HttpTransport>,
        headers: Arc<Headers>,
        request: Request,
        handler: Handler<T>,
        target: CompletionTarget<T>,
    ) -> Self {
        Self { name, transport, headers, request, handler, target }
    }
}

#[async_trait]
impl<T: Clone + Send + 'static> Operation for NetworkOperation<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(self: Box<Self>) {
        let Self { name, transport, headers, request, handler, target } = *self;
        let started = Instant::now();

        let outcome = match &request {
            Request::Get { path } => transport.get(path, &headers).await,
            Request::Post { path, body } => transport.post(path, &headers, body).await,
        };

        match &outcome {
            Ok(response) => debug!(
                operation = name,
                method = request.method(),
                path = request.path(),
                status = response.status_code,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Backend responded"
            ),
            Err(error) => warn!(
                operation = name,
                method = request.method(),
                path = request.path(),
                error = %error,
                "Transport call failed"
            ),
        }

        let result = handler(outcome);
        if let Err(error) = &result {
            warn!(operation = name, error_type = error.label(), error = %error, "Backend request failed");
        }
        target.complete(result);
    }

    fn reject(self: Box<Self>, error: TransportError) {
        let Self { name, handler, target, .. } = *self;
        warn!(operation = name, error = %error, "Operation rejected without dispatch");
        target.complete(handler(Err(error)));
    }
}
