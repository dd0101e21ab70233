//! Shared test helpers for `purchases-core` integration tests.
//!
//! The mock transport records every call and can hold responses behind a
//! gate so tests control exactly when in-flight requests resolve.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use purchases_core::{Backend, Headers, HttpResponse, HttpTransport, TransportResult};
use purchases_domain::{JsonObject, PurchasesError};
use serde_json::Value;
use tokio::sync::{oneshot, Semaphore};

pub const API_KEY: &str = "appl_test_key";

/// One call observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub headers: Headers,
    pub body: Option<JsonObject>,
}

type Responder = Box<dyn Fn(&RecordedCall) -> TransportResult + Send + Sync>;

/// In-memory mock for `HttpTransport`.
pub struct MockTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
    gate: Option<Arc<Semaphore>>,
    cleared: AtomicUsize,
}

impl MockTransport {
    /// Respond immediately using `responder`.
    pub fn new(responder: impl Fn(&RecordedCall) -> TransportResult + Send + Sync + 'static) -> Self {
        Self { calls: Mutex::new(Vec::new()), responder: Box::new(responder), gate: None, cleared: AtomicUsize::new(0) }
    }

    /// Respond only after the returned semaphore receives a permit per call.
    pub fn gated(
        responder: impl Fn(&RecordedCall) -> TransportResult + Send + Sync + 'static,
    ) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut transport = Self::new(responder);
        transport.gate = Some(Arc::clone(&gate));
        (transport, gate)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn cleared(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }

    async fn respond(&self, call: RecordedCall) -> TransportResult {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        (self.responder)(&call)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, path: &str, headers: &Headers) -> TransportResult {
        self.respond(RecordedCall { method: "GET", path: path.to_string(), headers: headers.clone(), body: None })
            .await
    }

    async fn post(&self, path: &str, headers: &Headers, body: &JsonObject) -> TransportResult {
        self.respond(RecordedCall {
            method: "POST",
            path: path.to_string(),
            headers: headers.clone(),
            body: Some(body.clone()),
        })
        .await
    }

    fn clear_caches(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn backend(transport: &Arc<MockTransport>) -> Backend {
    let transport: Arc<dyn HttpTransport> = Arc::clone(transport) as Arc<dyn HttpTransport>;
    Backend::new(transport, API_KEY).unwrap()
}

pub fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn ok(status: u16, body: Value) -> TransportResult {
    Ok(HttpResponse::new(status, Some(object(body))))
}

pub fn customer_info_json(app_user_id: &str) -> Value {
    serde_json::json!({
        "request_date": "2024-03-01T10:00:00Z",
        "subscriber": {
            "original_app_user_id": app_user_id,
            "first_seen": "2024-01-01T00:00:00Z",
            "entitlements": {
                "pro": {"product_identifier": "monthly", "expires_date": "2099-01-01T00:00:00Z"}
            }
        }
    })
}

/// Completion callback paired with the receiver its result lands on.
pub fn completion<T: Send + 'static>() -> (
    impl FnOnce(Result<T, PurchasesError>) + Send + 'static,
    oneshot::Receiver<Result<T, PurchasesError>>,
) {
    let (sender, receiver) = oneshot::channel();
    let callback = move |result: Result<T, PurchasesError>| {
        let _ = sender.send(result);
    };
    (callback, receiver)
}

/// Await a completion, failing the test instead of hanging.
pub async fn received<T>(receiver: oneshot::Receiver<Result<T, PurchasesError>>) -> Result<T, PurchasesError> {
    tokio::time::timeout(Duration::from_secs(5), receiver)
        .await
        .expect("completion timed out")
        .expect("completion dropped without a result")
}

/// Wait until the transport has observed `count` calls.
pub async fn wait_for_calls(transport: &MockTransport, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while transport.call_count() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("transport never saw the expected calls");
}
