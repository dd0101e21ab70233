//! End-to-end tests: `Backend` over the reqwest transport against a
//! wiremock server.

use std::time::Duration;

use purchases_core::Backend;
use purchases_domain::{
    BackendConfig, BackendErrorCode, CustomerInfo, LogInResult, Offerings, PurchasesError,
    TransportError,
};
use purchases_infra::build_backend;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "appl_network_test";

fn backend_for(server: &MockServer, max_attempts: usize) -> Backend {
    let mut config = BackendConfig::new(API_KEY);
    config.base_url = format!("{}/v1", server.uri());
    config.max_attempts = max_attempts;
    config.base_backoff_ms = 5;
    config.timeout_secs = 5;
    build_backend(&config).expect("backend")
}

fn customer_info_json(app_user_id: &str) -> Value {
    json!({
        "request_date": "2024-03-01T10:00:00Z",
        "subscriber": {
            "original_app_user_id": app_user_id,
            "first_seen": "2024-01-01T00:00:00Z"
        }
    })
}

fn channel<T: Send + 'static>() -> (
    impl FnOnce(Result<T, PurchasesError>) + Send + 'static,
    oneshot::Receiver<Result<T, PurchasesError>>,
) {
    let (sender, receiver) = oneshot::channel();
    (
        move |result: Result<T, PurchasesError>| {
            let _ = sender.send(result);
        },
        receiver,
    )
}

async fn received<T>(receiver: oneshot::Receiver<Result<T, PurchasesError>>) -> Result<T, PurchasesError> {
    tokio::time::timeout(Duration::from_secs(10), receiver)
        .await
        .expect("completion timed out")
        .expect("completion dropped")
}

#[tokio::test]
async fn concurrent_customer_info_requests_share_one_http_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/subscribers/user%201"))
        .and(header("Authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(customer_info_json("user 1"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, 1);
    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (completion, receiver) = channel::<CustomerInfo>();
        backend.get_customer_info("user 1", completion);
        receivers.push(receiver);
    }

    for receiver in receivers {
        let info = received(receiver).await.expect("customer info");
        assert_eq!(info.original_app_user_id(), "user 1");
    }
    assert_eq!(backend.coalescing_stats().customer_info.coalesced_requests, 2);
    backend.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn log_in_reports_created_accounts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/subscribers/identify"))
        .and(body_json(json!({"app_user_id": "anon", "new_app_user_id": "alice"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(customer_info_json("alice")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, 1);
    let (completion, receiver) = channel::<LogInResult>();
    backend.log_in("anon", "alice", completion);

    let result = received(receiver).await.expect("log in");
    assert!(result.created);
    assert_eq!(result.customer_info.original_app_user_id(), "alice");
    backend.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn server_errors_are_retried_then_surface_as_backend_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/subscribers/bob/offerings"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"code": 7110, "message": "down"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let backend = backend_for(&server, 2);
    let (completion, receiver) = channel::<Offerings>();
    backend.get_offerings("bob", completion);

    match received(receiver).await {
        Err(PurchasesError::Backend(error)) => {
            assert_eq!(error.code, BackendErrorCode::new(7110));
            assert_eq!(error.message.as_deref(), Some("down"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
    backend.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn failed_customer_info_is_not_finishable_on_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": 7000})))
        .mount(&server)
        .await;

    let backend = backend_for(&server, 1);
    let (completion, receiver) = channel::<CustomerInfo>();
    backend.get_customer_info("carol", completion);

    let error = received(receiver).await.expect_err("backend error");
    let backend_error = error.backend_error().expect("backend error variant");
    assert_eq!(backend_error.context.finishable, Some(false));
    backend.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn unreachable_servers_surface_as_network_errors() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut config = BackendConfig::new(API_KEY);
    config.base_url = format!("http://{addr}");
    config.max_attempts = 1;
    let backend = build_backend(&config).expect("backend");

    let (completion, receiver) = channel::<()>();
    backend.create_alias("dave", "dave-2", completion);

    assert!(matches!(
        received(receiver).await,
        Err(PurchasesError::Network { source: TransportError::Connect(_) })
    ));
    backend.shutdown().await.expect("shutdown");
}
