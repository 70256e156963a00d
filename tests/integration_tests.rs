//! Integration tests for the request pipeline using wiremock to simulate the API.

use finwise::resources::ListTransactionsParams;
use finwise::{Client, Error, PageParams, RetryPolicy};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("finwise=debug")
        .with_test_writer()
        .try_init();
}

/// Client against the mock server with fast, deterministic retries.
fn client(server: &MockServer) -> Client {
    init_tracing();
    Client::builder()
        .api_key("sk_test_123")
        .base_url(server.uri())
        .unwrap()
        .retry_policy(
            RetryPolicy::default()
                .with_initial_delay(Duration::from_millis(10))
                .with_jitter(false),
        )
        .build()
        .unwrap()
}

fn account_json(id: &str) -> Value {
    json!({
        "id": id,
        "userId": "usr_1",
        "name": "Test Savings Account",
        "type": "depository",
        "subType": "savings",
        "currentBalance": {"amount": "5000.00", "currencyCode": "USD"},
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-15T12:30:00Z"
    })
}

#[tokio::test]
async fn test_default_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .and(header("authorization", "sk_test_123"))
        .and(header("accept", "application/json"))
        .and(header_exists("request-id"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("acc_1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let account = client(&mock_server)
        .accounts()
        .retrieve("acc_1")
        .await
        .unwrap();

    assert_eq!(account.id, "acc_1");

    let requests = mock_server.received_requests().await.unwrap();
    let user_agent = requests[0].headers.get("user-agent").unwrap();
    assert!(user_agent.to_str().unwrap().starts_with("finwise-rust/"));
}

#[tokio::test]
async fn test_not_found_maps_to_typed_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Account not found",
            "request_id": "req_1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).accounts().retrieve("missing").await;

    match result {
        Err(Error::NotFound(err)) => {
            assert_eq!(err.status.as_u16(), 404);
            assert_eq!(err.message, "Account not found");
            assert_eq!(err.request_id.as_deref(), Some("req_1"));
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let cases: [(u16, fn(&Error) -> bool); 5] = [
        (400, |e| matches!(e, Error::Validation(_))),
        (401, |e| matches!(e, Error::Authentication(_))),
        (403, |e| matches!(e, Error::PermissionDenied(_))),
        (409, |e| matches!(e, Error::Conflict(_))),
        (422, |e| matches!(e, Error::Validation(_))),
    ];

    for (status, is_expected) in cases {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/acc_1"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"message": "nope", "code": "bad_thing"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .accounts()
            .retrieve("acc_1")
            .await
            .unwrap_err();

        assert!(is_expected(&err), "status {} mapped to {:?}", status, err);
        assert!(!err.is_retryable());
        assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        assert_eq!(err.api_error().unwrap().code.as_deref(), Some("bad_thing"));
        assert_eq!(err.message(), "nope");
    }
}

#[tokio::test]
async fn test_unexpected_status_maps_to_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .accounts()
        .retrieve("acc_1")
        .await
        .unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.status.as_u16(), 418);
            assert_eq!(api.message, "Unknown error");
            assert!(api.request_id.is_some());
        }
        other => panic!("Expected Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_retried_after_server_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_json(json!({"message": "Too many requests"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "Slow down"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("acc_1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let start = Instant::now();
    let account = client(&mock_server)
        .accounts()
        .retrieve("acc_1")
        .await
        .unwrap();

    assert_eq!(account.id, "acc_1");
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_oversized_retry_after_body_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "message": "slow",
            "retryAfter": 1e300
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .api_key("sk_test_123")
        .base_url(mock_server.uri())
        .unwrap()
        .max_retries(0)
        .build()
        .unwrap();

    let err = client.accounts().retrieve("acc_1").await.unwrap_err();

    match &err {
        Error::RateLimited { error, retry_after } => {
            assert_eq!(error.message, "slow");
            assert_eq!(*retry_after, Some(Duration::MAX));
        }
        other => panic!("Expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_oversized_retry_after_is_capped_by_policy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"retryAfter": 1e300})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("acc_1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .api_key("sk_test_123")
        .base_url(mock_server.uri())
        .unwrap()
        .retry_policy(
            RetryPolicy::default()
                .with_max_retries(1)
                .with_max_retry_after(Duration::from_millis(10)),
        )
        .build()
        .unwrap();

    let start = Instant::now();
    let account = client.accounts().retrieve("acc_1").await.unwrap();

    assert_eq!(account.id, "acc_1");
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_request_id_reused_across_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("acc_1")))
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .accounts()
        .retrieve("acc_1")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    let ids: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("request-id").unwrap().to_str().unwrap().to_string())
        .collect();
    assert!(ids.iter().all(|id| id == &ids[0]));
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(4)
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .accounts()
        .retrieve("acc_1")
        .await
        .unwrap_err();

    match err {
        Error::Server(api) => {
            assert_eq!(api.status.as_u16(), 500);
            assert_eq!(api.message, "boom");
        }
        other => panic!("Expected Server, got {:?}", other),
    }
}

#[tokio::test]
async fn test_zero_retries_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .api_key("sk_test_123")
        .base_url(mock_server.uri())
        .unwrap()
        .max_retries(0)
        .build()
        .unwrap();

    let err = client.accounts().retrieve("acc_1").await.unwrap_err();
    assert!(matches!(err, Error::Server(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_timeout_per_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(account_json("acc_1"))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .api_key("sk_test_123")
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(100))
        .retry_policy(
            RetryPolicy::default()
                .with_max_retries(1)
                .with_initial_delay(Duration::from_millis(10))
                .with_jitter(false),
        )
        .build()
        .unwrap();

    let err = client.accounts().retrieve("acc_1").await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got {:?}", err);
    assert!(err.request_id().is_some());
}

#[tokio::test]
async fn test_connection_error() {
    init_tracing();

    // Nothing listens on the discard port
    let client = Client::builder()
        .api_key("sk_test_123")
        .base_url("http://127.0.0.1:9")
        .unwrap()
        .max_retries(0)
        .build()
        .unwrap();

    let err = client.accounts().retrieve("acc_1").await.unwrap_err();

    assert!(matches!(err, Error::Connection { .. }), "got {:?}", err);
    assert!(err.is_retryable());
    assert!(err.status().is_none());
}

#[tokio::test]
async fn test_connection_error_is_retried() {
    init_tracing();

    let client = Client::builder()
        .api_key("sk_test_123")
        .base_url("http://127.0.0.1:9")
        .unwrap()
        .retry_policy(
            RetryPolicy::default()
                .with_max_retries(1)
                .with_initial_delay(Duration::from_millis(200))
                .with_jitter(false),
        )
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client.accounts().retrieve("acc_1").await.unwrap_err();

    // a refused connection fails at once, so the elapsed time is the backoff
    assert!(matches!(err, Error::Connection { .. }), "got {:?}", err);
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .accounts()
        .retrieve("acc_1")
        .await
        .unwrap_err();

    match err {
        Error::Deserialization {
            raw_response,
            status,
            ..
        } => {
            assert_eq!(raw_response, "invalid json");
            assert_eq!(status.as_u16(), 200);
        }
        other => panic!("Expected Deserialization, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_api_key() {
    // Only meaningful when the host does not provide a key
    if std::env::var("FINWISE_API_KEY").is_ok() {
        return;
    }

    let err = Client::builder().build().unwrap_err();
    assert!(matches!(err, Error::MissingApiKey(_)));

    let err = Client::new("   ").unwrap_err();
    assert!(matches!(err, Error::MissingApiKey(_)));
}

#[tokio::test]
async fn test_closed_client_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let clone = client.clone();
    client.close();
    client.close();

    assert!(clone.is_closed());
    assert!(matches!(
        clone.accounts().list(PageParams::default()).await,
        Err(Error::Closed)
    ));
    assert!(matches!(
        clone
            .transactions()
            .list(ListTransactionsParams::default())
            .await,
        Err(Error::Closed)
    ));
}

#[tokio::test]
async fn test_scoped_closes_on_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let observer = client.clone();

    let result = client
        .scoped(|client| async move { client.accounts().retrieve("gone").await })
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(observer.is_closed());
}

#[tokio::test]
async fn test_scoped_closes_on_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/acc_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("acc_1")))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let observer = client.clone();

    let name = client
        .scoped(|client| async move {
            client
                .accounts()
                .retrieve("acc_1")
                .await
                .map(|account| account.name)
        })
        .await
        .unwrap();

    assert_eq!(name, "Test Savings Account");
    assert!(observer.is_closed());
}

#[tokio::test]
async fn test_scoped_closes_on_panic() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server);
    let observer = client.clone();

    let handle = tokio::spawn(client.scoped(|client| async move {
        if !client.is_closed() {
            panic!("boom");
        }
        Ok::<(), Error>(())
    }));

    let join = handle.await;
    assert!(join.unwrap_err().is_panic());
    assert!(observer.is_closed());
}

#[tokio::test]
async fn test_scoped_closes_when_cancelled() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server);
    let observer = client.clone();

    let scope = client.scoped(|_client| async move {
        std::future::pending::<()>().await;
        Ok::<(), Error>(())
    });

    let result = tokio::time::timeout(Duration::from_millis(50), scope).await;
    assert!(result.is_err());
    assert!(observer.is_closed());
}
