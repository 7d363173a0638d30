//! Retry policy tests

use mockito::Server;
use std::time::Duration;

use crate::provider::RequestExecutor;
use ekyc_core::context::RequestContext;
use ekyc_core::errors::DomainError;

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/thing")
        .with_status(404)
        .with_body("missing")
        .expect(1)
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let url = format!("{}/thing", server.url());
    let executor = RequestExecutor::new(3, Duration::from_millis(1));

    let response = executor
        .execute(&RequestContext::background(), "get_thing", || http.get(&url))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(response.body, "missing");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_single_attempt_policy_does_not_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/thing")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let url = format!("{}/thing", server.url());
    let executor = RequestExecutor::new(1, Duration::from_millis(1));

    let err = executor
        .execute(&RequestContext::background(), "get_thing", || http.get(&url))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Internal { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_errors_exhaust_attempts() {
    // Port 1 refuses connections
    let url = "http://127.0.0.1:1/thing".to_string();

    let http = reqwest::Client::new();
    let executor = RequestExecutor::new(2, Duration::from_millis(1));

    let err = executor
        .execute(&RequestContext::background(), "get_thing", || http.get(&url))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("get_thing failed after 2 attempts"));
}

#[tokio::test]
async fn test_cancel_during_backoff_stops_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/thing")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let url = format!("{}/thing", server.url());
    let executor = RequestExecutor::new(5, Duration::from_secs(30));
    let (ctx, handle) = RequestContext::with_cancel();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        executor.execute(&ctx, "get_thing", || http.get(&url)),
    )
    .await
    .expect("cancellation should interrupt the backoff")
    .unwrap_err();
    canceller.await.unwrap();

    assert_eq!(err, DomainError::Cancelled);
    mock.assert_async().await;
}
