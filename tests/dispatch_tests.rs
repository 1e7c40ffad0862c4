//! Integration tests for single-request dispatch against a mock HTTP server.

use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use apirequester_core::client::{build_client, ClientConfig};
use apirequester_core::dispatch::{send_once, DispatchError};
use apirequester_core::request::{HeaderPair, HttpMethod, ResolvedRequest};

fn request(
    method: HttpMethod,
    url: String,
    headers: Vec<HeaderPair>,
    body: Option<&str>,
) -> ResolvedRequest {
    ResolvedRequest {
        method,
        url,
        headers,
        body: body.map(str::to_string),
    }
}

#[tokio::test]
async fn send_once_returns_status_body_and_elapsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"users": []}"#)
                .insert_header("X-Request-Id", "req-42"),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let req = request(HttpMethod::Get, format!("{}/users", server.uri()), vec![], None);

    let summary = send_once(&client, &req).await.unwrap();

    assert_eq!(summary.status, 200);
    assert_eq!(summary.body, r#"{"users": []}"#);
    assert!(summary
        .headers
        .iter()
        .any(|(name, value)| name == "x-request-id" && value == "req-42"));
}

#[tokio::test]
async fn send_once_forwards_headers_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/items/7"))
        .and(header("Authorization", "Bearer abc123"))
        .and(body_string(r#"{"name":"renamed"}"#))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let req = request(
        HttpMethod::Put,
        format!("{}/items/7", server.uri()),
        vec![HeaderPair::new("Authorization", "Bearer abc123")],
        Some(r#"{"name":"renamed"}"#),
    );

    let summary = send_once(&client, &req).await.unwrap();
    assert_eq!(summary.status, 204);
}

#[tokio::test]
async fn headers_with_empty_keys_are_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    // Empty-key pairs come from blank rows in the header editor; they must
    // not break the request.
    let req = request(
        HttpMethod::Get,
        format!("{}/plain", server.uri()),
        vec![HeaderPair::new("", "ignored")],
        None,
    );

    assert!(send_once(&client, &req).await.is_ok());
}

#[tokio::test]
async fn non_2xx_response_is_not_a_dispatch_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let req = request(
        HttpMethod::Delete,
        format!("{}/missing", server.uri()),
        vec![],
        None,
    );

    let summary = send_once(&client, &req).await.unwrap();
    assert_eq!(summary.status, 404);
    assert_eq!(summary.body, "not found");
}

#[tokio::test]
async fn timeout_surfaces_as_a_categorized_send_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = build_client(&ClientConfig {
        request_timeout: Duration::from_millis(100),
        ..ClientConfig::default()
    })
    .unwrap();

    let req = request(HttpMethod::Get, format!("{}/slow", server.uri()), vec![], None);

    let err = send_once(&client, &req).await.unwrap_err();
    assert!(matches!(err, DispatchError::Send(_)));
    assert!(
        err.to_string().contains("timeout_error"),
        "expected timeout category in '{}'",
        err
    );
}

#[tokio::test]
async fn connection_refused_surfaces_as_send_error() {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let req = request(
        HttpMethod::Get,
        "http://127.0.0.1:1/unreachable".to_string(),
        vec![],
        None,
    );

    let err = send_once(&client, &req).await.unwrap_err();
    assert!(matches!(err, DispatchError::Send(_)));
}
