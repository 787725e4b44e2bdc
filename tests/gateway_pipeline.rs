//! End-to-end tests for the gateway request pipeline.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use authgateway::routing::DEFAULT_OWNER;
use authgateway::source::MemoryConfigSource;

mod common;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method(Method::GET).uri(uri)
}

async fn start() -> (String, Arc<MemoryConfigSource>) {
    let backend = common::start_echo_backend().await;
    let source = common::memory_source(backend);
    let router = common::router(common::gateway_state(source.clone()));
    let gateway = common::spawn_gateway(router).await;
    (format!("http://{}", gateway), source)
}

#[tokio::test]
async fn test_authorized_request_is_forwarded() {
    let (gateway, source) = start().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/gateway/orders/v1/items?page=2&sort=desc%20x", gateway))
        .header("Authorization", common::bearer("alice"))
        .header("Cookie", "a=b")
        .header("Origin", "http://evil")
        .header("User-Agent", "test-client")
        .header("X-Custom", "kept")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-process-time"));
    assert_eq!(res.headers().get("x-trace-id").unwrap(), "backend-trace");
    assert_eq!(res.headers().get("x-backend").unwrap(), "echo");
    assert!(!res.headers().contains_key("set-cookie"));
    assert!(!res.headers().contains_key("server"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/orders/v1/items");
    assert_eq!(body["query"], "page=2&sort=desc%20x");

    let headers = &body["headers"];
    assert_eq!(headers["x-custom"], "kept");
    assert!(headers.get("cookie").is_none());
    assert!(headers.get("origin").is_none());
    assert!(headers.get("user-agent").is_none());

    // Caller's bearer token replaced by the backend's basic credentials.
    let expected = format!("Basic {}", STANDARD.encode("svc-user:svc-pass"));
    assert_eq!(headers["authorization"], expected.as_str());

    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_backend_without_credentials_gets_no_authorization() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .get(format!("{}/gateway/billing/invoices", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    // Trailing slash on the base URL is trimmed.
    assert_eq!(body["path"], "/billing/invoices");
    assert!(body["headers"].get("authorization").is_none());
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let (gateway, _) = start().await;
    let client = reqwest::Client::new();
    let url = format!("{}/gateway/orders/v1/items", gateway);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = client
        .get(&url)
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(&url)
        .header("Authorization", format!("Basic {}", common::token("alice")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let foreign = authgateway::auth::JwtAuthority::new("another-secret", 24)
        .issue("alice", "127.0.0.1")
        .unwrap();
    let res = client
        .get(&url)
        .header("Authorization", format!("Bearer {}", foreign))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn test_excluded_url_skips_authorization() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .get(format!("{}/gateway/orders/public/catalog", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/orders/public/catalog");
}

#[tokio::test]
async fn test_unknown_app_is_route_unavailable() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .get(format!("{}/gateway/inventory/items", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("inventory"));
}

#[tokio::test]
async fn test_json_body_forwarded_with_default_content_type() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .post(format!("{}/gateway/orders/v1/items", gateway))
        .header("Authorization", common::bearer("alice"))
        .body(r#"{"sku":"A-1","qty":3}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["method"], "POST");
    assert_eq!(body["body"]["sku"], "A-1");
    assert_eq!(body["body"]["qty"], 3);
    assert_eq!(body["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn test_invalid_json_body_is_bad_request() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .put(format!("{}/gateway/orders/v1/items/7", gateway))
        .header("Authorization", common::bearer("alice"))
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_options_short_circuits() {
    let backend = common::start_echo_backend().await;
    let source = common::memory_source(backend);
    let router = common::router(common::gateway_state(source.clone()));

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/gateway/orders/v1/items")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let trace_id = response.headers().get("x-trace-id").unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(trace_id).is_ok());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
    // No routing happened.
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_backend_error_relay_policy() {
    let backend = common::start_echo_backend().await;

    let relaying = common::spawn_gateway(common::router(common::with_relay(
        common::gateway_state(common::memory_source(backend)),
        true,
    )))
    .await;
    let translating = common::spawn_gateway(common::router(common::with_relay(
        common::gateway_state(common::memory_source(backend)),
        false,
    )))
    .await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/gateway/orders/status/404", relaying))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers().get("x-backend").unwrap(), "echo");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], 404);

    let res = client
        .get(format!("http://{}/gateway/orders/text-error", translating))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "backend exploded");
}

#[tokio::test]
async fn test_backend_body_sanitation() {
    let (gateway, _) = start().await;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("{}/gateway/orders/v1/items/empty", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = client
        .get(format!("{}/gateway/orders/html", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let source = Arc::new(MemoryConfigSource::with_entries(
        DEFAULT_OWNER,
        common::gateway_entries("http://127.0.0.1:1"),
    ));
    let gateway = common::spawn_gateway(common::router(common::gateway_state(source))).await;

    let res = reqwest::Client::new()
        .get(format!("http://{}/gateway/orders/v1/items", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_failure_fails_closed() {
    let (gateway, source) = start().await;
    source.set_failing(true);
    let client = reqwest::Client::new();

    // Exclusions cannot be read, so even the public path requires a token.
    let res = client
        .get(format!("{}/gateway/orders/public/catalog", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("{}/gateway/orders/v1/items", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);

    // Recovery on the next request.
    source.set_failing(false);
    let res = client
        .get(format!("{}/gateway/orders/v1/items", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_lazy_population_is_shared_across_requests() {
    let (gateway, source) = start().await;
    let client = reqwest::Client::new();

    for _ in 0..5 {
        let res = client
            .get(format!("{}/gateway/orders/v1/items", gateway))
            .header("Authorization", common::bearer("alice"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_dot_segments_are_rejected_before_authorization() {
    let backend = common::start_echo_backend().await;
    let source = common::memory_source(backend);
    let router = common::router(common::gateway_state(source.clone()));

    for uri in [
        "/gateway/orders/public/../secret",
        "/gateway/orders/public/%2E%2E%2Fsecret",
        "/gateway/orders/public/%2e%2e/secret",
        "/gateway/orders/public/./x",
    ] {
        let (status, body) = send(&router, get(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string());
    }
    // Rejected before the cache (and its exclusions) were consulted.
    assert_eq!(source.fetch_count(), 0);
}

#[tokio::test]
async fn test_encoded_path_is_forwarded_verbatim() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .get(format!("{}/gateway/orders/files/a%3Frole%3Dadmin%2Fx", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/orders/files/a%3Frole%3Dadmin%2Fx");
    assert!(body["query"].is_null());
}

#[tokio::test]
async fn test_forged_host_header_does_not_match_exclusion() {
    let backend = common::start_echo_backend().await;
    let router = common::router(common::gateway_state(common::memory_source(backend)));

    let request = get("/gateway/orders/secret")
        .header(header::HOST, "h/gateway/orders/public")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Exclusion text in the query string does not count either.
    let request = get("/gateway/orders/secret?next=/gateway/orders/public")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_trailing_slash_reaches_app_root() {
    let (gateway, _) = start().await;

    let res = reqwest::Client::new()
        .get(format!("{}/gateway/orders/", gateway))
        .header("Authorization", common::bearer("alice"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/orders");
}

#[tokio::test]
async fn test_request_metrics_label_only_configured_apps() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let backend = common::start_echo_backend().await;
    let router = common::router(common::gateway_state(common::memory_source(backend)));

    for i in 0..20 {
        let uri = format!("/gateway/junk{}/x", i);
        let (status, _) = send(&router, get(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let request = get("/gateway/orders/v1/items")
        .header(header::AUTHORIZATION, common::bearer("alice"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let rendered = handle.render();
    let series: Vec<&str> = rendered
        .lines()
        .filter(|line| line.starts_with("gateway_requests_total{"))
        .collect();
    assert!(series.iter().all(|line| !line.contains("junk")), "{:?}", series);
    assert!(series.iter().any(|line| line.contains("app=\"unrouted\"")));
    assert!(series.iter().any(|line| line.contains("app=\"orders\"")));
    assert_eq!(series.len(), 2, "{:?}", series);
}
