//! End-to-end generic gateway and scoped relay scenarios.

mod common;

use std::time::{Duration, Instant};

use common::{
    expired_token, gateway_config, start_gateway, start_mock_backend, test_client, valid_token,
    MockResponse,
};

#[tokio::test]
async fn gateway_passes_backend_response_through_untouched() {
    let backend = start_mock_backend(MockResponse::json(200, r#"{"name":"Ann"}"#)).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let token = valid_token();
    let res = test_client()
        .get(format!("http://{gateway}/api/auth?to=/api/profile"))
        .header("cookie", format!("token={token}"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(res.text().await.unwrap(), r#"{"name":"Ann"}"#);

    let upstream = backend.last_request().unwrap();
    assert!(upstream.starts_with("GET /api/profile"), "upstream was: {upstream}");
    assert!(
        upstream.contains(&format!("Bearer {token}")),
        "bearer header missing: {upstream}"
    );
    assert!(upstream.to_lowercase().contains("accept: application/json"));
}

#[tokio::test]
async fn gateway_forwards_remaining_query_parameters() {
    let backend = start_mock_backend(MockResponse::json(200, "[]")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .get(format!("http://{gateway}/api/auth?to=/api/items&page=2&sort=asc"))
        .header("cookie", format!("token={}", valid_token()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let upstream = backend.last_request().unwrap();
    // The routing parameter is stripped; everything else goes verbatim.
    assert!(upstream.starts_with("GET /api/items?page=2&sort=asc"), "upstream was: {upstream}");
    assert!(!upstream.contains("to=/api"));
}

#[tokio::test]
async fn gateway_rejects_targets_outside_the_allowlist() {
    let backend = start_mock_backend(MockResponse::json(200, "{}")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    for to in ["/evil", "/", "http://evil.example/api/x", "api/profile"] {
        let res = test_client()
            .get(format!("http://{gateway}/api/auth"))
            .query(&[("to", to)])
            .header("cookie", format!("token={}", valid_token()))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 400, "to={to}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "invalid_to");
        assert!(body["hint"].is_string());
    }

    // The open-relay guard means none of those produced upstream traffic.
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn gateway_rejects_a_missing_target() {
    let backend = start_mock_backend(MockResponse::json(200, "{}")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .get(format!("http://{gateway}/api/auth"))
        .header("cookie", format!("token={}", valid_token()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn gateway_rejects_disallowed_methods_first() {
    let backend = start_mock_backend(MockResponse::json(200, "{}")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    // No session cookie and no target: the method check still wins.
    let res = test_client()
        .head(format!("http://{gateway}/api/auth"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 405);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn gateway_requires_a_session() {
    let backend = start_mock_backend(MockResponse::json(200, "{}")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .get(format!("http://{gateway}/api/auth?to=/api/profile"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn gateway_defers_expiry_to_the_backend() {
    // Presence-only check here: an expired token is still forwarded and the
    // backend's own rejection comes back untouched.
    let backend = start_mock_backend(MockResponse::json(401, r#"{"error":"token expired"}"#)).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .get(format!("http://{gateway}/api/auth?to=/api/profile"))
        .header("cookie", format!("token={}", expired_token()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
    assert_eq!(backend.hits(), 1);
    assert_eq!(res.text().await.unwrap(), r#"{"error":"token expired"}"#);
}

#[tokio::test]
async fn gateway_forwards_body_and_content_type() {
    let backend = start_mock_backend(MockResponse::json(201, r#"{"id":7}"#)).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .post(format!("http://{gateway}/api/auth?to=/api/notes"))
        .header("cookie", format!("token={}", valid_token()))
        .header("content-type", "text/plain")
        .body("a plain note")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    let upstream = backend.last_request().unwrap();
    assert!(upstream.starts_with("POST /api/notes"));
    assert!(upstream.to_lowercase().contains("content-type: text/plain"));
    assert!(upstream.ends_with("a plain note"));
}

#[tokio::test]
async fn gateway_propagates_the_trace_id() {
    let backend = start_mock_backend(MockResponse::json(200, "{}")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .get(format!("http://{gateway}/api/auth?to=/api/profile"))
        .header("cookie", format!("token={}", valid_token()))
        .header("x-request-id", "trace-123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let upstream = backend.last_request().unwrap();
    assert!(upstream.to_lowercase().contains("x-request-id: trace-123"));
}

#[tokio::test]
async fn scoped_relay_passes_through_with_bearer() {
    let backend = start_mock_backend(MockResponse::json(200, r#"{"question":"who?"}"#)).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .post(format!("http://{gateway}/api/relay/onboarding/pebble"))
        .header("cookie", format!("token={}", valid_token()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"question":"who?"}"#);

    let upstream = backend.last_request().unwrap();
    assert!(upstream.starts_with("POST /api/onboarding/pebble"));
    assert!(upstream.to_lowercase().contains("authorization: bearer"));
}

#[tokio::test]
async fn scoped_relay_forwards_the_reply_body() {
    let backend =
        start_mock_backend(MockResponse::json(200, r#"{"message":"ok","done":true}"#)).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .post(format!("http://{gateway}/api/relay/onboarding/reply"))
        .header("cookie", format!("token={}", valid_token()))
        .header("content-type", "application/json")
        .body(r#"{"message":"my answer"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"message":"ok","done":true}"#);
    let upstream = backend.last_request().unwrap();
    assert!(upstream.ends_with(r#"{"message":"my answer"}"#));
}

#[tokio::test]
async fn scoped_relay_requires_a_session() {
    let backend = start_mock_backend(MockResponse::json(200, "{}")).await;
    let gateway = start_gateway(gateway_config(&backend.base_url())).await;

    let res = test_client()
        .post(format!("http://{gateway}/api/relay/onboarding/start"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn scoped_relay_times_out_with_bad_gateway() {
    let backend = start_mock_backend(
        MockResponse::json(200, "{}").with_delay(Duration::from_secs(5)),
    )
    .await;
    let mut config = gateway_config(&backend.base_url());
    config.timeouts.relay_ms = 200;
    let gateway = start_gateway(config).await;

    let started = Instant::now();
    let res = test_client()
        .post(format!("http://{gateway}/api/relay/onboarding/finish"))
        .header("cookie", format!("token={}", valid_token()))
        .send()
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "upstream timeout");
    // The call was aborted at the bound, not held for the backend's delay.
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[tokio::test]
async fn scoped_relay_maps_transport_failure_to_bad_gateway() {
    // Point the gateway at a port nothing listens on.
    let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", dead.local_addr().unwrap());
    drop(dead);

    let gateway = start_gateway(gateway_config(&base_url)).await;

    let res = test_client()
        .post(format!("http://{gateway}/api/relay/onboarding/start"))
        .header("cookie", format!("token={}", valid_token()))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}
