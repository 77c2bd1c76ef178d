//! End-to-end request scenarios against the axum router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use loadprobe_core::{LoadProbeError, Reply, Result};
use loadprobe_server::app_state::AppState;
use loadprobe_server::config::ServerConfig;
use loadprobe_server::dispatch::Endpoint;
use loadprobe_server::handlers;
use loadprobe_server::obs::HttpMetrics;
use loadprobe_server::router::build_router;

fn test_config() -> ServerConfig {
    ServerConfig {
        slow_delay_ms: 10,
        ..Default::default()
    }
}

fn app() -> (Router, AppState) {
    let state = AppState::new(test_config()).unwrap();
    (build_router(state.clone()), state)
}

async fn get(router: &Router, path: &str) -> (StatusCode, String, String, Vec<u8>) {
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let ctype = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    let clen = resp.headers()[header::CONTENT_LENGTH].to_str().unwrap().to_string();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(clen, body.len().to_string(), "content-length for {path}");
    (status, ctype, clen, body.to_vec())
}

/// Value of one exposition line, 0 when the series is absent.
fn sample(exposition: &str, series: &str) -> u64 {
    exposition
        .lines()
        .find_map(|l| l.strip_prefix(series).map(|v| v.trim().parse().unwrap()))
        .unwrap_or(0)
}

#[tokio::test]
async fn healthz_is_ok() {
    let (router, _) = app();
    let (status, ctype, _, body) = get(&router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype, "text/plain; charset=utf-8");
    assert_eq!(body, b"OK\n");
}

#[tokio::test]
async fn ready_reports_json() {
    let (router, _) = app();
    let (status, ctype, _, body) = get(&router, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype, "application/json");
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], "ready");
    assert!(v["timestamp"].is_number());
}

#[tokio::test]
async fn unknown_path_gets_the_greeting() {
    let (router, _) = app();
    let (s1, _, _, root) = get(&router, "/").await;
    let (s2, _, _, unknown) = get(&router, "/unknown/path").await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(root, b"Hello, World!\n");
    assert_eq!(unknown, root);
}

#[tokio::test]
async fn compute_returns_sum_of_squares() {
    let (router, _) = app();
    let (status, ctype, _, body) = get(&router, "/api/compute").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype, "application/json");
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["result"], 333_283_335_000u64);
    assert_eq!(v["message"], "Computation completed");
}

#[tokio::test]
async fn slow_completes() {
    let (router, state) = app();
    let (status, _, _, body) = get(&router, "/slow").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Slow response completed\n");
    let snap = state.metrics().duration.snapshot(["/slow", "GET"]).unwrap();
    assert!(snap.sum_seconds >= 0.01);
}

#[tokio::test]
async fn metrics_lags_its_own_request_by_one() {
    let (router, _) = app();
    let series = r#"python_app_requests_total{path="/metrics",method="GET",status="200"}"#;

    let (status, ctype, _, first) = get(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype, "text/plain; version=0.0.4; charset=utf-8");
    let first = String::from_utf8(first).unwrap();
    let (_, _, _, second) = get(&router, "/metrics").await;
    let second = String::from_utf8(second).unwrap();
    let (_, _, _, third) = get(&router, "/metrics").await;
    let third = String::from_utf8(third).unwrap();

    assert_eq!(sample(&first, series), 0);
    assert_eq!(sample(&second, series), 1);
    assert_eq!(sample(&third, series), sample(&second, series) + 1);
    // The scrape in progress counts itself.
    assert_eq!(sample(&third, "python_app_requests_in_progress "), 1);
}

#[tokio::test]
async fn metrics_cover_every_request() {
    let (router, state) = app();
    for path in ["/healthz", "/healthz", "/nope", "/api/compute"] {
        get(&router, path).await;
    }
    let m = state.metrics();
    assert_eq!(m.requests.get(["/healthz", "GET", "200"]), Some(2));
    assert_eq!(m.requests.get(["/nope", "GET", "200"]), Some(1));
    assert_eq!(m.duration.snapshot(["/healthz", "GET"]).unwrap().count, 2);
    assert_eq!(m.in_flight.get(), 0);

    let (_, _, _, body) = get(&router, "/metrics").await;
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains(
        r#"python_app_request_duration_seconds_count{path="/api/compute",method="GET"} 1"#
    ));
}

#[tokio::test]
async fn non_get_methods_share_routes() {
    let (router, state) = app();
    let req = Request::builder()
        .method("POST")
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(state.metrics().requests.get(["/healthz", "POST", "200"]), Some(1));
}

struct AlwaysFails;

#[async_trait]
impl Endpoint for AlwaysFails {
    fn name(&self) -> &'static str {
        "always_fails"
    }

    async fn handle(&self) -> Result<Reply> {
        Err(LoadProbeError::Compute("integer overflow".into()))
    }
}

#[tokio::test]
async fn faulting_handler_is_contained() {
    let cfg = test_config();
    let metrics = Arc::new(HttpMetrics::new(cfg.metrics_namespace.clone()));
    let routes = handlers::builtin_routes(&cfg, Arc::clone(&metrics)).unwrap();
    assert!(routes.replace("/api/compute", Arc::new(AlwaysFails)).is_some());
    let state = AppState::from_parts(cfg, metrics, routes);
    let router = build_router(state.clone());

    let (status, ctype, _, body) = get(&router, "/api/compute").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctype, "text/plain; charset=utf-8");
    assert_eq!(body, b"Error: computation failed: integer overflow\n");

    let m = state.metrics();
    assert_eq!(m.in_flight.get(), 0);
    assert_eq!(m.requests.get(["/api/compute", "GET", "500"]), Some(1));
    assert_eq!(m.requests.get(["/api/compute", "GET", "200"]), None);

    let (status, _, _, _) = get(&router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn concurrent_requests_keep_gauge_balanced() {
    let (router, state) = app();
    let mut tasks = Vec::new();
    for i in 0..32 {
        let router = router.clone();
        let path = if i % 2 == 0 { "/slow" } else { "/healthz" };
        tasks.push(tokio::spawn(async move {
            let req = Request::builder().uri(path).body(Body::empty()).unwrap();
            router.oneshot(req).await.unwrap().status()
        }));
    }
    for t in tasks {
        assert_eq!(t.await.unwrap(), StatusCode::OK);
    }
    let m = state.metrics();
    assert_eq!(m.in_flight.get(), 0);
    assert_eq!(m.requests.get(["/slow", "GET", "200"]), Some(16));
    assert_eq!(m.requests.get(["/healthz", "GET", "200"]), Some(16));
}

#[tokio::test]
async fn default_build_exports_the_established_family_names() {
    let (router, _) = app();
    get(&router, "/healthz").await;
    let (_, _, _, body) = get(&router, "/metrics").await;
    let text = String::from_utf8(body).unwrap();

    for line in [
        "# HELP python_app_requests_total Total HTTP requests received",
        "# TYPE python_app_requests_total counter",
        "# HELP python_app_request_duration_seconds Request duration in seconds",
        "# TYPE python_app_request_duration_seconds histogram",
        "# HELP python_app_requests_in_progress Requests currently being processed",
        "# TYPE python_app_requests_in_progress gauge",
        r#"python_app_requests_total{path="/healthz",method="GET",status="200"} 1"#,
    ] {
        assert!(text.lines().any(|l| l == line), "missing line: {line}");
    }
}

#[tokio::test]
async fn query_string_is_part_of_the_path() {
    let (router, state) = app();
    let (status, _, _, body) = get(&router, "/healthz?x=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Hello, World!\n");

    let m = state.metrics();
    assert_eq!(m.requests.get(["/healthz?x=1", "GET", "200"]), Some(1));
    assert_eq!(m.requests.get(["/healthz", "GET", "200"]), None);
    assert_eq!(m.duration.snapshot(["/healthz?x=1", "GET"]).unwrap().count, 1);
}

#[tokio::test]
async fn client_giving_up_on_slow_is_still_counted() {
    let cfg = ServerConfig {
        slow_delay_ms: 200,
        ..Default::default()
    };
    let state = AppState::new(cfg).unwrap();
    let router = build_router(state.clone());

    let req = Request::builder().uri("/slow").body(Body::empty()).unwrap();
    let abandoned = tokio::time::timeout(Duration::from_millis(20), router.oneshot(req)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;
    let m = state.metrics();
    assert_eq!(m.in_flight.get(), 0);
    assert_eq!(m.requests.get(["/slow", "GET", "200"]), Some(1));
    assert_eq!(m.duration.snapshot(["/slow", "GET"]).unwrap().count, 1);
}
