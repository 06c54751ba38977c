//! Router tests driven in-process through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::{routing::get, Router};
use chrono::{Datelike, NaiveDate};
use tower::ServiceExt;

use citytemp_server::{app, with_middleware, AppState};
use citytemp_weather::{DateKey, TemperatureCache};

const TOKEN: &str = "0123456789abcdef0123456789abcdef01234567"; // 40 chars

fn test_app(prefix: &str) -> (Router, Arc<TemperatureCache>) {
    let cache = Arc::new(TemperatureCache::new());
    (app(AppState::new(Arc::clone(&cache)), prefix), cache)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

async fn fetch(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn test_cache_hit_returns_temp() {
    let (app, cache) = test_app("/api");
    cache.record(
        DateKey::new(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
        285.3,
    );

    let uri = format!("/api/get-weather?year=2024&month=03&day=07&auth_token={}", TOKEN);
    let (status, body) = fetch(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"temp": 285.3}));
}

#[tokio::test]
async fn test_record_today_visible_through_endpoint() {
    let (app, cache) = test_app("");
    let today = cache.record_today(281.15).date();

    let uri = format!(
        "/get-weather?year={}&month={}&day={}&auth_token={}",
        today.year(),
        today.month(),
        today.day(),
        TOKEN
    );
    let (status, body) = fetch(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temp"], 281.15);
}

#[tokio::test]
async fn test_cache_miss_is_404_empty_object() {
    let (app, _cache) = test_app("/api");

    let uri = format!("/api/get-weather?year=2024&month=1&day=1&auth_token={}", TOKEN);
    let (status, body) = fetch(app, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn test_short_token_rejected_before_lookup() {
    let (app, cache) = test_app("/api");
    cache.record(
        DateKey::new(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
        285.3,
    );

    let uri = "/api/get-weather?year=2024&month=3&day=7&auth_token=too-short";
    let (status, body) = fetch(app, uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["reason"].as_str().unwrap().contains("at least 32"));
    assert!(body.get("temp").is_none());
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let (app, _cache) = test_app("");
    let (status, body) = fetch(app, "/get-weather?year=2024&month=3&day=7").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "auth_token is required");
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let (app, cache) = test_app("");
    cache.record(
        DateKey::new(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
        270.0,
    );

    let request = Request::builder()
        .uri("/get-weather?year=2024&month=3&day=7")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temp"], 270.0);
}

#[tokio::test]
async fn test_invalid_date_is_400() {
    let (app, _cache) = test_app("");

    let uri = format!("/get-weather?year=2024&month=13&day=1&auth_token={}", TOKEN);
    let (status, body) = fetch(app, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["reason"].as_str().unwrap().contains("not a calendar date"));
}

#[tokio::test]
async fn test_missing_query_field_is_400() {
    let (app, _cache) = test_app("");

    let uri = format!("/get-weather?year=2024&month=1&auth_token={}", TOKEN);
    let (status, body) = fetch(app, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["reason"].as_str().unwrap().contains("day"));
}

#[tokio::test]
async fn test_routes_live_under_prefix() {
    let (app, _cache) = test_app("/weather/");

    let (status, _) = fetch(app.clone(), "/weather/health").await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/get-weather?year=2024&month=1&day=1&auth_token={}", TOKEN);
    let (status, _) = fetch(app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_cached_days() {
    let (app, cache) = test_app("/api");
    cache.record(DateKey::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 1.0);
    cache.record(DateKey::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), 2.0);

    let (status, body) = fetch(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cached_days"], 2);
}

#[tokio::test]
async fn test_handler_panic_becomes_uniform_400() {
    async fn explode() -> &'static str {
        panic!("lookup table corrupted")
    }

    let app = with_middleware(Router::new().route("/explode", get(explode)));
    let (status, body) = fetch(app, "/explode").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "Internal error: lookup table corrupted");
}
