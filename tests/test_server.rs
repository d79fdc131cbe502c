//! HTTP surface: status codes and response bodies.

#![cfg(feature = "server")]

mod common;

use auction_results::server::router;
use auction_results::AsyncAuctionResults;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(client: auction_results::AuctionResults) -> axum::Router {
    router(AsyncAuctionResults::from_sync(client))
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/auction-results")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let app = app_with(common::sample_client());
    let request = Request::get("/health").body(Body::empty()).unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_returns_envelope() {
    let app = app_with(common::sample_client());

    let (status, body) = send(
        app,
        post_json(r#"{"make": "Porsche", "model": "911", "status": "sold", "sortBy": "sold_date", "sortOrder": "desc"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "database");
    assert_eq!(body["results"][0]["title"], "2019 Porsche 911 Carrera T");
    assert_eq!(body["summary"]["soldPercentage"], "100%");
    assert_eq!(body["filters"]["sortBy"], "sold_date");
}

#[tokio::test]
async fn missing_make_is_bad_request() {
    let app = app_with(common::sample_client());

    let (status, body) = send(app, post_json(r#"{"model": "911"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("make"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app_with(common::sample_client());

    let (status, body) = send(app, post_json("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_grouping_is_bad_request() {
    let app = app_with(common::sample_client());

    let (status, _) = send(
        app,
        post_json(r#"{"groupBy": "title", "aggregation": [{"function": "count", "field": "*"}]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn aggregation_returns_flat_rows() {
    let app = app_with(common::sample_client());

    let (status, body) = send(
        app,
        post_json(
            r#"{"groupBy": "make", "aggregation": [{"function": "count", "field": "*"}], "sortOrder": "desc"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "database");
    assert_eq!(body["results"][0], json!({ "make": "Porsche", "count": 4 }));
}

#[tokio::test]
async fn aggregation_store_failure_is_bad_gateway() {
    let client = common::sample_client();
    client
        .connection()
        .raw()
        .execute_batch("DROP TABLE auction_results")
        .unwrap();
    let app = app_with(client);

    let (status, body) = send(
        app,
        post_json(r#"{"groupBy": "make", "aggregation": [{"function": "count", "field": "*"}]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn listing_store_failure_still_answers() {
    let client = common::sample_client();
    client
        .connection()
        .raw()
        .execute_batch("DROP TABLE auction_results")
        .unwrap();
    let app = app_with(client);

    let (status, body) = send(app, post_json(r#"{"make": "Porsche"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "scraper_fallback");
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn makes_lists_distinct_makes() {
    let app = app_with(common::sample_client());
    let request = Request::get("/api/makes").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": ["BMW", "Ferrari", "Porsche"], "count": 3 }));
}
