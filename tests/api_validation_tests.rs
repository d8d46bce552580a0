// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use cleansweep_api::middleware::auth::Role;
use serde_json::json;
use tower::ServiceExt;

mod common;

async fn post_report(body: serde_json::Value) -> axum::http::Response<axum::body::Body> {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "device-1", Role::Citizen);

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/reports")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_latitude_out_of_range() {
    let response = post_report(json!({
        "lat": 91.0,
        "lng": 77.2,
        "waste_types": ["plastic"]
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_longitude_out_of_range() {
    let response = post_report(json!({
        "lat": 28.6,
        "lng": -180.5,
        "waste_types": ["plastic"]
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_description_too_long() {
    let response = post_report(json!({
        "lat": 28.6,
        "lng": 77.2,
        "description": "a".repeat(51),
        "waste_types": ["plastic"]
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_accuracy_rejected() {
    let response = post_report(json!({
        "lat": 28.6,
        "lng": 77.2,
        "accuracy": -5.0,
        "waste_types": ["plastic"]
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_error_body_shape() {
    let response = post_report(json!({
        "lat": 91.0,
        "lng": 77.2,
        "waste_types": []
    }))
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_missing_coordinates_rejected() {
    // Structurally invalid body never reaches the handler
    let response = post_report(json!({ "waste_types": ["plastic"] })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_worker_start_missing_photo_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "worker-1", Role::Worker);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/worker/reports/r1/start")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "lat": 28.6,
                        "lng": 77.2,
                        "before_photo_url": "",
                        "captured_at": "2026-08-29T10:00:00Z"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assign_empty_worker_id_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "admin-1", Role::Admin);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/reports/r1/assign")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "worker_id": "" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leaderboard_limit_is_clamped() {
    let (app, _state) = common::create_test_app();

    // An absurd limit must not be a client error; it gets clamped and
    // then fails on the offline DB, proving the query parsed.
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/leaderboard?limit=100000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
