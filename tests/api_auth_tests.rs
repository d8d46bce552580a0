// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and role-enforcement tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept tokens via Bearer header or cookie
//! 3. Role mismatches return 403, not 401
//! 4. Public routes stay reachable without a token

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use cleansweep_api::middleware::auth::Role;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_wrong_signing_key() {
    let (app, state) = common::create_test_app();

    let forged = cleansweep_api::middleware::auth::create_jwt(
        "device-1",
        Role::Citizen,
        b"some-other-signing-key",
    )
    .unwrap();
    // Sanity: it is a structurally valid token, just not ours
    assert_eq!(forged.matches('.').count(), 2);
    assert!(!state.config.jwt_signing_key.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", forged))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "device-1", Role::Citizen);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Offline mock DB means the handler fails on the database call, not
    // on auth. Any non-401/403 status proves the token was accepted.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cookie_auth_reaches_handler() {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "device-1", Role::Citizen);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::COOKIE, format!("cleansweep_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_citizen_token_rejected_on_worker_route() {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "device-1", Role::Citizen);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/worker/queue")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_worker_token_rejected_on_admin_route() {
    let (app, state) = common::create_test_app();
    let token = common::test_jwt(&state, "worker-1", Role::Worker);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/verifications")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_leaderboard_is_public() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/leaderboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // No token needed; offline DB turns the fetch into a 500, which
    // still proves the route bypasses the auth layer.
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
