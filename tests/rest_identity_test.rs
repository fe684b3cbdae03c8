// ABOUTME: HTTP-level tests for the identity client against a mock auth service
// ABOUTME: Covers password grant, sign-up with and without confirmation, refresh, logout, and errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use gymtrack::auth::{AuthStatus, AuthStore, IdentityProvider, MemorySessionStorage, RestIdentity};
use gymtrack::backend::{AuthToken, RestBackend};
use gymtrack::database::ProfileManager;
use gymtrack::errors::ErrorCode;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_body(user_id: Uuid, access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh,
        "user": { "id": user_id, "email": "lifter@example.com" }
    })
}

fn identity(server: &MockServer) -> RestIdentity {
    common::init_test_logging();
    RestIdentity::new(&server.uri(), "anon-key").unwrap()
}

#[tokio::test]
async fn test_password_grant_builds_session() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({ "email": "lifter@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(user_id, "a1", "r1")))
        .expect(1)
        .mount(&server)
        .await;

    let session = identity(&server)
        .sign_in_with_password("lifter@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(session.access_token, "a1");
    assert_eq!(session.refresh_token, "r1");
    assert_eq!(session.user.id, user_id);
    assert!(!session.expires_within(3000, chrono::Utc::now()));
    assert!(session.expires_within(3700, chrono::Utc::now()));
}

#[tokio::test]
async fn test_bad_credentials_keep_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let err = identity(&server)
        .sign_in_with_password("lifter@example.com", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
    assert_eq!(err.user_message(), "Invalid login credentials");
}

#[tokio::test]
async fn test_sign_up_with_and_without_session() {
    let server = MockServer::start().await;
    let confirmed_id = Uuid::new_v4();
    let pending_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "lifter@example.com",
            "data": { "display_name": "Sam" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(confirmed_id, "a", "r")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({ "email": "pending@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": pending_id,
            "email": "pending@example.com",
            "confirmation_sent_at": "2025-03-01T10:00:00Z"
        })))
        .mount(&server)
        .await;

    let identity = identity(&server);
    let outcome = identity
        .sign_up("lifter@example.com", "hunter22", Some("Sam"))
        .await
        .unwrap();
    assert_eq!(outcome.user.id, confirmed_id);
    assert!(outcome.session.is_some());

    let outcome = identity
        .sign_up("pending@example.com", "hunter22", None)
        .await
        .unwrap();
    assert_eq!(outcome.user.id, pending_id);
    assert!(outcome.session.is_none());
}

#[tokio::test]
async fn test_sign_up_validation_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "error_code": "weak_password",
            "msg": "Password should be at least 6 characters."
        })))
        .mount(&server)
        .await;

    let err = identity(&server)
        .sign_up("lifter@example.com", "123", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
    assert_eq!(err.user_message(), "Password should be at least 6 characters.");
}

#[tokio::test]
async fn test_refresh_and_logout() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(user_id, "a2", "r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let identity = identity(&server);
    let session = identity.refresh_session("r1").await.unwrap();
    assert_eq!(session.access_token, "a2");
    identity.sign_out(&session.access_token).await.unwrap();
}

#[tokio::test]
async fn test_get_user_checks_access_token() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": user_id,
            "email": "lifter@example.com",
            "aud": "authenticated"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "msg": "invalid JWT: unable to parse or verify signature"
        })))
        .mount(&server)
        .await;

    let identity = identity(&server);
    assert_eq!(identity.get_user("good").await.unwrap().id, user_id);
    let err = identity.get_user("stale").await.unwrap_err();
    assert!(err.code.is_auth());
    assert_eq!(
        err.user_message(),
        "invalid JWT: unable to parse or verify signature"
    );
}

#[tokio::test]
async fn test_service_outage_is_not_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = identity(&server).refresh_session("r1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    assert!(!err.code.is_auth());
}

#[tokio::test]
async fn test_store_signs_in_and_loads_profile_over_http() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body(user_id, "user-jwt", "r1")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(header("authorization", "Bearer user-jwt"))
        .and(query_param("id", format!("eq.{user_id}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": user_id,
            "email": "lifter@example.com",
            "display_name": "Sam",
            "unit_preference": "lbs"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let token = AuthToken::new();
    let backend = RestBackend::new(&server.uri(), "anon-key", token.clone()).unwrap();
    let store = AuthStore::new(
        Arc::new(identity(&server)),
        Arc::new(MemorySessionStorage::new()),
        ProfileManager::new(Arc::new(backend)),
        token,
    );

    store.sign_in("lifter@example.com", "hunter22").await.unwrap();
    let state = store.snapshot().await;
    assert_eq!(state.status, AuthStatus::SignedIn);
    assert_eq!(state.profile.unwrap().display_name.as_deref(), Some("Sam"));
}
