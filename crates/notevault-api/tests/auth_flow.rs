//! End-to-end authentication and authorization flows
//!
//! Drives the full router against an in-memory database: login, bearer-token
//! access, role gating, account-status enforcement, and note ownership.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use notevault_api::{create_router, AppState};
use notevault_auth::{hash_password, AccessPolicy, JwtCodec, RoleRule, RouteAccess};
use notevault_db::{Database, NewUser, Role, User};

const SECRET: &str = "integration-test-secret-0123456789abcdef";

async fn test_state() -> AppState {
    let db = Database::new("sqlite::memory:").await.unwrap();

    db.insert_user(NewUser::active(
        "user1",
        "user1@example.com",
        hash_password("password1").unwrap(),
        BTreeSet::from([Role::User]),
    ))
    .await
    .unwrap();

    db.insert_user(NewUser::active(
        "admin",
        "admin@example.com",
        hash_password("adminPass").unwrap(),
        BTreeSet::from([Role::Admin]),
    ))
    .await
    .unwrap();

    let mut locked = NewUser::active(
        "locked",
        "locked@example.com",
        hash_password("lockedPass").unwrap(),
        BTreeSet::from([Role::User]),
    );
    locked.account_non_locked = false;
    db.insert_user(locked).await.unwrap();

    let codec = Arc::new(JwtCodec::new(SECRET, 60_000).unwrap());
    let policy = Arc::new(AccessPolicy::new(vec![
        RoleRule::new("/api/auth/public/**", RouteAccess::Public),
        RoleRule::new("/hello", RouteAccess::Public),
        RoleRule::new("/health", RouteAccess::Public),
        RoleRule::new("/api/admin/**", RouteAccess::Role(Role::Admin)),
    ]));

    AppState::new(db, codec, policy)
}

async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (create_router(state.clone()), state)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, path: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/public/signin",
            None,
            &json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    let status = response.status();
    let body = body_json(response).await;
    (status, body)
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn seeded_user(state: &AppState, username: &str) -> User {
    state
        .db
        .get_user_by_username(username)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn public_routes_reachable_without_header() {
    let (app, _) = test_app().await;

    for path in ["/hello", "/health"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "path: {path}");
    }
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let (app, _) = test_app().await;

    for path in ["/contact", "/api/notes", "/api/admin/users"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "path: {path}"
        );
    }
}

#[tokio::test]
async fn user_token_opens_generic_routes_but_not_admin() {
    let (app, _) = test_app().await;
    let token = login_token(&app, "user1", "password1").await;

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/contact", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Missing role is 403, not 401
    let response = app
        .clone()
        .oneshot(get("/api/admin/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_token_opens_both_prefixes() {
    let (app, _) = test_app().await;
    let token = login_token(&app, "admin", "adminPass").await;

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/admin/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let (app, _) = test_app().await;

    let (status, body) = login(&app, "user1", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = login(&app, "no-such-user", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn locked_account_cannot_log_in() {
    let (app, _) = test_app().await;

    let (status, body) = login(&app, "locked", "lockedPass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Account is locked");
}

#[tokio::test]
async fn locked_account_token_is_treated_as_anonymous() {
    let (app, state) = test_app().await;

    // A syntactically valid token is not enough once the account is locked
    let locked = seeded_user(&state, "locked").await;
    let token = state.codec.issue(&locked).unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_vanished_subject_is_treated_as_anonymous() {
    let (app, state) = test_app().await;

    // Issue against a separate store, so the subject is unknown here
    let scratch = Database::new("sqlite::memory:").await.unwrap();
    let ghost = scratch
        .insert_user(NewUser::active(
            "ghost",
            "ghost@example.com",
            "hash",
            BTreeSet::from([Role::User]),
        ))
        .await
        .unwrap();
    let token = state.codec.issue(&ghost).unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let (app, _) = test_app().await;
    let token = login_token(&app, "user1", "password1").await;

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&tampered)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (app, state) = test_app().await;

    // Same secret, negative lifetime: already past expiry when issued
    let expired_codec = JwtCodec::new(SECRET, -1000).unwrap();
    let user = seeded_user(&state, "user1").await;
    let token = expired_codec.issue(&user).unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn notes_are_scoped_to_their_owner() {
    let (app, _) = test_app().await;
    let user_token = login_token(&app, "user1", "password1").await;
    let admin_token = login_token(&app, "admin", "adminPass").await;

    // user1 creates a note
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/notes",
            Some(&user_token),
            &json!({"content": "secret plans"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let note = body_json(response).await;
    let note_id = note["id"].as_i64().unwrap();

    // Visible to its owner
    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&user_token)))
        .await
        .unwrap();
    let notes = body_json(response).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);

    // Invisible to anyone else, even an admin
    let response = app
        .clone()
        .oneshot(get("/api/notes", Some(&admin_token)))
        .await
        .unwrap();
    let notes = body_json(response).await;
    assert!(notes.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/notes/{note_id}"),
            Some(&admin_token),
            &json!({"content": "hijacked"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Owner can update and delete
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/notes/{note_id}"),
            Some(&user_token),
            &json!({"content": "revised plans"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["content"], "revised plans");

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/notes/{note_id}"),
            Some(&user_token),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn introspection_decodes_a_held_token() {
    let (app, _) = test_app().await;
    let token = login_token(&app, "user1", "password1").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/public/introspect",
            None,
            &json!({"token": token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let claims = body_json(response).await;
    assert_eq!(claims["sub"], "user1");
    assert!(claims["exp"].as_i64().unwrap() > claims["iat"].as_i64().unwrap());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/public/introspect",
            None,
            &json!({"token": "garbage"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_can_lock_and_unlock_accounts() {
    let (app, state) = test_app().await;
    let admin_token = login_token(&app, "admin", "adminPass").await;
    let user_id = seeded_user(&state, "user1").await.id;

    // Lock user1
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{user_id}/lock"),
            Some(&admin_token),
            &json!({"locked": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["account_non_locked"], false);

    let (status, body) = login(&app, "user1", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Account is locked");

    // Unlock and log in again
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{user_id}/lock"),
            Some(&admin_token),
            &json!({"locked": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = login(&app, "user1", "password1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_can_change_roles() {
    let (app, state) = test_app().await;
    let admin_token = login_token(&app, "admin", "adminPass").await;
    let user_id = seeded_user(&state, "user1").await.id;

    // Promote user1, then its fresh token clears the admin prefix
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{user_id}/role"),
            Some(&admin_token),
            &json!({"roles": ["ROLE_USER", "ROLE_ADMIN"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let token = login_token(&app, "user1", "password1").await;
    let response = app
        .clone()
        .oneshot(get("/api/admin/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // An empty role set is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{user_id}/role"),
            Some(&admin_token),
            &json!({"roles": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
