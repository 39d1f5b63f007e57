//! Signup input validation at the HTTP surface. These all fail before the
//! flow reaches storage, so no database is required.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_signup(body: Value) -> (StatusCode, Value) {
    let request = Request::post("/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = critique_api::app().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

#[tokio::test]
async fn reserved_username_me_is_rejected() {
    for username in ["me", "Me", "ME"] {
        let (status, body) =
            post_signup(json!({ "username": username, "email": "me@example.com" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", username);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["username"].is_string());
    }
}

#[tokio::test]
async fn username_character_class_is_enforced() {
    for username in ["has space", "semi;colon", "slash/name", ""] {
        let (status, body) =
            post_signup(json!({ "username": username, "email": "a@example.com" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", username);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let (status, body) = post_signup(json!({ "username": "alice", "email": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["email"].is_string());
}

#[tokio::test]
async fn missing_fields_are_a_client_error() {
    let (status, _) = post_signup(json!({ "username": "alice" })).await;
    assert!(status.is_client_error());
}
