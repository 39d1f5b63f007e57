//! Authorization guard behavior at the HTTP surface, driven in-process.
//! Policy denials fire before any storage round-trip, so none of these
//! require a database.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use critique_api::auth::{generate_jwt, Claims};
use critique_api::policy::Role;

fn bearer(role: Role) -> String {
    let claims = Claims::new(Uuid::new_v4(), "test-user".into(), role, false);
    format!("Bearer {}", generate_jwt(claims).expect("token"))
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let response = critique_api::app().oneshot(req).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn root_describes_the_service() {
    let (status, body) = send(Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn anonymous_writes_are_unauthorized() {
    let title_body = json!({ "name": "Dune", "year": 1965 });
    let cases = [
        (Method::POST, "/titles".to_string(), title_body.clone()),
        (
            Method::PATCH,
            format!("/titles/{}", Uuid::new_v4()),
            json!({ "name": "Dune" }),
        ),
        (Method::POST, "/categories".to_string(), json!({ "name": "Books", "slug": "books" })),
        (Method::POST, "/genres".to_string(), json!({ "name": "Sci-Fi", "slug": "sci-fi" })),
        (Method::POST, "/users".to_string(), json!({ "username": "x", "email": "x@example.com" })),
        (Method::PATCH, "/users/me".to_string(), json!({ "bio": "hi" })),
        (
            Method::PATCH,
            format!("/titles/{}/reviews/{}", Uuid::new_v4(), Uuid::new_v4()),
            json!({ "text": "edited" }),
        ),
    ];

    for (method, uri, body) in cases {
        let (status, body) = send(json_request(method.clone(), &uri, None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn anonymous_deletes_are_unauthorized() {
    for uri in [
        format!("/titles/{}", Uuid::new_v4()),
        "/categories/books".to_string(),
        "/genres/sci-fi".to_string(),
    ] {
        let (status, _) = send(
            Request::delete(uri.as_str()).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn regular_users_cannot_write_taxonomy() {
    let auth = bearer(Role::User);
    let cases = [
        ("/titles", json!({ "name": "Dune", "year": 1965 })),
        ("/categories", json!({ "name": "Books", "slug": "books" })),
        ("/genres", json!({ "name": "Sci-Fi", "slug": "sci-fi" })),
    ];

    for (uri, body) in cases {
        let (status, body) = send(json_request(Method::POST, uri, Some(&auth), body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn moderators_cannot_write_taxonomy_either() {
    let auth = bearer(Role::Moderator);
    let (status, _) = send(json_request(
        Method::POST,
        "/titles",
        Some(&auth),
        json!({ "name": "Dune", "year": 1965 }),
    ))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_admins_cannot_manage_users() {
    for role in [Role::User, Role::Moderator] {
        let auth = bearer(role);
        let (status, _) = send(
            Request::get("/users")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{:?}", role);
    }
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected_even_on_reads() {
    let (status, body) = send(
        Request::get("/titles")
            .header(header::AUTHORIZATION, "Bearer not-a-real-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() {
    let (status, _) = send(
        Request::get("/titles")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn put_is_not_an_allowed_verb() {
    let auth = bearer(Role::Admin);
    let (status, _) = send(json_request(
        Method::PUT,
        &format!("/titles/{}", Uuid::new_v4()),
        Some(&auth),
        json!({ "name": "Dune", "year": 1965 }),
    ))
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
