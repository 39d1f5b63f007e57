//! Storage-coupled behavior: derived ratings, confirmation-code rotation,
//! the one-review-per-author-per-title rule, and moderator powers. Each
//! test runs against its own throwaway Postgres database.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use critique_api::auth::{generate_jwt, Claims};
use critique_api::database::manager::DatabaseManager;
use critique_api::database::users::{self, NewUser};
use critique_api::database::{reviews, titles};
use critique_api::error::ApiError;
use critique_api::policy::Role;

fn bearer(role: Role) -> String {
    let claims = Claims::new(Uuid::new_v4(), "staff-user".into(), role, false);
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

fn reader<'a>(username: &'a str, email: &'a str) -> NewUser<'a> {
    NewUser {
        username,
        email,
        role: Role::User,
        confirmation_code: "",
        first_name: None,
        last_name: None,
        bio: None,
    }
}

async fn stored_confirmation_code(pool: &PgPool, username: &str) -> anyhow::Result<String> {
    let code: String =
        sqlx::query_scalar("SELECT confirmation_code FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(code)
}

#[sqlx::test]
async fn rating_is_the_one_decimal_mean_and_null_without_reviews(
    pool: PgPool,
) -> anyhow::Result<()> {
    let title_id = titles::create(&pool, "Dune", 1965, "", None, &[]).await?;

    let detail = titles::get(&pool, title_id).await?.expect("title");
    assert_eq!(detail.rating, None);

    for (i, score) in [4i16, 5, 2].into_iter().enumerate() {
        let username = format!("reader{}", i);
        let email = format!("reader{}@example.com", i);
        let user = users::create(&pool, reader(&username, &email)).await?;
        reviews::create(&pool, title_id, user.id, "fine", score).await?;
    }

    // mean of 4, 5, 2 is 3.666..., rounded to one decimal
    let detail = titles::get(&pool, title_id).await?.expect("title");
    assert_eq!(detail.rating, Some(3.7));
    Ok(())
}

#[sqlx::test]
async fn second_review_for_the_same_title_is_a_validation_error(
    pool: PgPool,
) -> anyhow::Result<()> {
    let title_id = titles::create(&pool, "Dune", 1965, "", None, &[]).await?;
    let user = users::create(&pool, reader("solaris", "solaris@example.com")).await?;

    reviews::create(&pool, title_id, user.id, "great", 9).await?;
    let err = reviews::create(&pool, title_id, user.id, "again", 3)
        .await
        .expect_err("unique constraint");

    let api: ApiError = err.into();
    assert_eq!(api.status_code(), 400);
    let body = api.to_json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["title"].is_string());
    Ok(())
}

#[sqlx::test]
async fn create_persists_profile_fields_in_one_statement(pool: PgPool) -> anyhow::Result<()> {
    let user = users::create(
        &pool,
        NewUser {
            username: "frank",
            email: "frank@example.com",
            role: Role::Admin,
            confirmation_code: "",
            first_name: Some("Frank"),
            last_name: Some("Herbert"),
            bio: Some("author"),
        },
    )
    .await?;

    assert_eq!(user.first_name.as_deref(), Some("Frank"));
    assert_eq!(user.last_name.as_deref(), Some("Herbert"));

    let fetched = users::find_by_username(&pool, "frank")
        .await?
        .expect("row");
    assert_eq!(fetched.bio.as_deref(), Some("author"));
    assert_eq!(fetched.role, Role::Admin);
    Ok(())
}

// The one test that installs its pool into the router's manager; keeping a
// single installer per test binary avoids cross-database confusion.
#[sqlx::test]
async fn signup_rotation_and_review_lifecycle_over_http(pool: PgPool) -> anyhow::Result<()> {
    DatabaseManager::install_pool(pool.clone()).await;

    let signup = json!({ "username": "alice", "email": "alice@example.com" });

    let (status, _) = send(json_request(
        Method::POST,
        "/auth/signup",
        None,
        signup.clone(),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    let first_code = stored_confirmation_code(&pool, "alice").await?;

    // Idempotent re-issue: same identity, fresh code
    let (status, _) = send(json_request(Method::POST, "/auth/signup", None, signup)).await;
    assert_eq!(status, StatusCode::OK);
    let second_code = stored_confirmation_code(&pool, "alice").await?;
    assert_ne!(first_code, second_code);

    // Only the latest code validates
    let (status, body) = send(json_request(
        Method::POST,
        "/auth/token",
        None,
        json!({ "username": "alice", "confirmation_code": first_code }),
    ))
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(json_request(
        Method::POST,
        "/auth/token",
        None,
        json!({ "username": "alice", "confirmation_code": second_code }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    let alice = format!("Bearer {}", body["data"]["token"].as_str().expect("token"));

    // An admin stocks a title
    let admin = bearer(Role::Admin);
    let (status, body) = send(json_request(
        Method::POST,
        "/titles",
        Some(&admin),
        json!({ "name": "Dune", "year": 1965 }),
    ))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let title_id = body["data"]["id"].as_str().expect("title id").to_string();

    // Alice reviews once; a second attempt hits the uniqueness rule
    let reviews_uri = format!("/titles/{}/reviews", title_id);
    let (status, body) = send(json_request(
        Method::POST,
        &reviews_uri,
        Some(&alice),
        json!({ "text": "monumental", "score": 9 }),
    ))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let review_id = body["data"]["id"].as_str().expect("review id").to_string();

    let (status, body) = send(json_request(
        Method::POST,
        &reviews_uri,
        Some(&alice),
        json!({ "text": "again", "score": 3 }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["title"].is_string());

    // The surviving review drives the derived rating
    let title_uri = format!("/titles/{}", title_id);
    let (status, body) = send(
        Request::get(title_uri.as_str())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 9.0);

    // A moderator may remove someone else's review
    let moderator = bearer(Role::Moderator);
    let review_uri = format!("/titles/{}/reviews/{}", title_id, review_id);
    let (status, _) = send(
        Request::delete(review_uri.as_str())
            .header(header::AUTHORIZATION, &moderator)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        Request::get(review_uri.as_str())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
