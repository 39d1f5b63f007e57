pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod pagination;
pub mod policy;
pub mod validation;

use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(title_routes())
        .merge(taxonomy_routes())
        .merge(user_routes())
        // Global middleware; auth context runs on every route so handlers
        // always see an Option<AuthUser> extension
        .layer(axum::middleware::from_fn(
            middleware::auth_context_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/token", post(auth::token))
}

fn title_routes() -> Router {
    use handlers::{comments, reviews, titles};

    Router::new()
        .route("/titles", get(titles::list).post(titles::create))
        .route(
            "/titles/:title_id",
            get(titles::get)
                .patch(titles::update)
                .delete(titles::delete),
        )
        .route(
            "/titles/:title_id/reviews",
            get(reviews::list).post(reviews::create),
        )
        .route(
            "/titles/:title_id/reviews/:review_id",
            get(reviews::get)
                .patch(reviews::update)
                .delete(reviews::delete),
        )
        .route(
            "/titles/:title_id/reviews/:review_id/comments",
            get(comments::list).post(comments::create),
        )
        .route(
            "/titles/:title_id/reviews/:review_id/comments/:comment_id",
            get(comments::get)
                .patch(comments::update)
                .delete(comments::delete),
        )
}

fn taxonomy_routes() -> Router {
    use handlers::taxonomy;

    Router::new()
        .route(
            "/categories",
            get(taxonomy::categories_list).post(taxonomy::categories_create),
        )
        .route(
            "/categories/:slug",
            axum::routing::delete(taxonomy::categories_delete),
        )
        .route(
            "/genres",
            get(taxonomy::genres_list).post(taxonomy::genres_create),
        )
        .route("/genres/:slug", axum::routing::delete(taxonomy::genres_delete))
}

fn user_routes() -> Router {
    use handlers::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/me", get(users::me).patch(users::me_update))
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Critique API",
            "version": version,
            "description": "Media-review backend: titles, reviews, comments, role-based access",
            "endpoints": {
                "auth": "/auth/signup, /auth/token (public)",
                "titles": "/titles[/:id] (read public, write admin)",
                "taxonomy": "/categories[/:slug], /genres[/:slug] (read public, write admin)",
                "reviews": "/titles/:title_id/reviews[/:id] (read public, write authenticated)",
                "comments": "/titles/:title_id/reviews/:review_id/comments[/:id] (read public, write authenticated)",
                "users": "/users[/:username] (admin), /users/me (self)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
