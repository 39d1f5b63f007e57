//! Review endpoints, nested under a title. Reads are public; any
//! authenticated user may create (once per title); updates and deletes are
//! gated on authorship, moderator rank or admin.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{require, require_authenticated, require_object};
use crate::database::{manager::DatabaseManager, reviews, titles};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{Page, Pagination};
use crate::policy::{Action, ResourceKind};
use crate::validation::{validate_score, validate_text};

#[derive(Debug, Deserialize)]
pub struct ReviewCreate {
    pub text: String,
    pub score: i16,
}

#[derive(Debug, Deserialize)]
pub struct ReviewUpdate {
    pub text: Option<String>,
    pub score: Option<i16>,
}

/// The title segment of the nested path must exist, otherwise 404.
async fn resolve_title(pool: &PgPool, title_id: Uuid) -> Result<(), ApiError> {
    if !titles::exists(pool, title_id).await? {
        return Err(ApiError::not_found("Title not found"));
    }
    Ok(())
}

// GET /titles/:title_id/reviews
pub async fn list(
    Path(title_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    resolve_title(&pool, title_id).await?;

    let (results, count) =
        reviews::list_for_title(&pool, title_id, page.offset(), page.limit()).await?;

    Ok(Json(json!({
        "success": true,
        "data": Page { count, results }
    })))
}

// POST /titles/:title_id/reviews
pub async fn create(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(title_id): Path<Uuid>,
    Json(payload): Json<ReviewCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require(&auth, Action::Create, ResourceKind::Review)?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    validate_text(&payload.text)?;
    validate_score(payload.score)?;

    let pool = DatabaseManager::pool().await?;
    resolve_title(&pool, title_id).await?;

    // The one-review-per-author-per-title rule is the UNIQUE constraint;
    // a violation comes back as a 400, same as a pre-check would give
    let review = reviews::create(&pool, title_id, actor.id, &payload.text, payload.score).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": review })),
    ))
}

// GET /titles/:title_id/reviews/:id
pub async fn get(
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let review = reviews::find(&pool, title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    Ok(Json(json!({ "success": true, "data": review })))
}

// PATCH /titles/:title_id/reviews/:id
pub async fn update(
    Extension(auth): Extension<Option<AuthUser>>,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReviewUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    // Anonymous writes fail before any storage round-trip
    let actor = require_authenticated(&auth)?;
    if let Some(text) = &payload.text {
        validate_text(text)?;
    }
    if let Some(score) = payload.score {
        validate_score(score)?;
    }

    let pool = DatabaseManager::pool().await?;
    let review = reviews::find(&pool, title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    require_object(Some(&actor), review.author_id)?;

    reviews::update(&pool, review_id, payload.text.as_deref(), payload.score).await?;
    let review = reviews::find(&pool, title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    Ok(Json(json!({ "success": true, "data": review })))
}

// DELETE /titles/:title_id/reviews/:id
pub async fn delete(
    Extension(auth): Extension<Option<AuthUser>>,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require_authenticated(&auth)?;

    let pool = DatabaseManager::pool().await?;
    let review = reviews::find(&pool, title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    require_object(Some(&actor), review.author_id)?;

    reviews::delete(&pool, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
