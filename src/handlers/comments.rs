//! Comment endpoints, nested under /titles/:title_id/reviews/:review_id.
//! The whole ancestor chain is resolved first; a review id that does not
//! belong to the title is a 404, never a cross-title leak.

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
use crate::database::{comments, manager::DatabaseManager, reviews};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{Page, Pagination};
use crate::policy::{Action, ResourceKind};
use crate::validation::validate_text;

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub text: String,
}

async fn resolve_review(pool: &PgPool, title_id: Uuid, review_id: Uuid) -> Result<(), ApiError> {
    reviews::find(pool, title_id, review_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Review not found"))
}

// GET /titles/:title_id/reviews/:review_id/comments
pub async fn list(
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    resolve_review(&pool, title_id, review_id).await?;

    let (results, count) =
        comments::list_for_review(&pool, review_id, page.offset(), page.limit()).await?;

    Ok(Json(json!({
        "success": true,
        "data": Page { count, results }
    })))
}

// POST /titles/:title_id/reviews/:review_id/comments
pub async fn create(
    Extension(auth): Extension<Option<AuthUser>>,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require(&auth, Action::Create, ResourceKind::Comment)?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    validate_text(&payload.text)?;

    let pool = DatabaseManager::pool().await?;
    resolve_review(&pool, title_id, review_id).await?;

    let comment = comments::create(&pool, review_id, actor.id, &payload.text).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": comment })),
    ))
}

// GET /titles/:title_id/reviews/:review_id/comments/:id
pub async fn get(
    Path((title_id, review_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    resolve_review(&pool, title_id, review_id).await?;
    let comment = comments::find(&pool, review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(Json(json!({ "success": true, "data": comment })))
}

// PATCH /titles/:title_id/reviews/:review_id/comments/:id
pub async fn update(
    Extension(auth): Extension<Option<AuthUser>>,
    Path((title_id, review_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<CommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require_authenticated(&auth)?;
    validate_text(&payload.text)?;

    let pool = DatabaseManager::pool().await?;
    resolve_review(&pool, title_id, review_id).await?;
    let comment = comments::find(&pool, review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    require_object(Some(&actor), comment.author_id)?;

    comments::update(&pool, comment_id, &payload.text).await?;
    let comment = comments::find(&pool, review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(Json(json!({ "success": true, "data": comment })))
}

// DELETE /titles/:title_id/reviews/:review_id/comments/:id
pub async fn delete(
    Extension(auth): Extension<Option<AuthUser>>,
    Path((title_id, review_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require_authenticated(&auth)?;

    let pool = DatabaseManager::pool().await?;
    resolve_review(&pool, title_id, review_id).await?;
    let comment = comments::find(&pool, review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    require_object(Some(&actor), comment.author_id)?;

    comments::delete(&pool, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
