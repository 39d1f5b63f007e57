//! Title endpoints: world-readable, admin-writable. Writes take category
//! and genres by slug; reads embed the taxonomy objects and the derived
//! rating.

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

use super::require;
use crate::database::{
    manager::DatabaseManager,
    taxonomy::{self, TaxonomyTable},
    titles::{self, TitleFilter, TitlePatch},
};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{Page, Pagination};
use crate::policy::{Action, ResourceKind};
use crate::validation::{validate_name, validate_year};

// Query/urlencoded cannot flatten numeric fields, so pagination params are
// inlined here
#[derive(Debug, Deserialize)]
pub struct TitleListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TitleCreate {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleUpdate {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

async fn resolve_category(pool: &PgPool, slug: &str) -> Result<Uuid, ApiError> {
    taxonomy::find_by_slug(pool, TaxonomyTable::Categories, slug)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| ApiError::field_error("category", format!("Unknown category '{}'", slug)))
}

async fn resolve_genres(pool: &PgPool, slugs: &[String]) -> Result<Vec<Uuid>, ApiError> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let genre = taxonomy::find_by_slug(pool, TaxonomyTable::Genres, slug)
            .await?
            .ok_or_else(|| ApiError::field_error("genre", format!("Unknown genre '{}'", slug)))?;
        ids.push(genre.id);
    }
    Ok(ids)
}

// GET /titles
pub async fn list(Query(params): Query<TitleListParams>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let page = Pagination {
        offset: params.offset,
        limit: params.limit,
    };
    let filter = TitleFilter {
        category: params.category,
        genre: params.genre,
        name: params.name,
        year: params.year,
    };
    let (results, count) = titles::list(&pool, &filter, page.offset(), page.limit()).await?;

    Ok(Json(json!({
        "success": true,
        "data": Page { count, results }
    })))
}

// POST /titles
pub async fn create(
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<TitleCreate>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Create, ResourceKind::Title)?;
    validate_name(&payload.name)?;
    validate_year(payload.year)?;

    let pool = DatabaseManager::pool().await?;
    let category_id = match payload.category.as_deref() {
        Some(slug) => Some(resolve_category(&pool, slug).await?),
        None => None,
    };
    let genre_ids = resolve_genres(&pool, &payload.genre).await?;

    let id = titles::create(
        &pool,
        &payload.name,
        payload.year,
        &payload.description,
        category_id,
        &genre_ids,
    )
    .await?;

    let detail = titles::get(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Title not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": detail })),
    ))
}

// GET /titles/:id
pub async fn get(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let detail = titles::get(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Title not found"))?;

    Ok(Json(json!({ "success": true, "data": detail })))
}

// PATCH /titles/:id
pub async fn update(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TitleUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Update, ResourceKind::Title)?;

    if let Some(name) = &payload.name {
        validate_name(name)?;
    }
    if let Some(year) = payload.year {
        validate_year(year)?;
    }

    let pool = DatabaseManager::pool().await?;
    let category_id = match payload.category.as_deref() {
        Some(slug) => Some(resolve_category(&pool, slug).await?),
        None => None,
    };
    let genre_ids = match &payload.genre {
        Some(slugs) => Some(resolve_genres(&pool, slugs).await?),
        None => None,
    };

    let patch = TitlePatch {
        name: payload.name.as_deref(),
        year: payload.year,
        description: payload.description.as_deref(),
        category_id,
        genre_ids,
    };
    if !titles::update(&pool, id, patch).await? {
        return Err(ApiError::not_found("Title not found"));
    }

    let detail = titles::get(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Title not found"))?;

    Ok(Json(json!({ "success": true, "data": detail })))
}

// DELETE /titles/:id
pub async fn delete(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Delete, ResourceKind::Title)?;

    let pool = DatabaseManager::pool().await?;
    if !titles::delete(&pool, id).await? {
        return Err(ApiError::not_found("Title not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
