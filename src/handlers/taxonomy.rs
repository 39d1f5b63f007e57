//! Category and genre endpoints: world-readable, admin-writable, slug as
//! the external key, no update verb.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::require;
use crate::database::{
    manager::DatabaseManager,
    taxonomy::{self, TaxonomyTable},
};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{Page, Pagination};
use crate::policy::{Action, ResourceKind};
use crate::validation::{validate_name, validate_slug};

// Query/urlencoded cannot flatten numeric fields, so pagination params are
// inlined here
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl ListParams {
    fn page(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePayload {
    pub name: String,
    pub slug: String,
}

fn kind(table: TaxonomyTable) -> ResourceKind {
    match table {
        TaxonomyTable::Categories => ResourceKind::Category,
        TaxonomyTable::Genres => ResourceKind::Genre,
    }
}

async fn list_impl(table: TaxonomyTable, params: ListParams) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let page = params.page();
    let (results, count) = taxonomy::list(
        &pool,
        table,
        params.search.as_deref(),
        page.offset(),
        page.limit(),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "data": Page { count, results }
    })))
}

async fn create_impl(
    table: TaxonomyTable,
    auth: Option<AuthUser>,
    payload: CreatePayload,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Create, kind(table))?;
    validate_name(&payload.name)?;
    validate_slug(&payload.slug)?;

    let pool = DatabaseManager::pool().await?;
    let created = taxonomy::create(&pool, table, &payload.name, &payload.slug).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

async fn delete_impl(
    table: TaxonomyTable,
    auth: Option<AuthUser>,
    slug: String,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Delete, kind(table))?;

    let pool = DatabaseManager::pool().await?;
    if !taxonomy::delete_by_slug(&pool, table, &slug).await? {
        return Err(ApiError::not_found(format!("Slug '{}' not found", slug)));
    }

    Ok(StatusCode::NO_CONTENT)
}

// GET /categories
pub async fn categories_list(Query(params): Query<ListParams>) -> Result<impl IntoResponse, ApiError> {
    list_impl(TaxonomyTable::Categories, params).await
}

// POST /categories
pub async fn categories_create(
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<CreatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    create_impl(TaxonomyTable::Categories, auth, payload).await
}

// DELETE /categories/:slug
pub async fn categories_delete(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    delete_impl(TaxonomyTable::Categories, auth, slug).await
}

// GET /genres
pub async fn genres_list(Query(params): Query<ListParams>) -> Result<impl IntoResponse, ApiError> {
    list_impl(TaxonomyTable::Genres, params).await
}

// POST /genres
pub async fn genres_create(
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<CreatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    create_impl(TaxonomyTable::Genres, auth, payload).await
}

// DELETE /genres/:slug
pub async fn genres_delete(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    delete_impl(TaxonomyTable::Genres, auth, slug).await
}
