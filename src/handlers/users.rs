//! User administration (admin only) plus the /users/me self path.
//!
//! The self path lets any authenticated user read and edit their own
//! profile, but the role field is read-only there: a submitted role is
//! dropped, not rejected.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{require, require_authenticated};
use crate::database::{
    manager::DatabaseManager,
    users::{self, NewUser, UserPatch},
};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pagination::{Page, Pagination};
use crate::policy::{Action, ResourceKind, Role};
use crate::validation::{validate_email, validate_username};

// Query/urlencoded cannot flatten numeric fields, so pagination params are
// inlined here
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminUserCreate {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct AdminUserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct SelfUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    // Accepted but never applied on the self path
    pub role: Option<Role>,
}

// GET /users
pub async fn list(
    Extension(auth): Extension<Option<AuthUser>>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Read, ResourceKind::UserProfile)?;

    let pool = DatabaseManager::pool().await?;
    let page = Pagination {
        offset: params.offset,
        limit: params.limit,
    };
    let (results, count) =
        users::list(&pool, params.search.as_deref(), page.offset(), page.limit()).await?;

    Ok(Json(json!({
        "success": true,
        "data": Page { count, results }
    })))
}

// POST /users
pub async fn create(
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<AdminUserCreate>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Create, ResourceKind::UserProfile)?;
    validate_username(&payload.username)?;
    validate_email(&payload.email)?;

    let pool = DatabaseManager::pool().await?;
    // Single INSERT: a failure cannot strand a half-written profile. No
    // confirmation code yet; the user gets one at their first signup.
    let user = users::create(
        &pool,
        NewUser {
            username: &payload.username,
            email: &payload.email,
            role: payload.role.unwrap_or_default(),
            confirmation_code: "",
            first_name: payload.first_name.as_deref(),
            last_name: payload.last_name.as_deref(),
            bio: payload.bio.as_deref(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": user })),
    ))
}

// GET /users/me
pub async fn me(
    Extension(auth): Extension<Option<AuthUser>>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require_authenticated(&auth)?;

    let pool = DatabaseManager::pool().await?;
    let user = users::find_by_id(&pool, actor.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "success": true, "data": user })))
}

// PATCH /users/me
pub async fn me_update(
    Extension(auth): Extension<Option<AuthUser>>,
    Json(payload): Json<SelfUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = require_authenticated(&auth)?;

    if let Some(username) = &payload.username {
        validate_username(username)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if payload.role.is_some() {
        tracing::debug!(user = %actor.username, "role field ignored on self path");
    }

    let pool = DatabaseManager::pool().await?;
    let user = users::update(
        &pool,
        actor.id,
        UserPatch {
            username: payload.username.as_deref(),
            email: payload.email.as_deref(),
            first_name: payload.first_name.as_deref(),
            last_name: payload.last_name.as_deref(),
            bio: payload.bio.as_deref(),
            role: None,
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": user })))
}

// GET /users/:username
pub async fn get(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Read, ResourceKind::UserProfile)?;

    let pool = DatabaseManager::pool().await?;
    let user = users::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))?;

    Ok(Json(json!({ "success": true, "data": user })))
}

// PATCH /users/:username
pub async fn update(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(username): Path<String>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Update, ResourceKind::UserProfile)?;

    if let Some(new_username) = &payload.username {
        validate_username(new_username)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }

    let pool = DatabaseManager::pool().await?;
    let user = users::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))?;

    let user = users::update(
        &pool,
        user.id,
        UserPatch {
            username: payload.username.as_deref(),
            email: payload.email.as_deref(),
            first_name: payload.first_name.as_deref(),
            last_name: payload.last_name.as_deref(),
            bio: payload.bio.as_deref(),
            role: payload.role,
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": user })))
}

// DELETE /users/:username
pub async fn delete(
    Extension(auth): Extension<Option<AuthUser>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require(&auth, Action::Delete, ResourceKind::UserProfile)?;

    let pool = DatabaseManager::pool().await?;
    if !users::delete_by_username(&pool, &username).await? {
        return Err(ApiError::not_found(format!("User '{}' not found", username)));
    }

    Ok(StatusCode::NO_CONTENT)
}
