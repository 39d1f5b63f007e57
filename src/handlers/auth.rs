//! Passwordless signup and token issuance.
//!
//! Signup persists a fresh confirmation code and mails it out; the token
//! endpoint exchanges username + code for a JWT. The code stays valid
//! until the next signup overwrites it.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{code::generate_confirmation_code, generate_jwt, Claims};
use crate::database::{manager::DatabaseManager, users};
use crate::error::ApiError;
use crate::notify;
use crate::policy::Role;
use crate::validation::{validate_email, validate_username};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// POST /auth/signup
///
/// Creates the user on first contact and re-issues a code on an exact
/// (username, email) match. A partial match is an identity conflict and
/// fails as a validation error, not a server error.
pub async fn signup(Json(payload): Json<SignupRequest>) -> Result<impl IntoResponse, ApiError> {
    validate_username(&payload.username)?;
    validate_email(&payload.email)?;

    let pool = DatabaseManager::pool().await?;
    let code = generate_confirmation_code();

    let existing = users::find_by_username_or_email(&pool, &payload.username, &payload.email).await?;

    match existing.as_slice() {
        [] => {
            let new_user = users::NewUser {
                username: &payload.username,
                email: &payload.email,
                role: Role::User,
                confirmation_code: &code,
                first_name: None,
                last_name: None,
                bio: None,
            };
            match users::create(&pool, new_user).await {
                Ok(_) => {}
                // A concurrent signup may win the uniqueness race; surface
                // it exactly as the pre-check would have
                Err(e) if is_unique_violation(&e) => return Err(identity_conflict()),
                Err(e) => return Err(e.into()),
            }
        }
        [user] if user.username == payload.username && user.email == payload.email => {
            // Idempotent resend: overwrite the code, only the latest validates
            users::set_confirmation_code(&pool, user.id, &code).await?;
        }
        _ => return Err(identity_conflict()),
    }

    // Fire-and-forget: a lost mail never rolls back the persisted code
    notify::dispatch_confirmation_code(&payload.email, &code);

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "username": payload.username, "email": payload.email }
        })),
    ))
}

/// POST /auth/token
pub async fn token(Json(payload): Json<TokenRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_username(&pool, &payload.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // A user who never signed up has no code yet; an empty submission must
    // not match the empty default
    if user.confirmation_code.is_empty() || user.confirmation_code != payload.confirmation_code {
        return Err(ApiError::unauthorized("Invalid confirmation code"));
    }

    let claims = Claims::new(user.id, user.username.clone(), user.role, user.is_superuser);
    let token = generate_jwt(claims).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "token": token } })),
    ))
}

fn identity_conflict() -> ApiError {
    ApiError::validation_error(
        "A user with this username or email already exists",
        None,
    )
}

fn is_unique_violation(err: &crate::database::manager::DatabaseError) -> bool {
    match err {
        crate::database::manager::DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => {
            db_err.code().as_deref() == Some("23505")
        }
        _ => false,
    }
}
