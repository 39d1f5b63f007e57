use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::User;
use crate::policy::Role;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, bio, \
                            role, is_superuser, confirmation_code, created_at";

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Any user colliding with the given username or email, for the signup
/// identity check.
pub async fn find_by_username_or_email(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Vec<User>, DatabaseError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2"
    ))
    .bind(username)
    .bind(email)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Insert payload. Profile fields go into the same statement as the
/// identity columns so a failed insert never leaves a partial row behind.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub role: Role,
    pub confirmation_code: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
}

pub async fn create(pool: &PgPool, new: NewUser<'_>) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, role, confirmation_code, first_name, last_name, bio) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
    ))
    .bind(new.username)
    .bind(new.email)
    .bind(new.role)
    .bind(new.confirmation_code)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.bio)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Overwrite the confirmation code; only the latest code is ever valid.
pub async fn set_confirmation_code(
    pool: &PgPool,
    user_id: Uuid,
    code: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE users SET confirmation_code = $2 WHERE id = $1")
        .bind(user_id)
        .bind(code)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<User>, i64), DatabaseError> {
    let pattern = search.map(|s| format!("%{}%", s));

    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users \
         WHERE ($1::text IS NULL OR username ILIKE $1) \
         ORDER BY username OFFSET $2 LIMIT $3"
    ))
    .bind(pattern.as_deref())
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR username ILIKE $1)",
    )
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;

    Ok((users, count))
}

/// Partial profile update. `None` fields are left untouched; role is only
/// passed on the admin path, never from /users/me.
pub struct UserPatch<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub role: Option<Role>,
}

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    patch: UserPatch<'_>,
) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
           username = COALESCE($2, username), \
           email = COALESCE($3, email), \
           first_name = COALESCE($4, first_name), \
           last_name = COALESCE($5, last_name), \
           bio = COALESCE($6, bio), \
           role = COALESCE($7, role) \
         WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(patch.username)
    .bind(patch.email)
    .bind(patch.first_name)
    .bind(patch.last_name)
    .bind(patch.bio)
    .bind(patch.role)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn delete_by_username(pool: &PgPool, username: &str) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
