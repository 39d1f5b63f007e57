use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::Review;

const REVIEW_COLUMNS: &str = "r.id, u.username AS author, r.author_id, r.title_id, \
                              r.text, r.score, r.pub_date";

pub async fn list_for_title(
    pool: &PgPool,
    title_id: Uuid,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Review>, i64), DatabaseError> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews r \
         JOIN users u ON u.id = r.author_id \
         WHERE r.title_id = $1 \
         ORDER BY r.pub_date DESC OFFSET $2 LIMIT $3"
    ))
    .bind(title_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
        .bind(title_id)
        .fetch_one(pool)
        .await?;

    Ok((reviews, count))
}

/// Insert relies on the UNIQUE(author_id, title_id) constraint for the
/// one-review-per-author-per-title rule; a lost race surfaces as a unique
/// violation, translated upstream.
pub async fn create(
    pool: &PgPool,
    title_id: Uuid,
    author_id: Uuid,
    text: &str,
    score: i16,
) -> Result<Review, DatabaseError> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO reviews (title_id, author_id, text, score) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(title_id)
    .bind(author_id)
    .bind(text)
    .bind(score)
    .fetch_one(pool)
    .await?;

    find(pool, title_id, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Review not found".to_string()))
}

/// Scoped lookup: the review must belong to the given title, otherwise the
/// nested path is broken and the caller reports 404.
pub async fn find(
    pool: &PgPool,
    title_id: Uuid,
    review_id: Uuid,
) -> Result<Option<Review>, DatabaseError> {
    let review = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews r \
         JOIN users u ON u.id = r.author_id \
         WHERE r.id = $1 AND r.title_id = $2"
    ))
    .bind(review_id)
    .bind(title_id)
    .fetch_optional(pool)
    .await?;
    Ok(review)
}

pub async fn update(
    pool: &PgPool,
    review_id: Uuid,
    text: Option<&str>,
    score: Option<i16>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE reviews SET text = COALESCE($2, text), score = COALESCE($3, score) WHERE id = $1",
    )
    .bind(review_id)
    .bind(text)
    .bind(score)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, review_id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(review_id)
        .execute(pool)
        .await?;
    Ok(())
}
