use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::Comment;

const COMMENT_COLUMNS: &str = "c.id, u.username AS author, c.author_id, c.review_id, \
                               c.text, c.pub_date";

pub async fn list_for_review(
    pool: &PgPool,
    review_id: Uuid,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Comment>, i64), DatabaseError> {
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments c \
         JOIN users u ON u.id = c.author_id \
         WHERE c.review_id = $1 \
         ORDER BY c.pub_date DESC OFFSET $2 LIMIT $3"
    ))
    .bind(review_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
        .bind(review_id)
        .fetch_one(pool)
        .await?;

    Ok((comments, count))
}

pub async fn create(
    pool: &PgPool,
    review_id: Uuid,
    author_id: Uuid,
    text: &str,
) -> Result<Comment, DatabaseError> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO comments (review_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(review_id)
    .bind(author_id)
    .bind(text)
    .fetch_one(pool)
    .await?;

    find(pool, review_id, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Comment not found".to_string()))
}

/// Scoped lookup: the comment must belong to the given review.
pub async fn find(
    pool: &PgPool,
    review_id: Uuid,
    comment_id: Uuid,
) -> Result<Option<Comment>, DatabaseError> {
    let comment = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments c \
         JOIN users u ON u.id = c.author_id \
         WHERE c.id = $1 AND c.review_id = $2"
    ))
    .bind(comment_id)
    .bind(review_id)
    .fetch_optional(pool)
    .await?;
    Ok(comment)
}

pub async fn update(
    pool: &PgPool,
    comment_id: Uuid,
    text: &str,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
        .bind(comment_id)
        .bind(text)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, comment_id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}
