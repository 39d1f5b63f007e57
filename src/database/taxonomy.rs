use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::NamedSlug;

/// Categories and genres share one schema shape and one set of queries.
/// The table name comes from this closed enum, never from request input.
#[derive(Debug, Clone, Copy)]
pub enum TaxonomyTable {
    Categories,
    Genres,
}

impl TaxonomyTable {
    pub fn table(self) -> &'static str {
        match self {
            TaxonomyTable::Categories => "categories",
            TaxonomyTable::Genres => "genres",
        }
    }
}

pub async fn list(
    pool: &PgPool,
    table: TaxonomyTable,
    search: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<NamedSlug>, i64), DatabaseError> {
    let pattern = search.map(|s| format!("%{}%", s));

    let rows = sqlx::query_as::<_, NamedSlug>(&format!(
        "SELECT id, name, slug FROM {} \
         WHERE ($1::text IS NULL OR name ILIKE $1) \
         ORDER BY name OFFSET $2 LIMIT $3",
        table.table()
    ))
    .bind(pattern.as_deref())
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE ($1::text IS NULL OR name ILIKE $1)",
        table.table()
    ))
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;

    Ok((rows, count))
}

pub async fn create(
    pool: &PgPool,
    table: TaxonomyTable,
    name: &str,
    slug: &str,
) -> Result<NamedSlug, DatabaseError> {
    let row = sqlx::query_as::<_, NamedSlug>(&format!(
        "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        table.table()
    ))
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_slug(
    pool: &PgPool,
    table: TaxonomyTable,
    slug: &str,
) -> Result<Option<NamedSlug>, DatabaseError> {
    let row = sqlx::query_as::<_, NamedSlug>(&format!(
        "SELECT id, name, slug FROM {} WHERE slug = $1",
        table.table()
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete_by_slug(
    pool: &PgPool,
    table: TaxonomyTable,
    slug: &str,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE slug = $1", table.table()))
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
