use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{NamedSlug, TitleDetail};

/// Collection filters from the query string; slugs for taxonomy, substring
/// match on name, exact match on year.
#[derive(Debug, Default)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct TitleListRow {
    id: Uuid,
    name: String,
    year: i32,
    description: String,
    rating: Option<f64>,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    category_slug: Option<String>,
}

const SELECT_COLUMNS: &str = "t.id, t.name, t.year, t.description, \
    (SELECT ROUND(AVG(r.score)::numeric, 1)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating, \
    c.id AS category_id, c.name AS category_name, c.slug AS category_slug";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TitleFilter) {
    if let Some(category) = &filter.category {
        builder.push(" AND c.slug = ").push_bind(category.clone());
    }
    if let Some(genre) = &filter.genre {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM title_genres tg \
                 JOIN genres g ON g.id = tg.genre_id \
                 WHERE tg.title_id = t.id AND g.slug = ",
            )
            .push_bind(genre.clone())
            .push(")");
    }
    if let Some(name) = &filter.name {
        builder
            .push(" AND t.name ILIKE ")
            .push_bind(format!("%{}%", name));
    }
    if let Some(year) = filter.year {
        builder.push(" AND t.year = ").push_bind(year);
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &TitleFilter,
    offset: i64,
    limit: i64,
) -> Result<(Vec<TitleDetail>, i64), DatabaseError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {SELECT_COLUMNS} FROM titles t \
         LEFT JOIN categories c ON c.id = t.category_id WHERE TRUE"
    ));
    push_filters(&mut builder, filter);
    builder.push(" ORDER BY t.year DESC, t.name");
    builder.push(" OFFSET ").push_bind(offset);
    builder.push(" LIMIT ").push_bind(limit);

    let rows: Vec<TitleListRow> = builder.build_query_as().fetch_all(pool).await?;

    let mut count_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT COUNT(*) FROM titles t \
         LEFT JOIN categories c ON c.id = t.category_id WHERE TRUE",
    );
    push_filters(&mut count_builder, filter);
    let count: i64 = count_builder.build_query_scalar().fetch_one(pool).await?;

    let details = assemble(pool, rows).await?;
    Ok((details, count))
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<TitleDetail>, DatabaseError> {
    let row = sqlx::query_as::<_, TitleListRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM titles t \
         LEFT JOIN categories c ON c.id = t.category_id WHERE t.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(assemble(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Attach genre lists to the raw rows in one round-trip.
async fn assemble(
    pool: &PgPool,
    rows: Vec<TitleListRow>,
) -> Result<Vec<TitleDetail>, DatabaseError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut genres: HashMap<Uuid, Vec<NamedSlug>> = HashMap::new();

    if !ids.is_empty() {
        #[derive(sqlx::FromRow)]
        struct GenreLink {
            title_id: Uuid,
            id: Uuid,
            name: String,
            slug: String,
        }

        let links = sqlx::query_as::<_, GenreLink>(
            "SELECT tg.title_id, g.id, g.name, g.slug FROM title_genres tg \
             JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = ANY($1) ORDER BY g.name",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        for link in links {
            genres.entry(link.title_id).or_default().push(NamedSlug {
                id: link.id,
                name: link.name,
                slug: link.slug,
            });
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| TitleDetail {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre: genres.remove(&row.id).unwrap_or_default(),
            category: match (row.category_id, row.category_name, row.category_slug) {
                (Some(id), Some(name), Some(slug)) => Some(NamedSlug { id, name, slug }),
                _ => None,
            },
        })
        .collect())
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    year: i32,
    description: &str,
    category_id: Option<Uuid>,
    genre_ids: &[Uuid],
) -> Result<Uuid, DatabaseError> {
    let mut tx = pool.begin().await?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO titles (name, year, description, category_id) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(year)
    .bind(description)
    .bind(category_id)
    .fetch_one(&mut *tx)
    .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
            .bind(id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(id)
}

pub struct TitlePatch<'a> {
    pub name: Option<&'a str>,
    pub year: Option<i32>,
    pub description: Option<&'a str>,
    pub category_id: Option<Uuid>,
    pub genre_ids: Option<Vec<Uuid>>,
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: TitlePatch<'_>,
) -> Result<bool, DatabaseError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE titles SET \
           name = COALESCE($2, name), \
           year = COALESCE($3, year), \
           description = COALESCE($4, description), \
           category_id = COALESCE($5, category_id) \
         WHERE id = $1",
    )
    .bind(id)
    .bind(patch.name)
    .bind(patch.year)
    .bind(patch.description)
    .bind(patch.category_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    if let Some(genre_ids) = patch.genre_ids {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for genre_id in genre_ids {
            sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
                .bind(id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(true)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM titles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}
