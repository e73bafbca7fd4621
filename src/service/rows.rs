//! Row decoding and parameter binding shared by the services.

use crate::error::AppError;
use crate::models::{Category, Review, Shelf, ShelfSummary};
use crate::sql::QueryBuf;
use sqlx::postgres::PgRow;
use sqlx::Row;

pub(crate) async fn fetch_all<'c, E>(exec: E, q: &QueryBuf) -> Result<Vec<PgRow>, AppError>
where
    E: sqlx::PgExecutor<'c>,
{
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_all(exec).await?)
}

pub(crate) async fn fetch_optional<'c, E>(exec: E, q: &QueryBuf) -> Result<Option<PgRow>, AppError>
where
    E: sqlx::PgExecutor<'c>,
{
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_optional(exec).await?)
}

pub(crate) async fn fetch_count<'c, E>(exec: E, q: &QueryBuf) -> Result<i64, AppError>
where
    E: sqlx::PgExecutor<'c>,
{
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_one(exec).await?)
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    let raw: String = row.try_get("category")?;
    raw.parse::<Category>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "category".into(),
        source: e.into(),
    })
}

pub(crate) fn shelf_from_row(row: &PgRow) -> Result<Shelf, sqlx::Error> {
    Ok(Shelf {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        thumbnail: row.try_get("thumbnail")?,
        category: category_from_row(row)?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn summary_from_row(row: &PgRow) -> Result<ShelfSummary, sqlx::Error> {
    Ok(ShelfSummary {
        shelf: shelf_from_row(row)?,
        average_rating: row.try_get("average_rating")?,
        review_count: row.try_get("review_count")?,
        favorite_count: row.try_get("favorite_count")?,
    })
}

pub(crate) fn review_from_row(row: &PgRow) -> Result<Review, sqlx::Error> {
    Ok(Review {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        rate: row.try_get("rate")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}
