//! Review creation and listing. Reviews have no update or delete path.

use super::rows::review_from_row;
use super::shelf::ShelfService;
use crate::error::AppError;
use crate::forms::ReviewInput;
use crate::models::{Review, UserId};
use crate::pagination::PageInfo;
use crate::sql::{self, Tables};
use sqlx::PgPool;

pub struct ReviewService;

impl ReviewService {
    /// Insert a review of `book_id` authored by `author`. 404 when the book does not exist.
    pub async fn create(
        pool: &PgPool,
        tables: &Tables,
        book_id: i64,
        author: UserId,
        input: &ReviewInput,
    ) -> Result<Review, AppError> {
        ShelfService::get(pool, tables, book_id).await?;
        let sql = sql::insert_review(tables);
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query(&sql)
            .bind(book_id)
            .bind(&input.title)
            .bind(&input.text)
            .bind(input.rate)
            .bind(author)
            .fetch_one(pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    AppError::NotFound(format!("book {}", book_id))
                }
                other => AppError::Db(other),
            })?;
        let review = review_from_row(&row)?;
        tracing::info!(review_id = review.id, book_id, user = author, rate = review.rate, "review created");
        Ok(review)
    }

    /// One page of a book's reviews, newest first.
    pub async fn list_for_book(
        pool: &PgPool,
        tables: &Tables,
        book_id: i64,
        raw_page: Option<&str>,
        per_page: u32,
    ) -> Result<(Vec<Review>, PageInfo), AppError> {
        let count = Self::count_by(pool, tables, "book_id", book_id).await?;
        let page = PageInfo::resolve(raw_page, count, per_page);
        let reviews = Self::select_by(pool, tables, "book_id", book_id, page.limit(), page.offset()).await?;
        Ok((reviews, page))
    }

    pub async fn recent_by_user(pool: &PgPool, tables: &Tables, user: UserId, limit: i64) -> Result<Vec<Review>, AppError> {
        Self::select_by(pool, tables, "user_id", user, limit, 0).await
    }

    pub async fn count_by_user(pool: &PgPool, tables: &Tables, user: UserId) -> Result<i64, AppError> {
        Self::count_by(pool, tables, "user_id", user).await
    }

    async fn select_by(
        pool: &PgPool,
        tables: &Tables,
        column: &'static str,
        value: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError> {
        let sql = sql::select_reviews_by(tables, column);
        tracing::debug!(sql = %sql, value, limit, offset, "query");
        let rows = sqlx::query(&sql)
            .bind(value)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(review_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn count_by(pool: &PgPool, tables: &Tables, column: &'static str, value: i64) -> Result<i64, AppError> {
        let sql = sql::count_reviews_by(tables, column);
        tracing::debug!(sql = %sql, value, "query");
        Ok(sqlx::query_scalar(&sql).bind(value).fetch_one(pool).await?)
    }
}
