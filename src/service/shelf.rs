//! Shelf listing, detail, owner-gated mutation and favorites.

use super::rows::{fetch_all, fetch_count, fetch_optional, shelf_from_row, summary_from_row};
use crate::error::AppError;
use crate::forms::ShelfInput;
use crate::models::{Category, FavoriteState, Shelf, ShelfSummary, UserId};
use crate::pagination::PageInfo;
use crate::sql::{self, ShelfFilter, SortKey, Tables};
use serde::Deserialize;
use sqlx::PgPool;

/// Shelves shown in the list page ranking.
pub const RANKING_SIZE: i64 = 3;
/// Same-category suggestions on the detail page.
pub const SIMILAR_SIZE: i64 = 3;

/// Raw list query string. Every field is optional and bad values fall back to defaults.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListQuery {
    /// Blank search means no search; an unknown category means no category filter.
    pub fn filter(&self) -> ShelfFilter {
        ShelfFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            category: self.category.as_deref().and_then(|c| c.trim().parse::<Category>().ok()),
            ..Default::default()
        }
    }

    pub fn sort(&self) -> SortKey {
        SortKey::parse_lenient(self.sort.as_deref())
    }
}

/// Reject the action unless `user` owns `shelf`.
pub fn authorize_owner(shelf: &Shelf, user: UserId, action: &str) -> Result<(), AppError> {
    if shelf.is_owned_by(user) {
        return Ok(());
    }
    tracing::warn!(shelf_id = shelf.id, owner = shelf.user_id, user, action, "ownership check failed");
    Err(AppError::PermissionDenied(format!(
        "you do not have permission to {} this book",
        action
    )))
}

pub struct ShelfService;

impl ShelfService {
    /// One page of shelf summaries. The page number is clamped against the filtered count.
    pub async fn list(
        pool: &PgPool,
        tables: &Tables,
        filter: &ShelfFilter,
        sort: SortKey,
        raw_page: Option<&str>,
        per_page: u32,
    ) -> Result<(Vec<ShelfSummary>, PageInfo), AppError> {
        let count = fetch_count(pool, &sql::count_shelves(tables, filter)).await?;
        let page = PageInfo::resolve(raw_page, count, per_page);
        let q = sql::select_shelf_summaries(tables, filter, sort, page.limit(), page.offset());
        let rows = fetch_all(pool, &q).await?;
        let items = rows.iter().map(summary_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((items, page))
    }

    /// First `limit` shelves matching the filter, no page bookkeeping.
    pub async fn top(
        pool: &PgPool,
        tables: &Tables,
        filter: &ShelfFilter,
        sort: SortKey,
        limit: i64,
    ) -> Result<Vec<ShelfSummary>, AppError> {
        let q = sql::select_shelf_summaries(tables, filter, sort, limit, 0);
        let rows = fetch_all(pool, &q).await?;
        Ok(rows.iter().map(summary_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    /// Highest average rating across all shelves.
    pub async fn ranking(pool: &PgPool, tables: &Tables) -> Result<Vec<ShelfSummary>, AppError> {
        Self::top(pool, tables, &ShelfFilter::default(), SortKey::Rating, RANKING_SIZE).await
    }

    /// Best-rated other shelves in the same category.
    pub async fn similar(pool: &PgPool, tables: &Tables, shelf: &Shelf) -> Result<Vec<ShelfSummary>, AppError> {
        let filter = ShelfFilter {
            category: Some(shelf.category),
            exclude_id: Some(shelf.id),
            ..Default::default()
        };
        Self::top(pool, tables, &filter, SortKey::Rating, SIMILAR_SIZE).await
    }

    pub async fn get(pool: &PgPool, tables: &Tables, id: i64) -> Result<Shelf, AppError> {
        let row = fetch_optional(pool, &sql::select_shelf_by_id(tables, id, false))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
        Ok(shelf_from_row(&row)?)
    }

    pub async fn summary(pool: &PgPool, tables: &Tables, id: i64) -> Result<ShelfSummary, AppError> {
        let row = fetch_optional(pool, &sql::select_shelf_summary_by_id(tables, id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
        Ok(summary_from_row(&row)?)
    }

    /// Load a shelf the requester must own (for edit/delete forms).
    pub async fn get_owned(pool: &PgPool, tables: &Tables, id: i64, user: UserId, action: &str) -> Result<Shelf, AppError> {
        let shelf = Self::get(pool, tables, id).await?;
        authorize_owner(&shelf, user, action)?;
        Ok(shelf)
    }

    /// Insert a shelf owned by `owner`.
    pub async fn create(pool: &PgPool, tables: &Tables, owner: UserId, input: &ShelfInput) -> Result<Shelf, AppError> {
        let sql = sql::insert_shelf(tables);
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query(&sql)
            .bind(&input.title)
            .bind(&input.text)
            .bind(&input.thumbnail)
            .bind(input.category.as_str())
            .bind(owner)
            .fetch_one(pool)
            .await?;
        let shelf = shelf_from_row(&row)?;
        tracing::info!(shelf_id = shelf.id, user = owner, "book created");
        Ok(shelf)
    }

    /// Owner-only update. The row is locked between the ownership check and the write.
    pub async fn update(
        pool: &PgPool,
        tables: &Tables,
        id: i64,
        user: UserId,
        input: &ShelfInput,
    ) -> Result<Shelf, AppError> {
        let mut tx = pool.begin().await?;
        let row = fetch_optional(&mut *tx, &sql::select_shelf_by_id(tables, id, true))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
        authorize_owner(&shelf_from_row(&row)?, user, "edit")?;

        let sql = sql::update_shelf(tables);
        tracing::debug!(sql = %sql, "query (tx)");
        let row = sqlx::query(&sql)
            .bind(&input.title)
            .bind(&input.text)
            .bind(&input.thumbnail)
            .bind(input.category.as_str())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let shelf = shelf_from_row(&row)?;
        tx.commit().await?;
        tracing::info!(shelf_id = id, user, "book updated");
        Ok(shelf)
    }

    /// Owner-only delete. Reviews and favorites of the shelf are removed by cascade.
    pub async fn delete(pool: &PgPool, tables: &Tables, id: i64, user: UserId) -> Result<Shelf, AppError> {
        let mut tx = pool.begin().await?;
        let row = fetch_optional(&mut *tx, &sql::select_shelf_by_id(tables, id, true))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
        authorize_owner(&shelf_from_row(&row)?, user, "delete")?;

        let sql = sql::delete_shelf(tables);
        tracing::debug!(sql = %sql, "query (tx)");
        let row = sqlx::query(&sql).bind(id).fetch_one(&mut *tx).await?;
        let shelf = shelf_from_row(&row)?;
        tx.commit().await?;
        tracing::info!(shelf_id = id, user, "book deleted");
        Ok(shelf)
    }

    /// Whether `user` favorited the shelf. Anonymous requesters always read false.
    pub async fn is_favorited(pool: &PgPool, tables: &Tables, id: i64, user: Option<UserId>) -> Result<bool, AppError> {
        let Some(user) = user else {
            return Ok(false);
        };
        let sql = sql::exists_favorite(tables);
        tracing::debug!(sql = %sql, "query");
        let exists: bool = sqlx::query_scalar(&sql).bind(id).bind(user).fetch_one(pool).await?;
        Ok(exists)
    }

    /// Flip the requester's favorite on a shelf and report the new state and total count.
    pub async fn toggle_favorite(pool: &PgPool, tables: &Tables, id: i64, user: UserId) -> Result<FavoriteState, AppError> {
        let mut tx = pool.begin().await?;
        fetch_optional(&mut *tx, &sql::select_shelf_by_id(tables, id, true))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;

        let removed: Option<i64> = sqlx::query_scalar(&sql::delete_favorite(tables))
            .bind(id)
            .bind(user)
            .fetch_optional(&mut *tx)
            .await?;
        let is_favorited = if removed.is_some() {
            false
        } else {
            sqlx::query(&sql::insert_favorite(tables))
                .bind(id)
                .bind(user)
                .execute(&mut *tx)
                .await?;
            true
        };
        let favorite_count: i64 = sqlx::query_scalar(&sql::count_favorites(tables))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(shelf_id = id, user, is_favorited, favorite_count, "favorite toggled");
        Ok(FavoriteState {
            is_favorited,
            favorite_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn shelf(owner: UserId) -> Shelf {
        let now = Utc::now();
        Shelf {
            id: 1,
            title: "t".into(),
            text: "x".into(),
            thumbnail: None,
            category: Category::Life,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_passes_check() {
        assert!(authorize_owner(&shelf(3), 3, "edit").is_ok());
    }

    #[test]
    fn non_owner_is_denied() {
        let err = authorize_owner(&shelf(3), 4, "delete").unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ref m) if m.contains("delete")));
    }

    #[test]
    fn blank_search_is_no_search() {
        let blank = ListQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.filter(), ListQuery::default().filter());
        assert_eq!(blank.filter(), ShelfFilter::default());
    }

    #[test]
    fn unknown_category_is_ignored() {
        let q = ListQuery {
            category: Some("poetry".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().category, None);
        let q = ListQuery {
            category: Some("business".into()),
            search: Some(" go ".into()),
            ..Default::default()
        };
        let f = q.filter();
        assert_eq!(f.category, Some(Category::Business));
        assert_eq!(f.search.as_deref(), Some("go"));
    }

    #[test]
    fn list_query_sort_defaults_to_newest() {
        assert_eq!(ListQuery::default().sort(), SortKey::Newest);
    }
}
