//! Per-requester statistics. Read-only.

use super::review::ReviewService;
use super::shelf::ShelfService;
use crate::error::AppError;
use crate::models::{Category, CategoryCount, Dashboard, UserId};
use crate::sql::{self, ShelfFilter, SortKey, Tables};
use sqlx::PgPool;

/// Length of each recent/favorite list on the dashboard.
pub const DASHBOARD_ITEMS: i64 = 5;

/// One entry per category in declaration order; categories absent from `rows` count zero.
/// Rows with an unrecognized category value are dropped.
pub fn fill_category_counts(rows: &[(String, i64)]) -> Vec<CategoryCount> {
    Category::ALL
        .iter()
        .map(|c| CategoryCount {
            category: *c,
            label: c.label(),
            count: rows
                .iter()
                .filter(|(name, _)| name == c.as_str())
                .map(|(_, n)| *n)
                .sum(),
        })
        .collect()
}

pub struct DashboardService;

impl DashboardService {
    pub async fn for_user(pool: &PgPool, tables: &Tables, user: UserId) -> Result<Dashboard, AppError> {
        let own = ShelfFilter {
            owner: Some(user),
            ..Default::default()
        };
        let favorited = ShelfFilter {
            favorited_by: Some(user),
            ..Default::default()
        };

        let total_books = {
            let q = sql::count_shelves(tables, &own);
            super::rows::fetch_count(pool, &q).await?
        };
        let total_reviews = ReviewService::count_by_user(pool, tables, user).await?;
        let favorite_books = ShelfService::top(pool, tables, &favorited, SortKey::Newest, DASHBOARD_ITEMS).await?;
        let recent_books = ShelfService::top(pool, tables, &own, SortKey::Newest, DASHBOARD_ITEMS).await?;
        let recent_reviews = ReviewService::recent_by_user(pool, tables, user, DASHBOARD_ITEMS).await?;

        let sql = sql::count_shelves_by_category(tables);
        tracing::debug!(sql = %sql, user, "query");
        let rows: Vec<(String, i64)> = sqlx::query_as(&sql).bind(user).fetch_all(pool).await?;

        Ok(Dashboard {
            total_books,
            total_reviews,
            favorite_books,
            recent_books,
            recent_reviews,
            category_stats: fill_category_counts(&rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_categories_are_zero_filled_in_order() {
        let stats = fill_category_counts(&[("hobby".into(), 2), ("business".into(), 1)]);
        let counts: Vec<_> = stats.iter().map(|s| (s.category, s.count)).collect();
        assert_eq!(
            counts,
            vec![
                (Category::Business, 1),
                (Category::Life, 0),
                (Category::Hobby, 2),
                (Category::Other, 0),
            ]
        );
        assert_eq!(stats[2].label, "Hobby");
    }

    #[test]
    fn unknown_category_rows_are_dropped() {
        let stats = fill_category_counts(&[("poetry".into(), 9)]);
        assert!(stats.iter().all(|s| s.count == 0));
        assert_eq!(stats.len(), Category::ALL.len());
    }
}
