//! Builds parameterized SELECT/INSERT/UPDATE/DELETE for shelves, reviews and favorites.
//! Identifiers come from validated settings only; all user input is bound as parameters.

use crate::models::{Category, UserId};
use crate::sql::BindValue;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Schema-qualified names of the three tables.
#[derive(Clone, Debug)]
pub struct Tables {
    pub schema: String,
    pub shelf: String,
    pub review: String,
    pub favorites: String,
}

impl Tables {
    pub fn new(schema: &str) -> Self {
        Tables {
            schema: quoted(schema),
            shelf: qualified_table(schema, "shelf"),
            review: qualified_table(schema, "review"),
            favorites: qualified_table(schema, "shelf_favorites"),
        }
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// Ordering for shelf lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Title,
    Rating,
}

impl SortKey {
    /// Unknown or missing keys fall back to newest.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => SortKey::Oldest,
            Some("title") => SortKey::Title,
            Some("rating") => SortKey::Rating,
            _ => SortKey::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Title => "title",
            SortKey::Rating => "rating",
        }
    }

    /// Every ordering ends on the primary key so pagination is deterministic.
    fn order_clause(&self) -> &'static str {
        match self {
            SortKey::Newest => "s.\"created_at\" DESC, s.\"id\" DESC",
            SortKey::Oldest => "s.\"created_at\" ASC, s.\"id\" ASC",
            SortKey::Title => "s.\"title\" ASC, s.\"id\" ASC",
            SortKey::Rating => "\"average_rating\" DESC, s.\"created_at\" DESC, s.\"id\" DESC",
        }
    }
}

/// Conditions for shelf lists; all optional and combined with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShelfFilter {
    /// Case-insensitive substring over title, text and category.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub owner: Option<UserId>,
    pub favorited_by: Option<UserId>,
    pub exclude_id: Option<i64>,
}

/// Escape LIKE metacharacters so the search term matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

const SHELF_COLUMNS: &str =
    "s.\"id\", s.\"title\", s.\"text\", s.\"thumbnail\", s.\"category\", s.\"user_id\", s.\"created_at\", s.\"updated_at\"";

const REVIEW_COLUMNS: &str =
    "\"id\", \"book_id\", \"title\", \"text\", \"rate\", \"user_id\", \"created_at\"";

fn where_clause(q: &mut QueryBuf, tables: &Tables, filter: &ShelfFilter) -> String {
    let mut parts = Vec::new();
    if let Some(term) = filter.search.as_deref() {
        let n = q.push_param(BindValue::Text(like_pattern(term)));
        parts.push(format!(
            "(s.\"title\" ILIKE ${n} OR s.\"text\" ILIKE ${n} OR s.\"category\" ILIKE ${n})"
        ));
    }
    if let Some(category) = filter.category {
        let n = q.push_param(BindValue::Text(category.as_str().to_string()));
        parts.push(format!("s.\"category\" = ${}", n));
    }
    if let Some(owner) = filter.owner {
        let n = q.push_param(BindValue::I64(owner));
        parts.push(format!("s.\"user_id\" = ${}", n));
    }
    if let Some(user) = filter.favorited_by {
        let n = q.push_param(BindValue::I64(user));
        parts.push(format!(
            "EXISTS (SELECT 1 FROM {} f WHERE f.\"shelf_id\" = s.\"id\" AND f.\"user_id\" = ${})",
            tables.favorites, n
        ));
    }
    if let Some(id) = filter.exclude_id {
        let n = q.push_param(BindValue::I64(id));
        parts.push(format!("s.\"id\" <> ${}", n));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// Shelf columns plus average rating (0 without reviews), review count and favorite count.
fn summary_columns(tables: &Tables) -> String {
    format!(
        "{cols}, \
         (SELECT COALESCE(AVG(r.\"rate\"), 0)::float8 FROM {review} r WHERE r.\"book_id\" = s.\"id\") AS \"average_rating\", \
         (SELECT COUNT(*) FROM {review} r WHERE r.\"book_id\" = s.\"id\") AS \"review_count\", \
         (SELECT COUNT(*) FROM {fav} f WHERE f.\"shelf_id\" = s.\"id\") AS \"favorite_count\"",
        cols = SHELF_COLUMNS,
        review = tables.review,
        fav = tables.favorites,
    )
}

/// SELECT COUNT(*) of shelves matching the filter.
pub fn count_shelves(tables: &Tables, filter: &ShelfFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, tables, filter);
    q.sql = format!("SELECT COUNT(*) FROM {} s{}", tables.shelf, where_sql);
    q
}

/// SELECT shelf summaries matching the filter, sorted, with LIMIT/OFFSET.
pub fn select_shelf_summaries(
    tables: &Tables,
    filter: &ShelfFilter,
    sort: SortKey,
    limit: i64,
    offset: i64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, tables, filter);
    let limit_n = q.push_param(BindValue::I64(limit.max(0)));
    let offset_n = q.push_param(BindValue::I64(offset.max(0)));
    q.sql = format!(
        "SELECT {} FROM {} s{} ORDER BY {} LIMIT ${} OFFSET ${}",
        summary_columns(tables),
        tables.shelf,
        where_sql,
        sort.order_clause(),
        limit_n,
        offset_n
    );
    q
}

/// SELECT one shelf summary by id.
pub fn select_shelf_summary_by_id(tables: &Tables, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::I64(id));
    q.sql = format!(
        "SELECT {} FROM {} s WHERE s.\"id\" = ${}",
        summary_columns(tables),
        tables.shelf,
        n
    );
    q
}

/// SELECT one plain shelf by id, optionally locking the row for the rest of the transaction.
pub fn select_shelf_by_id(tables: &Tables, id: i64, for_update: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(BindValue::I64(id));
    let lock = if for_update { " FOR UPDATE" } else { "" };
    q.sql = format!(
        "SELECT {} FROM {} s WHERE s.\"id\" = ${}{}",
        SHELF_COLUMNS, tables.shelf, n, lock
    );
    q
}

/// INSERT a shelf; values bound in order title, text, thumbnail, category, user_id.
pub fn insert_shelf(tables: &Tables) -> String {
    format!(
        "INSERT INTO {} AS s (\"title\", \"text\", \"thumbnail\", \"category\", \"user_id\") \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        tables.shelf, SHELF_COLUMNS
    )
}

/// UPDATE editable shelf fields and bump updated_at; owner is never touched.
/// Values bound in order title, text, thumbnail, category, id.
pub fn update_shelf(tables: &Tables) -> String {
    format!(
        "UPDATE {} AS s SET \"title\" = $1, \"text\" = $2, \"thumbnail\" = $3, \"category\" = $4, \
         \"updated_at\" = NOW() WHERE s.\"id\" = $5 RETURNING {}",
        tables.shelf, SHELF_COLUMNS
    )
}

/// DELETE a shelf by id. Reviews and favorites go with it through ON DELETE CASCADE.
pub fn delete_shelf(tables: &Tables) -> String {
    format!(
        "DELETE FROM {} AS s WHERE s.\"id\" = $1 RETURNING {}",
        tables.shelf, SHELF_COLUMNS
    )
}

/// INSERT a review; values bound in order book_id, title, text, rate, user_id.
pub fn insert_review(tables: &Tables) -> String {
    format!(
        "INSERT INTO {} (\"book_id\", \"title\", \"text\", \"rate\", \"user_id\") \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        tables.review, REVIEW_COLUMNS
    )
}

/// Reviews are always read newest first.
pub fn select_reviews_by(tables: &Tables, column: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT $2 OFFSET $3",
        REVIEW_COLUMNS,
        tables.review,
        quoted(column)
    )
}

pub fn count_reviews_by(tables: &Tables, column: &str) -> String {
    format!("SELECT COUNT(*) FROM {} WHERE {} = $1", tables.review, quoted(column))
}

/// Remove the (shelf_id, user_id) favorite; RETURNING tells whether a row existed.
pub fn delete_favorite(tables: &Tables) -> String {
    format!(
        "DELETE FROM {} WHERE \"shelf_id\" = $1 AND \"user_id\" = $2 RETURNING \"shelf_id\"",
        tables.favorites
    )
}

pub fn insert_favorite(tables: &Tables) -> String {
    format!(
        "INSERT INTO {} (\"shelf_id\", \"user_id\") VALUES ($1, $2) ON CONFLICT DO NOTHING",
        tables.favorites
    )
}

pub fn exists_favorite(tables: &Tables) -> String {
    format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE \"shelf_id\" = $1 AND \"user_id\" = $2)",
        tables.favorites
    )
}

pub fn count_favorites(tables: &Tables) -> String {
    format!("SELECT COUNT(*) FROM {} WHERE \"shelf_id\" = $1", tables.favorites)
}

/// Per-category shelf counts for one owner. Categories without shelves are absent.
pub fn count_shelves_by_category(tables: &Tables) -> String {
    format!(
        "SELECT \"category\", COUNT(*) FROM {} WHERE \"user_id\" = $1 GROUP BY \"category\"",
        tables.shelf
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Tables {
        Tables::new("bookshelf")
    }

    #[test]
    fn tables_are_schema_qualified() {
        let t = tables();
        assert_eq!(t.shelf, "\"bookshelf\".\"shelf\"");
        assert_eq!(t.favorites, "\"bookshelf\".\"shelf_favorites\"");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("rust"), "%rust%");
    }

    #[test]
    fn sort_key_falls_back_to_newest() {
        assert_eq!(SortKey::parse_lenient(None), SortKey::Newest);
        assert_eq!(SortKey::parse_lenient(Some("bogus")), SortKey::Newest);
        assert_eq!(SortKey::parse_lenient(Some("rating")), SortKey::Rating);
        assert_eq!(SortKey::parse_lenient(Some("oldest")).as_str(), "oldest");
    }

    #[test]
    fn unfiltered_list_has_no_where() {
        let q = select_shelf_summaries(&tables(), &ShelfFilter::default(), SortKey::Newest, 12, 0);
        assert!(q.sql.contains("FROM \"bookshelf\".\"shelf\" s ORDER BY "));
        assert!(!q.sql.contains(" s WHERE "));
        assert!(q.sql.contains("ORDER BY s.\"created_at\" DESC, s.\"id\" DESC LIMIT $1 OFFSET $2"));
        assert_eq!(q.params, vec![BindValue::I64(12), BindValue::I64(0)]);
    }

    #[test]
    fn search_and_category_combine_with_and() {
        let filter = ShelfFilter {
            search: Some("rust".into()),
            category: Some(Category::Hobby),
            ..Default::default()
        };
        let q = select_shelf_summaries(&tables(), &filter, SortKey::Title, 12, 12);
        assert!(q.sql.contains(
            "WHERE (s.\"title\" ILIKE $1 OR s.\"text\" ILIKE $1 OR s.\"category\" ILIKE $1) AND s.\"category\" = $2"
        ));
        assert!(q.sql.contains("ORDER BY s.\"title\" ASC, s.\"id\" ASC LIMIT $3 OFFSET $4"));
        assert_eq!(
            q.params,
            vec![
                BindValue::Text("%rust%".into()),
                BindValue::Text("hobby".into()),
                BindValue::I64(12),
                BindValue::I64(12),
            ]
        );
    }

    #[test]
    fn rating_sort_uses_zero_filled_average() {
        let q = select_shelf_summaries(&tables(), &ShelfFilter::default(), SortKey::Rating, 3, 0);
        assert!(q.sql.contains("COALESCE(AVG(r.\"rate\"), 0)::float8"));
        assert!(q.sql.contains("ORDER BY \"average_rating\" DESC"));
    }

    #[test]
    fn count_shares_filter_params_with_list() {
        let filter = ShelfFilter {
            owner: Some(5),
            favorited_by: Some(6),
            exclude_id: Some(7),
            ..Default::default()
        };
        let count = count_shelves(&tables(), &filter);
        assert_eq!(
            count.params,
            vec![BindValue::I64(5), BindValue::I64(6), BindValue::I64(7)]
        );
        assert!(count.sql.starts_with("SELECT COUNT(*) FROM \"bookshelf\".\"shelf\" s WHERE"));
        assert!(count.sql.contains("f.\"user_id\" = $2"));
        assert!(count.sql.contains("s.\"id\" <> $3"));
    }

    #[test]
    fn update_never_sets_owner() {
        let sql = update_shelf(&tables());
        let set_clause = sql.split(" WHERE ").next().unwrap();
        assert!(!set_clause.contains("\"user_id\" ="));
        assert!(set_clause.contains("\"updated_at\" = NOW()"));
    }

    #[test]
    fn shelf_lock_is_optional() {
        assert!(select_shelf_by_id(&tables(), 1, true).sql.ends_with(" FOR UPDATE"));
        assert!(!select_shelf_by_id(&tables(), 1, false).sql.contains("FOR UPDATE"));
    }
}
