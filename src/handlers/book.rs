//! Book handlers: list, detail, create, owner-only update/delete, favorites list.

use crate::error::AppError;
use crate::extractors::{CurrentUser, LenientQuery, MaybeUser};
use crate::forms::{shelf_form_fields, FieldRule, ShelfForm};
use crate::models::{category_choices, Choice, Review, Shelf, ShelfSummary};
use crate::pagination::{BOOKS_PER_PAGE, REVIEWS_PER_PAGE};
use crate::response::{success_one, success_one_ok, success_page, PageOf};
use crate::service::{ListQuery, ReviewService, ShelfService};
use crate::sql::{ShelfFilter, SortKey};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

/// Path ids that are not integers cannot name a record.
pub(crate) fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("book {}", id_str)))
}

#[derive(Serialize)]
pub struct ListContext {
    pub ranking: Vec<ShelfSummary>,
    pub categories: Vec<Choice>,
    pub search_query: String,
    pub selected_category: String,
    pub sort_by: &'static str,
}

pub async fn list(
    State(state): State<AppState>,
    LenientQuery(query): LenientQuery<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.filter();
    let sort = query.sort();
    let (items, page) = ShelfService::list(
        &state.pool,
        &state.tables,
        &filter,
        sort,
        query.page.as_deref(),
        BOOKS_PER_PAGE,
    )
    .await?;
    let context = ListContext {
        ranking: ShelfService::ranking(&state.pool, &state.tables).await?,
        categories: category_choices(),
        search_query: query.search.unwrap_or_default(),
        selected_category: query.category.unwrap_or_default(),
        sort_by: sort.as_str(),
    };
    Ok(success_page(items, page, Some(context)))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct BookDetail {
    pub book: ShelfSummary,
    pub reviews: PageOf<Review>,
    pub similar_books: Vec<ShelfSummary>,
    pub is_favorited: bool,
}

pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id_str): Path<String>,
    LenientQuery(query): LenientQuery<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let book = ShelfService::summary(&state.pool, &state.tables, id).await?;
    let (items, page) = ReviewService::list_for_book(
        &state.pool,
        &state.tables,
        id,
        query.page.as_deref(),
        REVIEWS_PER_PAGE,
    )
    .await?;
    let similar_books = ShelfService::similar(&state.pool, &state.tables, &book.shelf).await?;
    let is_favorited = ShelfService::is_favorited(&state.pool, &state.tables, id, user).await?;
    Ok(success_one_ok(BookDetail {
        book,
        reviews: PageOf { items, page },
        similar_books,
        is_favorited,
    }))
}

/// Form context: the fields to render and, for edits, the current values.
#[derive(Serialize)]
pub struct BookFormContext {
    pub fields: Vec<FieldRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<Shelf>,
}

pub async fn create_form(CurrentUser(_user): CurrentUser) -> impl IntoResponse {
    success_one_ok(BookFormContext {
        fields: shelf_form_fields(),
        initial: None,
    })
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<ShelfForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(form) = body?;
    let input = form.validate()?;
    let shelf = ShelfService::create(&state.pool, &state.tables, user, &input).await?;
    Ok(success_one(shelf))
}

pub async fn update_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let shelf = ShelfService::get_owned(&state.pool, &state.tables, id, user, "edit").await?;
    Ok(success_one_ok(BookFormContext {
        fields: shelf_form_fields(),
        initial: Some(shelf),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id_str): Path<String>,
    body: Result<Json<ShelfForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    // Ownership is checked before the body is decoded.
    ShelfService::get_owned(&state.pool, &state.tables, id, user, "edit").await?;
    let Json(form) = body?;
    let input = form.validate()?;
    let shelf = ShelfService::update(&state.pool, &state.tables, id, user, &input).await?;
    Ok(success_one_ok(shelf))
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let shelf = ShelfService::get_owned(&state.pool, &state.tables, id, user, "delete").await?;
    Ok(success_one_ok(shelf))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let shelf = ShelfService::delete(&state.pool, &state.tables, id, user).await?;
    Ok(success_one_ok(shelf))
}

pub async fn favorites(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    LenientQuery(query): LenientQuery<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ShelfFilter {
        favorited_by: Some(user),
        ..Default::default()
    };
    let (items, page) = ShelfService::list(
        &state.pool,
        &state.tables,
        &filter,
        SortKey::Newest,
        query.page.as_deref(),
        BOOKS_PER_PAGE,
    )
    .await?;
    Ok(success_page(items, page, None::<()>))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_id_is_not_found() {
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound(_))));
        assert_eq!(parse_id("17").unwrap(), 17);
    }
}
