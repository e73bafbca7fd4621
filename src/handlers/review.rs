//! Review form and creation for one book.

use super::book::parse_id;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::forms::{review_form_fields, FieldRule, ReviewForm};
use crate::models::Shelf;
use crate::response::{success_one, success_one_ok};
use crate::service::{ReviewService, ShelfService};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ReviewFormContext {
    pub book: Shelf,
    pub fields: Vec<FieldRule>,
}

pub async fn review_form(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    let book = ShelfService::get(&state.pool, &state.tables, book_id).await?;
    Ok(success_one_ok(ReviewFormContext {
        book,
        fields: review_form_fields(),
    }))
}

/// The reviewed book comes from the path and the author from the requester, never from the body.
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(book_id): Path<String>,
    body: Result<Json<ReviewForm>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let book_id = parse_id(&book_id)?;
    ShelfService::get(&state.pool, &state.tables, book_id).await?;
    let Json(form) = body?;
    let input = form.validate()?;
    let review = ReviewService::create(&state.pool, &state.tables, book_id, user, &input).await?;
    Ok(success_one(review))
}
