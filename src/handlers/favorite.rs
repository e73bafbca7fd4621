//! Favorite toggle for asynchronous client updates.

use super::book::parse_id;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::models::FavoriteState;
use crate::service::ShelfService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

/// POST only. Replies with a bare `{"is_favorited", "favorite_count"}` object.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(book_id): Path<String>,
) -> Result<Json<FavoriteState>, AppError> {
    let book_id = parse_id(&book_id)?;
    let favorite = ShelfService::toggle_favorite(&state.pool, &state.tables, book_id, user).await?;
    Ok(Json(favorite))
}
