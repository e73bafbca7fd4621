//! Book, review, favorite and dashboard routes.

use crate::handlers::{
    create, create_form, create_review, dashboard, delete as delete_handler, delete_confirm, detail,
    favorites, list, review_form, toggle_favorite, update, update_form,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn book_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/book/:id/detail", get(detail))
        .route("/book/create", get(create_form).post(create))
        .route("/book/:id/delete", get(delete_confirm).post(delete_handler))
        .route("/book/:id/update", get(update_form).post(update))
        .route("/book/:book_id/review", get(review_form).post(create_review))
        .route("/dashboard", get(dashboard))
        .route("/favorites", get(favorites))
        .route("/book/:book_id/toggle-favorite", post(toggle_favorite))
        .with_state(state)
}
