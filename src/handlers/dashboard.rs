use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::success_one_ok;
use crate::service::DashboardService;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = DashboardService::for_user(&state.pool, &state.tables, user).await?;
    Ok(success_one_ok(stats))
}
