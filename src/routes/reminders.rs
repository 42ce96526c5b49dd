use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::routes::middleware_auth::JwtUser;
use crate::state::AppState;

/// Run a sweep now instead of waiting for the next scheduled one
pub async fn run(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(%user_id, "on-demand reminder sweep requested");

    let report = state.reminders.run_once(Utc::now()).await.map_err(|e| {
        tracing::error!(error = %e, "on-demand reminder sweep failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(report))
}

pub async fn status(
    State(state): State<AppState>,
    JwtUser(_user_id): JwtUser,
) -> impl IntoResponse {
    Json(state.reminders.status())
}
