use axum::{ Json, extract::State, http::StatusCode };
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
    database: bool,
    reminders_enabled: bool,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthData>) {
    let database = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let status = if database { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let health_data = HealthData {
        status: status.as_u16(),
        database,
        reminders_enabled: state.reminders.channel_configured(),
    };
    (status, Json(health_data))
}
