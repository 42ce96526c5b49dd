use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

mod folders;
mod health;
mod middleware_auth;
mod reminders;
pub mod tasks;

pub use health::health;

use crate::routes::middleware_auth::JwtUser;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let task_router = Router::new()
        .route("/", post(tasks::routes::create).get(tasks::routes::list))
        .route(
            "/{id}",
            get(tasks::routes::get)
                .put(tasks::routes::update)
                .delete(tasks::routes::delete),
        );

    let folder_router = Router::new()
        .route("/", post(folders::routes::create).get(folders::routes::list))
        .route(
            "/{id}",
            axum::routing::put(folders::routes::update).delete(folders::routes::delete),
        );

    let reminder_router = Router::new()
        .route("/run", post(reminders::run))
        .route("/status", get(reminders::status));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .route("/me", get(me_handler))
                .nest("/tasks", task_router)
                .nest("/folders", folder_router)
                .nest("/reminders", reminder_router)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    middleware_auth::require_auth,
                )),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Task reminder API"
}

#[derive(serde::Serialize, sqlx::FromRow)]
struct Me {
    id: uuid::Uuid,
    username: String,
    email: Option<String>,
}

async fn me_handler(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
) -> Result<Json<Me>, (axum::http::StatusCode, String)> {
    let me = sqlx::query_as::<_, Me>("SELECT id, username, email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %user_id, "Failed to fetch user");
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "db error".to_string())
        })?;

    me.map(Json)
        .ok_or((axum::http::StatusCode::NOT_FOUND, "no user".to_string()))
}
