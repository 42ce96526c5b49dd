use axum::{Json, extract::{State, Path, Query}, http::StatusCode, response::IntoResponse};
use uuid::Uuid;
use crate::state::AppState;
use crate::routes::middleware_auth::JwtUser;
use super::dto::{CreateTask, ListTasksQuery, UpdateTask};
use super::{queries, validate_create, validate_update};

// Rejects a folder_id the caller does not own.
async fn check_folder(
    state: &AppState,
    user_id: Uuid,
    folder_id: Option<Uuid>,
) -> Result<(), (StatusCode, String)> {
    let Some(folder_id) = folder_id else {
        return Ok(());
    };

    match queries::folder_owned_by(&state.db, user_id, folder_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err((StatusCode::NOT_FOUND, "Folder not found".to_string())),
        Err(e) => {
            tracing::error!(error = %e, %folder_id, "Error checking folder");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string()))
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Json(body): Json<CreateTask>,
) -> impl IntoResponse {
    if let Err(msg) = validate_create(&body) {
        return (StatusCode::BAD_REQUEST, msg).into_response();
    }
    if let Err(rejection) = check_folder(&state, user_id, body.folder_id).await {
        return rejection.into_response();
    }

    match queries::create_task(&state.db, user_id, body).await {
        Ok(t) => (StatusCode::CREATED, Json(t)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, %user_id, "Error creating task");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create task").into_response()
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Query(filter): Query<ListTasksQuery>,
) -> impl IntoResponse {
    match queries::list_tasks(&state.db, user_id, &filter).await {
        Ok(tasks) => (StatusCode::OK, Json(tasks)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, %user_id, "Error listing tasks");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list tasks").into_response()
        }
    }
}

pub async fn get(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match queries::get_task(&state.db, user_id, id).await {
        Ok(Some(t)) => (StatusCode::OK, Json(t)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Task not found").into_response(),
        Err(e) => {
            tracing::error!(error = %e, task_id = %id, "Error fetching task");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch task").into_response()
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTask>,
) -> impl IntoResponse {
    if let Err(msg) = validate_update(&body) {
        return (StatusCode::BAD_REQUEST, msg).into_response();
    }
    if let Err(rejection) = check_folder(&state, user_id, body.folder_id).await {
        return rejection.into_response();
    }

    match queries::update_task(&state.db, user_id, id, body).await {
        Ok(Some(t)) => (StatusCode::OK, Json(t)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Task not found").into_response(),
        Err(e) => {
            tracing::error!(error = %e, task_id = %id, "Error updating task");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update task").into_response()
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match queries::delete_task(&state.db, user_id, id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({"deleted": true}))
        ).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Task not found").into_response(),
        Err(e) => {
            tracing::error!(error = %e, task_id = %id, "Error deleting task");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete task").into_response()
        }
    }
}
