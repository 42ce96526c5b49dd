use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::routes::middleware_auth::JwtUser;
use crate::state::AppState;
use super::{validate_folder_name, CreateFolderRequest, Folder, UpdateFolderRequest};

/// Create a folder for the authenticated user
pub async fn create(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Json(payload): Json<CreateFolderRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_folder_name(&payload.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let folder = sqlx::query_as::<_, Folder>(
        r#"
        INSERT INTO folders (id, user_id, name)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(payload.name.trim())
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = ?e, %user_id, "Failed to create folder");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create folder".to_string())
    })?;

    Ok((StatusCode::CREATED, Json(folder)))
}

/// List the authenticated user's folders
pub async fn list(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let folders = sqlx::query_as::<_, Folder>(
        r#"
        SELECT id, user_id, name, created_at FROM folders
        WHERE user_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = ?e, %user_id, "Failed to fetch folders");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch folders".to_string())
    })?;

    Ok(Json(folders))
}

/// Rename a folder
pub async fn update(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(folder_id): Path<Uuid>,
    Json(payload): Json<UpdateFolderRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_folder_name(&payload.name).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let folder = sqlx::query_as::<_, Folder>(
        r#"
        UPDATE folders
        SET name = $1
        WHERE id = $2 AND user_id = $3
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(payload.name.trim())
    .bind(folder_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        tracing::error!(error = ?e, %folder_id, "Failed to update folder");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update folder".to_string())
    })?;

    match folder {
        Some(f) => Ok(Json(f)),
        None => Err((StatusCode::NOT_FOUND, "Folder not found".to_string())),
    }
}

/// Delete a folder; its tasks are kept and moved out of it
pub async fn delete(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(folder_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let db_error = |e: sqlx::Error| {
        tracing::error!(error = ?e, %folder_id, "Failed to delete folder");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete folder".to_string())
    };

    let mut tx = state.db.begin().await.map_err(db_error)?;

    sqlx::query("UPDATE tasks SET folder_id = NULL WHERE folder_id = $1 AND user_id = $2")
        .bind(folder_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

    let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
        .bind(folder_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

    if result.rows_affected() == 0 {
        return Err((StatusCode::NOT_FOUND, "Folder not found".to_string()));
    }

    tx.commit().await.map_err(db_error)?;

    Ok(StatusCode::NO_CONTENT)
}
