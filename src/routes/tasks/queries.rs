use sqlx::{PgPool, Result};
use uuid::Uuid;

use super::dto::{CreateTask, ListTasksQuery, UpdateTask};
use super::model::{blank_to_none, Task};
use super::DEFAULT_PRIORITY;

const TASK_COLUMNS: &str = "id, user_id, folder_id, title, priority, completed, \
     due_date, due_time, reminder_sent, created_at";

pub async fn create_task(pool: &PgPool, user_id: Uuid, body: CreateTask) -> Result<Task> {
    let rec = sqlx::query_as::<_, Task>(&format!(
        r#"
        INSERT INTO tasks (id, user_id, folder_id, title, priority, due_date, due_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(body.folder_id)
    .bind(body.title.trim())
    .bind(body.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()))
    .bind(body.due_date.and_then(blank_to_none))
    .bind(body.due_time.and_then(blank_to_none))
    .fetch_one(pool)
    .await?;

    Ok(rec)
}

pub async fn list_tasks(
    pool: &PgPool,
    user_id: Uuid,
    filter: &ListTasksQuery,
) -> Result<Vec<Task>> {
    let rec = sqlx::query_as::<_, Task>(&format!(
        r#"
        SELECT {TASK_COLUMNS}
        FROM tasks
        WHERE user_id = $1
          AND ($2::uuid IS NULL OR folder_id = $2)
          AND ($3::boolean IS NULL OR completed = $3)
        ORDER BY created_at DESC
        "#
    ))
    .bind(user_id)
    .bind(filter.folder_id)
    .bind(filter.completed)
    .fetch_all(pool)
    .await?;

    Ok(rec)
}

pub async fn get_task(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Task>> {
    let rec = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(rec)
}

/// Locks the row, applies the patch and writes it back in one transaction,
/// so a due date/time edit and the reminder flag reset land together.
pub async fn update_task(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    patch: UpdateTask,
) -> Result<Option<Task>> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut task) = current else {
        return Ok(None);
    };
    task.apply(patch);

    let rec = sqlx::query_as::<_, Task>(&format!(
        r#"
        UPDATE tasks
        SET
            title = $3,
            priority = $4,
            completed = $5,
            folder_id = $6,
            due_date = $7,
            due_time = $8,
            reminder_sent = $9
        WHERE id = $1 AND user_id = $2
        RETURNING {TASK_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&task.title)
    .bind(&task.priority)
    .bind(task.completed)
    .bind(task.folder_id)
    .bind(&task.due_date)
    .bind(&task.due_time)
    .bind(task.reminder_sent)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(rec))
}

pub async fn delete_task(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn folder_owned_by(pool: &PgPool, user_id: Uuid, folder_id: Uuid) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM folders WHERE id = $1 AND user_id = $2)",
    )
    .bind(folder_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
