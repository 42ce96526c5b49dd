use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::routes::tasks::model::Task;
use crate::routes::tasks::DEFAULT_PRIORITY;

/// What the reminder sweep needs from task persistence.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Incomplete, not yet reminded tasks that have a non-empty due date.
    async fn list_due_candidates(&self) -> sqlx::Result<Vec<Task>>;

    /// `None` when the user is gone or has no usable email.
    async fn get_owner_email(&self, user_id: Uuid) -> sqlx::Result<Option<String>>;

    /// Sets `reminder_sent` for one task, keyed by its id. Only applies while
    /// the stored due date/time still match `task`, so a reschedule that
    /// raced the send is not marked as reminded. Returns whether a row changed.
    async fn mark_reminder_sent(&self, task: &Task) -> sqlx::Result<bool>;
}

/// Candidate row as stored. Rows may come from other writers, so the
/// descriptive columns are decoded leniently rather than failing the sweep.
#[derive(Debug, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CandidateRow> for Task {
    fn from(row: CandidateRow) -> Self {
        Task {
            id: row.id,
            user_id: row.user_id,
            folder_id: row.folder_id,
            title: row.title.unwrap_or_default(),
            priority: row
                .priority
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            completed: false,
            due_date: row.due_date,
            due_time: row.due_time,
            reminder_sent: false,
            created_at: row.created_at.unwrap_or_else(Utc::now),
        }
    }
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_due_candidates(&self) -> sqlx::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT id, user_id, folder_id, title, priority,
                   due_date, due_time, created_at
            FROM tasks
            WHERE user_id IS NOT NULL
              AND due_date IS NOT NULL
              AND TRIM(due_date) <> ''
              AND completed IS NOT TRUE
              AND reminder_sent IS NOT TRUE
            ORDER BY due_date, due_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_owner_email(&self, user_id: Uuid) -> sqlx::Result<Option<String>> {
        let email = sqlx::query_scalar::<_, Option<String>>("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(email
            .flatten()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()))
    }

    async fn mark_reminder_sent(&self, task: &Task) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET reminder_sent = TRUE
            WHERE id = $1
              AND reminder_sent IS NOT TRUE
              AND due_date IS NOT DISTINCT FROM $2
              AND due_time IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(task.id)
        .bind(&task.due_date)
        .bind(&task.due_time)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            folder_id: None,
            title: Some("Pay rent".to_string()),
            priority: Some("High".to_string()),
            due_date: Some("2024-01-01".to_string()),
            due_time: Some("12:30".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn test_candidate_row_keeps_stored_values() {
        let stored = row();
        let id = stored.id;
        let task = Task::from(stored);

        assert_eq!(task.id, id);
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.priority, "High");
        assert_eq!(task.due_time.as_deref(), Some("12:30"));
        assert!(!task.completed);
        assert!(!task.reminder_sent);
    }

    #[test]
    fn test_candidate_row_with_null_columns_still_decodes() {
        let task = Task::from(CandidateRow {
            title: None,
            priority: None,
            ..row()
        });

        assert_eq!(task.title, "");
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert_eq!(task.due_date.as_deref(), Some("2024-01-01"));
    }
}
