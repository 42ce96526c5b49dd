use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dto::UpdateTask;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub priority: String,
    pub completed: bool,
    /// `YYYY-MM-DD`, wall-clock date in the reminder zone.
    pub due_date: Option<String>,
    /// `HH:MM`; reminders treat an absent value as end of day.
    pub due_time: Option<String>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Applies a validated patch. Changing the due date or due time clears
    /// `reminder_sent` so the new schedule gets its own reminder.
    pub fn apply(&mut self, patch: UpdateTask) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(folder_id) = patch.folder_id {
            self.folder_id = Some(folder_id);
        }

        let mut rescheduled = false;
        if let Some(due_date) = patch.due_date {
            let due_date = blank_to_none(due_date);
            if due_date != self.due_date {
                self.due_date = due_date;
                rescheduled = true;
            }
        }
        if let Some(due_time) = patch.due_time {
            let due_time = blank_to_none(due_time);
            if due_time != self.due_time {
                self.due_time = due_time;
                rescheduled = true;
            }
        }

        if rescheduled {
            self.reminder_sent = false;
        }
    }
}

/// Empty strings are how clients clear an optional field.
pub fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            folder_id: None,
            title: "Pay rent".to_string(),
            priority: "High".to_string(),
            completed: false,
            due_date: Some("2024-01-01".to_string()),
            due_time: Some("12:30".to_string()),
            reminder_sent: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_editing_due_time_clears_reminder_flag() {
        let mut task = sent_task();
        task.apply(UpdateTask {
            due_time: Some("18:00".to_string()),
            ..Default::default()
        });

        assert_eq!(task.due_time.as_deref(), Some("18:00"));
        assert!(!task.reminder_sent);
    }

    #[test]
    fn test_editing_due_date_clears_reminder_flag() {
        let mut task = sent_task();
        task.apply(UpdateTask {
            due_date: Some("2024-01-02".to_string()),
            ..Default::default()
        });

        assert!(!task.reminder_sent);
    }

    #[test]
    fn test_clearing_due_date_clears_reminder_flag() {
        let mut task = sent_task();
        task.apply(UpdateTask {
            due_date: Some("  ".to_string()),
            ..Default::default()
        });

        assert_eq!(task.due_date, None);
        assert!(!task.reminder_sent);
    }

    #[test]
    fn test_other_edits_keep_reminder_flag() {
        let mut task = sent_task();
        task.apply(UpdateTask {
            title: Some("Pay rent (landlord)".to_string()),
            priority: Some("Low".to_string()),
            due_date: Some("2024-01-01".to_string()),
            due_time: Some("12:30".to_string()),
            ..Default::default()
        });

        assert_eq!(task.title, "Pay rent (landlord)");
        assert_eq!(task.priority, "Low");
        assert!(task.reminder_sent);
    }
}
