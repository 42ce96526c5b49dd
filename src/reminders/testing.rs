//! In-memory collaborators for sweep tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::channel::{ChannelError, NotificationChannel};
use super::store::TaskStore;
use crate::routes::tasks::dto::UpdateTask;
use crate::routes::tasks::model::Task;

pub fn task(user_id: Uuid, title: &str, due_date: Option<&str>, due_time: Option<&str>) -> Task {
    Task {
        id: Uuid::new_v4(),
        user_id,
        folder_id: None,
        title: title.to_string(),
        priority: "Medium".to_string(),
        completed: false,
        due_date: due_date.map(str::to_string),
        due_time: due_time.map(str::to_string),
        reminder_sent: false,
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<Vec<Task>>,
    emails: Mutex<HashMap<Uuid, String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn add_user(&self, user_id: Uuid, email: &str) {
        self.emails.lock().unwrap().insert(user_id, email.to_string());
    }

    pub fn add_task(&self, task: Task) -> Uuid {
        let id = task.id;
        self.tasks.lock().unwrap().push(task);
        id
    }

    pub fn task(&self, id: Uuid) -> Task {
        self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned().unwrap()
    }

    pub fn edit(&self, id: Uuid, patch: UpdateTask) {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks.iter_mut().find(|t| t.id == id).unwrap();
        task.apply(patch);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> sqlx::Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_due_candidates(&self) -> sqlx::Result<Vec<Task>> {
        self.check()?;
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| t.due_date.as_deref().is_some_and(|d| !d.trim().is_empty()))
            .filter(|t| !t.completed && !t.reminder_sent)
            .cloned()
            .collect())
    }

    async fn get_owner_email(&self, user_id: Uuid) -> sqlx::Result<Option<String>> {
        self.check()?;
        Ok(self
            .emails
            .lock()
            .unwrap()
            .get(&user_id)
            .filter(|e| !e.trim().is_empty())
            .cloned())
    }

    async fn mark_reminder_sent(&self, task: &Task) -> sqlx::Result<bool> {
        self.check()?;
        let mut tasks = self.tasks.lock().unwrap();
        let Some(stored) = tasks.iter_mut().find(|t| t.id == task.id) else {
            return Ok(false);
        };
        if stored.reminder_sent
            || stored.due_date != task.due_date
            || stored.due_time != task.due_time
        {
            return Ok(false);
        }
        stored.reminder_sent = true;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

type SendHook = Box<dyn Fn(&str) + Send + Sync>;

/// Records mail instead of sending it. Recipients without an `@` are
/// rejected the way a real transport rejects a malformed address.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<SentMail>>,
    attempts: Mutex<usize>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    on_send: Mutex<Option<SendHook>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Runs `hook` with the subject of every mail while it is being sent.
    pub fn on_send(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_send.lock().unwrap() = Some(Box::new(hook));
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ChannelError> {
        *self.attempts.lock().unwrap() += 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::Transport("connection refused".to_string()));
        }
        if !to.contains('@') {
            return Err(ChannelError::Address {
                address: to.to_string(),
                reason: "missing domain".to_string(),
            });
        }
        if let Some(hook) = self.on_send.lock().unwrap().as_ref() {
            hook(subject);
        }

        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
