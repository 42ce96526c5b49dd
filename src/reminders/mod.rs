//! Due-date email reminders.
//!
//! A sweep lists incomplete tasks that have not been reminded yet, picks the
//! ones due within the configured window and emails their owners once. The
//! `reminder_sent` flag is only set after a successful send, so a failed send
//! is retried by the next sweep.

pub mod channel;
pub mod due;
pub mod error;
pub mod scheduler;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ReminderConfig;
use crate::routes::tasks::model::Task;
use channel::ChannelError;

pub use channel::NotificationChannel;
pub use error::ReminderError;
pub use store::TaskStore;

/// Counts for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub channel_configured: bool,
    pub examined: usize,
    pub due_soon: usize,
    pub sent: usize,
    /// Unparseable due timestamps, tasks without a usable recipient and
    /// tasks rescheduled while their reminder was being sent.
    pub skipped: usize,
    /// Channel errors and timeouts; retried next sweep.
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderStatus {
    pub running: bool,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_report: Option<SweepReport>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub cadence_secs: u64,
    pub window_minutes: i64,
    pub channel_configured: bool,
}

enum Delivery {
    Recorded,
    /// Sent, but the due date/time changed before the flag was written.
    Superseded,
}

pub struct ReminderService {
    store: Arc<dyn TaskStore>,
    channel: Option<Arc<dyn NotificationChannel>>,
    config: ReminderConfig,
    // Held for a whole sweep so periodic and on-demand runs never overlap.
    sweep_lock: tokio::sync::Mutex<()>,
    status: Mutex<ReminderStatus>,
}

impl ReminderService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        channel: Option<Arc<dyn NotificationChannel>>,
        config: ReminderConfig,
    ) -> Self {
        let status = ReminderStatus {
            cadence_secs: config.cadence.as_secs(),
            window_minutes: config.window.num_minutes(),
            channel_configured: channel.is_some(),
            ..Default::default()
        };

        Self {
            store,
            channel,
            config,
            sweep_lock: tokio::sync::Mutex::new(()),
            status: Mutex::new(status),
        }
    }

    pub fn channel_configured(&self) -> bool {
        self.channel.is_some()
    }

    pub fn status(&self) -> ReminderStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Runs one sweep at `now`.
    ///
    /// Per-task problems are logged and counted. Only a task store failure
    /// is returned as an error, and it leaves every unsent task for the next
    /// sweep.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport, ReminderError> {
        let _guard = self.sweep_lock.lock().await;

        self.update_status(|s| {
            s.running = true;
            s.last_started_at = Some(now);
        });

        let result = self.sweep(now).await;

        self.update_status(|s| {
            s.running = false;
            s.last_finished_at = Some(Utc::now());
            match &result {
                Ok(report) => {
                    s.last_report = Some(report.clone());
                    s.last_error = None;
                    s.consecutive_failures = 0;
                }
                Err(e) => {
                    s.last_error = Some(e.to_string());
                    s.consecutive_failures += 1;
                }
            }
        });

        result
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, ReminderError> {
        let Some(channel) = self.channel.as_deref() else {
            debug!(reason = %ReminderError::ConfigAbsent, "skipping reminder sweep");
            return Ok(SweepReport::default());
        };

        let candidates = self.store.list_due_candidates().await?;
        let local_now = now.with_timezone(&self.config.offset).naive_local();

        let mut report = SweepReport {
            channel_configured: true,
            examined: candidates.len(),
            ..Default::default()
        };

        for task in &candidates {
            let due = match due::parse_due(task.due_date.as_deref(), task.due_time.as_deref()) {
                Ok(Some(due)) => due,
                Ok(None) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(
                        task_id = %task.id,
                        error = %e,
                        "skipping task with unparseable due timestamp"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            if !due::is_due_soon(due, local_now, self.config.window) {
                continue;
            }
            report.due_soon += 1;

            match self.remind(channel, task, due).await {
                Ok(Delivery::Recorded) => report.sent += 1,
                Ok(Delivery::Superseded) => report.skipped += 1,
                Err(e @ ReminderError::StoreFailure(_)) => return Err(e),
                Err(e @ ReminderError::MissingRecipient { .. }) => {
                    warn!(task_id = %task.id, error = %e, "skipping reminder");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        task_id = %task.id,
                        error = %e,
                        "reminder not sent, will retry next sweep"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.sent > 0 || report.failed > 0 {
            info!(
                examined = report.examined,
                due_soon = report.due_soon,
                sent = report.sent,
                skipped = report.skipped,
                failed = report.failed,
                "reminder sweep finished"
            );
        } else {
            debug!(examined = report.examined, "reminder sweep finished, nothing to send");
        }

        Ok(report)
    }

    async fn remind(
        &self,
        channel: &dyn NotificationChannel,
        task: &Task,
        due: NaiveDateTime,
    ) -> Result<Delivery, ReminderError> {
        let missing = ReminderError::MissingRecipient { user_id: task.user_id };
        let email = self.store.get_owner_email(task.user_id).await?.ok_or(missing)?;

        let (subject, body) = compose(task, due);

        let timeout = self.config.send_timeout;
        match tokio::time::timeout(timeout, channel.send(&email, &subject, &body)).await {
            Ok(Ok(())) => {}
            // A malformed stored address will not fix itself on retry.
            Ok(Err(ChannelError::Address { .. })) => {
                return Err(ReminderError::MissingRecipient { user_id: task.user_id });
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ChannelError::Timeout(timeout).into()),
        }

        if !self.store.mark_reminder_sent(task).await? {
            info!(task_id = %task.id, "reminder sent but task was rescheduled meanwhile");
            return Ok(Delivery::Superseded);
        }
        info!(task_id = %task.id, user_id = %task.user_id, "reminder sent");

        Ok(Delivery::Recorded)
    }

    fn update_status(&self, f: impl FnOnce(&mut ReminderStatus)) {
        let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut status);
    }
}

/// Subject and plain-text body for a reminder email.
pub fn compose(task: &Task, due: NaiveDateTime) -> (String, String) {
    let subject = format!("Reminder: \"{}\" is due soon", task.title);
    let body = format!(
        "Hi,\n\nYour task \"{}\" is due at {}.\nPriority: {}\n\n\
         Mark it as completed to stop further reminders.\n",
        task.title,
        due::format_due(due),
        task.priority,
    );
    (subject, body)
}
