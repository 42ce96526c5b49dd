use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::ReminderService;

/// Runs [`ReminderService::run_once`] on a fixed cadence until stopped.
pub struct ReminderScheduler {
    service: Arc<ReminderService>,
    cadence: Duration,
}

pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReminderScheduler {
    pub fn new(service: Arc<ReminderService>, cadence: Duration) -> Self {
        Self { service, cadence }
    }

    /// Spawns the tick loop. The first sweep runs immediately.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            info!(cadence_secs = self.cadence.as_secs(), "reminder scheduler started");

            let mut ticker = tokio::time::interval(self.cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("reminder scheduler stopped");
        });

        SchedulerHandle { shutdown, join }
    }

    async fn tick(&self) {
        // Own task so a panicking sweep cannot take the loop down with it.
        let service = self.service.clone();
        let sweep = tokio::spawn(async move { service.run_once(Utc::now()).await });

        match sweep.await {
            Ok(Ok(report)) => debug!(
                sent = report.sent,
                failed = report.failed,
                "scheduled reminder sweep done"
            ),
            Ok(Err(e)) => error!(error = %e, "scheduled reminder sweep failed"),
            Err(e) => error!(error = %e, "scheduled reminder sweep panicked"),
        }
    }
}

impl SchedulerHandle {
    /// Stops the loop after any in-flight sweep finishes.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "reminder scheduler task failed");
        }
    }
}
