mod config;
mod reminders;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reminders::channel::SmtpChannel;
use reminders::scheduler::ReminderScheduler;
use reminders::store::PgTaskStore;
use reminders::{NotificationChannel, ReminderService, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::Config::from_env().context("invalid configuration")?;

    let db = PgPool::connect(&config.database_url)
        .await
        .context("Error connecting DB")?;

    let channel: Option<Arc<dyn NotificationChannel>> = match &config.smtp {
        Some(smtp) => {
            let channel = SmtpChannel::new(smtp, config.reminders.send_timeout)
                .context("invalid SMTP configuration")?;
            info!(host = %smtp.host, port = smtp.port, "reminder emails enabled");
            Some(Arc::new(channel) as Arc<dyn NotificationChannel>)
        }
        None => {
            warn!("SMTP is not configured, reminder emails are disabled");
            None
        }
    };

    let store: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(db.clone()));
    let reminders = Arc::new(ReminderService::new(store, channel, config.reminders.clone()));

    let scheduler = config
        .reminders
        .scheduler_enabled
        .then(|| ReminderScheduler::new(reminders.clone(), config.reminders.cadence).start());

    let state = state::AppState {
        db,
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
        reminders,
    };

    let app = routes::routes(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("could not bind {}", config.addr()))?;

    info!(addr = %config.addr(), "server is chilling");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
