use std::sync::Arc;

use sqlx::PgPool;

use crate::reminders::ReminderService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_secret: Arc<str>,
    pub reminders: Arc<ReminderService>,
}
