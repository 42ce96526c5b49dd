use uuid::Uuid;

use super::channel::ChannelError;

/// Everything that can go wrong while reminding.
///
/// Only [`ReminderError::StoreFailure`] aborts a sweep. The other variants
/// are per-candidate and are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("notification channel is not configured")]
    ConfigAbsent,

    #[error("could not parse due timestamp {value:?}: {reason}")]
    ParseFailure { value: String, reason: String },

    #[error("user {user_id} has no usable email address")]
    MissingRecipient { user_id: Uuid },

    #[error("notification channel error: {0}")]
    ChannelFailure(#[from] ChannelError),

    #[error("task store error: {0}")]
    StoreFailure(#[from] sqlx::Error),
}
