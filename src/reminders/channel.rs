use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("could not build message: {0}")]
    Message(String),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Delivers one notification to one recipient.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ChannelError>;
}

pub struct SmtpChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpChannel {
    /// Port 465 uses implicit TLS, anything else STARTTLS.
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self, ChannelError> {
        let from = parse_mailbox(&config.from)?;

        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl NotificationChannel for SmtpChannel {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ChannelError> {
        let message = build_message(&self.from, to, subject, body)?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ChannelError> {
    address.trim().parse::<Mailbox>().map_err(|e| ChannelError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, ChannelError> {
    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| ChannelError::Message(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let from = parse_mailbox("Reminders <bot@example.com>").unwrap();

        let err = build_message(&from, "not an address", "subject", "body").unwrap_err();
        assert!(matches!(err, ChannelError::Address { .. }));
    }

    #[test]
    fn test_build_message_sets_headers() {
        let from = parse_mailbox("bot@example.com").unwrap();
        let message = build_message(&from, "alice@example.com", "Reminder", "Due soon").unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: alice@example.com"));
        assert!(raw.contains("Subject: Reminder"));
        assert!(raw.contains("Due soon"));
    }
}
