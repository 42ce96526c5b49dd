use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub cadence: Duration,
    pub window: chrono::Duration,
    /// Wall-clock zone that task due dates and times are written in.
    pub offset: FixedOffset,
    /// Upper bound on a single notification send.
    pub send_timeout: Duration,
    pub scheduler_enabled: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(120),
            window: chrono::Duration::hours(1),
            offset: Utc.fix(),
            send_timeout: Duration::from_secs(10),
            scheduler_enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// `None` when any of host, username or password is unset.
    pub smtp: Option<SmtpConfig>,
    pub reminders: ReminderConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_required(&get, "PORT")?;
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let smtp = match (get("SMTP_HOST"), get("SMTP_USERNAME"), get("SMTP_PASSWORD")) {
            (Some(host), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: parse_or(&get, "SMTP_PORT", 587)?,
                from: get("SMTP_FROM").unwrap_or_else(|| username.clone()),
                username,
                password,
            }),
            _ => None,
        };

        let cadence_secs: u64 = parse_or(&get, "REMINDER_CADENCE_SECS", 120)?;
        if cadence_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REMINDER_CADENCE_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let window_minutes: i64 = parse_or(&get, "REMINDER_WINDOW_MINUTES", 60)?;
        if window_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "REMINDER_WINDOW_MINUTES",
                reason: "must be greater than zero".to_string(),
            });
        }
        let window = chrono::Duration::try_minutes(window_minutes).ok_or_else(|| {
            ConfigError::Invalid {
                name: "REMINDER_WINDOW_MINUTES",
                reason: format!("{} is out of range", window_minutes),
            }
        })?;

        let offset_minutes: i32 = parse_or(&get, "REMINDER_UTC_OFFSET_MINUTES", 0)?;
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "REMINDER_UTC_OFFSET_MINUTES",
                reason: format!("{} is out of range", offset_minutes),
            })?;

        let reminders = ReminderConfig {
            cadence: Duration::from_secs(cadence_secs),
            window,
            offset,
            send_timeout: Duration::from_secs(parse_or(&get, "SMTP_SEND_TIMEOUT_SECS", 10)?),
            scheduler_enabled: parse_or(&get, "REMINDER_SCHEDULER_ENABLED", true)?,
        };

        Ok(Self {
            bind_addr,
            port,
            database_url,
            jwt_secret,
            smtp,
            reminders,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_required<T, G>(get: &G, name: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(name).ok_or(ConfigError::Missing(name))?;
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(_) => parse_required(get, name),
        None => Ok(default),
    }
}
