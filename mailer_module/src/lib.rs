//! Thin SMTP sending layer shared by the notifier's email-based channels.
//!
//! Credentials and relay settings come from the environment (`SMTP_*`
//! variables); the defaults target a Gmail submission relay on port 587
//! with STARTTLS.

use std::env;
use std::time::Duration;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection and identity settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// From address; defaults to `username` when `SMTP_FROM` is unset.
    pub sender: String,
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Reads SMTP settings from the environment. Returns `None` when
    /// `SMTP_USERNAME` or `SMTP_PASSWORD` is missing, so callers can treat
    /// mail as unconfigured rather than failing at startup.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();

        let username = env_var_non_empty("SMTP_USERNAME")?;
        let password = env_var_non_empty("SMTP_PASSWORD")?;
        let host =
            env_var_non_empty("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let port = env_var_non_empty("SMTP_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_SMTP_PORT);
        let sender = env_var_non_empty("SMTP_FROM").unwrap_or_else(|| username.clone());
        let timeout = env_var_non_empty("SMTP_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SMTP_TIMEOUT);

        Some(Self {
            host,
            port,
            username,
            password,
            sender,
            timeout,
        })
    }
}

/// One outgoing message. `to` may be any RFC 5321 address, including
/// carrier SMS gateway addresses such as `5551234567@txt.att.net`.
#[derive(Debug, Clone)]
pub struct SendMailParams {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum SendMailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to compose message: {0}")]
    Compose(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub fn build_message(
    config: &SmtpConfig,
    params: &SendMailParams,
) -> Result<Message, SendMailError> {
    let from: Mailbox = config.sender.parse()?;
    let to: Mailbox = params.to.parse()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(params.subject.as_str())
        .body(params.body.clone())?;
    Ok(message)
}

/// Connects to the relay, authenticates, and submits one message. The
/// connection is opened per call; the notifier sends at most a handful of
/// messages per minute, so pooling is not worth the state.
pub fn send_mail(config: &SmtpConfig, params: &SendMailParams) -> Result<(), SendMailError> {
    let message = build_message(config, params)?;
    let mailer = SmtpTransport::starttls_relay(&config.host)?
        .port(config.port)
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .timeout(Some(config.timeout))
        .build();
    mailer.send(&message)?;
    Ok(())
}

fn env_var_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
