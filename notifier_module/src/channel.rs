//! Shared delivery-channel contract.
//!
//! Every outbound channel (email, SMS gateway, push) implements
//! [`DeliveryAdapter`]; the scheduler only sees [`SendResult`] values and
//! never a transport-specific error type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery mechanisms a profile can select via its `method` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a profile's `method` names no known channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown delivery method: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "push" => Ok(Channel::Push),
            _ => Err(UnknownChannel(value.trim().to_string())),
        }
    }
}

/// Channel-typed delivery target. Each variant carries exactly the fields
/// its transport needs, so an SMS number can never double as a push token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Email { address: String },
    Sms { phone: String, carrier: String },
    Push { device_token: String },
}

impl Destination {
    pub fn channel(&self) -> Channel {
        match self {
            Destination::Email { .. } => Channel::Email,
            Destination::Sms { .. } => Channel::Sms,
            Destination::Push { .. } => Channel::Push,
        }
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter configuration error: {0}")]
    ConfigError(String),
    #[error("send failed: {0}")]
    SendError(String),
    #[error("parse error: {0}")]
    ParseError(String),
}

/// Outcome of one send attempt. `success: false` with an `error` means the
/// transport answered but rejected the message; failures to reach the
/// transport at all surface as [`AdapterError::SendError`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResult {
    pub success: bool,
    pub message_id: String,
    pub submitted_at: String,
    pub error: Option<String>,
}

/// Outbound delivery contract: one subject/body pair in, one
/// [`SendResult`] out. Implementations must not panic on transport
/// errors.
pub trait DeliveryAdapter {
    fn send(
        &self,
        destination: &Destination,
        subject: &str,
        body: &str,
    ) -> Result<SendResult, AdapterError>;

    fn channel(&self) -> Channel;
}
