//! Profile snapshot fetching.
//!
//! The profile store is an external HTTP service; the notifier pulls a
//! full snapshot every cycle and never caches across cycles, so edits made
//! through the store take effect within one cycle.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::channel::{Channel, Destination};
use crate::clock::MAX_OFFSET_HOURS;

/// One user's notification preferences as served by the profile store.
///
/// Every field is optional on the wire. Validation happens at dispatch
/// time so a half-filled profile never breaks snapshot decoding for
/// everyone else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub timezone: Option<TimezoneField>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub device_token: Option<String>,
}

/// The store has historically written timezone offsets both as JSON
/// numbers and as stringified integers; accept either form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimezoneField {
    Hours(i64),
    Text(String),
}

impl Profile {
    /// Signed hour offset from UTC. Absent or unparsable values fall back
    /// to 0; parsable values are clamped to a representable offset.
    pub fn offset_hours(&self) -> i32 {
        let raw = match &self.timezone {
            Some(TimezoneField::Hours(value)) => *value,
            Some(TimezoneField::Text(value)) => value.trim().parse::<i64>().unwrap_or(0),
            None => 0,
        };
        raw.clamp(-i64::from(MAX_OFFSET_HOURS), i64::from(MAX_OFFSET_HOURS)) as i32
    }

    /// Builds the channel-typed destination for this profile. Email goes
    /// to the profile key itself; SMS and push require their own fields.
    pub fn destination(
        &self,
        user_id: &str,
        channel: Channel,
    ) -> Result<Destination, DestinationError> {
        match channel {
            Channel::Email => Ok(Destination::Email {
                address: user_id.to_string(),
            }),
            Channel::Sms => {
                let phone = non_empty(self.phone.as_deref()).ok_or(DestinationError::MissingPhone)?;
                let carrier =
                    non_empty(self.carrier.as_deref()).ok_or(DestinationError::MissingCarrier)?;
                Ok(Destination::Sms {
                    phone: phone.to_string(),
                    carrier: carrier.to_string(),
                })
            }
            Channel::Push => {
                let device_token = non_empty(self.device_token.as_deref())
                    .ok_or(DestinationError::MissingDeviceToken)?;
                Ok(Destination::Push {
                    device_token: device_token.to_string(),
                })
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DestinationError {
    #[error("profile has no phone number")]
    MissingPhone,
    #[error("profile has no carrier")]
    MissingCarrier,
    #[error("profile has no device token")]
    MissingDeviceToken,
}

#[derive(Debug, Error)]
pub enum ProfileSourceError {
    #[error("profile request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("profile endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode profile payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read side of the profile store. Fetch failures are expected to be
/// transient; callers skip the cycle and retry on the next one.
pub trait ProfileSource: Send {
    fn list_profiles(&self) -> Result<HashMap<String, Profile>, ProfileSourceError>;
}

/// Profile store client for the backend's `/show_profiles` endpoint.
pub struct HttpProfileSource {
    base_url: String,
    client: Client,
}

impl HttpProfileSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

impl ProfileSource for HttpProfileSource {
    fn list_profiles(&self) -> Result<HashMap<String, Profile>, ProfileSourceError> {
        let url = format!("{}/show_profiles", self.base_url);
        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ProfileSourceError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
