//! Calendar entry fetching.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

/// Daily content for one `(month, day)` slot. The store answers unknown
/// months with empty strings rather than an error, and the notifier still
/// sends the message with whatever text it got.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarEntry {
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub entry: String,
}

#[derive(Debug, Error)]
pub enum EntrySourceError {
    #[error("calendar request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("calendar endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode calendar payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read side of the calendar store. A fetch failure only skips the one
/// user being processed; their send slot stays open for the next cycle.
pub trait EntrySource: Send {
    fn get_entry(&self, month: u32, day: u32) -> Result<CalendarEntry, EntrySourceError>;
}

/// Calendar store client for the backend's `/get_entry` endpoint.
pub struct HttpEntrySource {
    base_url: String,
    client: Client,
}

impl HttpEntrySource {
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

impl EntrySource for HttpEntrySource {
    fn get_entry(&self, month: u32, day: u32) -> Result<CalendarEntry, EntrySourceError> {
        let url = format!("{}/get_entry", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("month", month), ("day", day)])
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(EntrySourceError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_entry() {
        let entry: CalendarEntry =
            serde_json::from_str(r#"{"theme": "Respect", "entry": "Say hello."}"#).unwrap();
        assert_eq!(entry.theme, "Respect");
        assert_eq!(entry.entry, "Say hello.");
    }

    #[test]
    fn unknown_month_payload_defaults_to_empty_strings() {
        let entry: CalendarEntry = serde_json::from_str("{}").unwrap();
        assert_eq!(entry.theme, "");
        assert_eq!(entry.entry, "");
    }
}
