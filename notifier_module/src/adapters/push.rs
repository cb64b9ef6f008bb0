//! Push delivery through the mobile push relay.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::channel::{AdapterError, Channel, DeliveryAdapter, Destination, SendResult};

const PUSH_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the push relay service.
#[derive(Debug, Clone)]
pub struct PushRelayConfig {
    pub base_url: String,
    /// Bearer token; omitted for relays that sit inside a trusted network.
    pub api_token: Option<String>,
}

/// Sends device notifications through the relay's `/notify` endpoint.
pub struct PushAdapter {
    relay: Option<PushRelayConfig>,
    client: Client,
}

impl PushAdapter {
    pub fn new(relay: Option<PushRelayConfig>) -> Self {
        let client = Client::builder()
            .timeout(PUSH_HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { relay, client }
    }

    fn api_url(relay: &PushRelayConfig) -> String {
        format!("{}/notify", relay.base_url.trim_end_matches('/'))
    }
}

/// Request body for the relay's notify API.
#[derive(Debug, Clone, Serialize)]
pub struct PushNotifyRequest {
    pub device_token: String,
    pub title: String,
    pub body: String,
}

/// Response from the relay's notify API.
#[derive(Debug, Clone, Deserialize)]
pub struct PushNotifyResponse {
    pub ok: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl DeliveryAdapter for PushAdapter {
    fn send(
        &self,
        destination: &Destination,
        subject: &str,
        body: &str,
    ) -> Result<SendResult, AdapterError> {
        let device_token = match destination {
            Destination::Push { device_token } => device_token,
            other => {
                return Err(AdapterError::ConfigError(format!(
                    "push adapter received a {} destination",
                    other.channel()
                )))
            }
        };
        let relay = self
            .relay
            .as_ref()
            .ok_or_else(|| AdapterError::ConfigError("push relay is not configured".to_string()))?;

        let request = PushNotifyRequest {
            device_token: device_token.clone(),
            title: subject.to_string(),
            body: body.to_string(),
        };

        let url = Self::api_url(relay);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = relay.api_token.as_deref() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let response = builder
            .send()
            .map_err(|e| AdapterError::SendError(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .map_err(|e| AdapterError::SendError(e.to_string()))?;
        if !status.is_success() {
            return Ok(SendResult {
                success: false,
                message_id: String::new(),
                submitted_at: String::new(),
                error: Some(format!("push relay returned {}: {}", status, response_body)),
            });
        }

        let api_response: PushNotifyResponse = serde_json::from_str(&response_body)
            .map_err(|e| AdapterError::ParseError(e.to_string()))?;

        if api_response.ok {
            Ok(SendResult {
                success: true,
                message_id: api_response.message_id.unwrap_or_default(),
                submitted_at: chrono::Utc::now().to_rfc3339(),
                error: None,
            })
        } else {
            Ok(SendResult {
                success: false,
                message_id: String::new(),
                submitted_at: String::new(),
                error: Some(
                    api_response
                        .error
                        .unwrap_or_else(|| "Unknown error".to_string()),
                ),
            })
        }
    }

    fn channel(&self) -> Channel {
        Channel::Push
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_request_serializes_expected_fields() {
        let request = PushNotifyRequest {
            device_token: "tok-1".to_string(),
            title: "Lead4Tomorrow Calendar 1/5".to_string(),
            body: "body".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["device_token"], "tok-1");
        assert_eq!(value["title"], "Lead4Tomorrow Calendar 1/5");
        assert_eq!(value["body"], "body");
    }

    #[test]
    fn notify_response_parses_rejection() {
        let response: PushNotifyResponse =
            serde_json::from_str(r#"{"ok": false, "error": "invalid device token"}"#).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("invalid device token"));
        assert!(response.message_id.is_none());
    }

    #[test]
    fn missing_relay_config_is_a_config_error() {
        let adapter = PushAdapter::new(None);
        let destination = Destination::Push {
            device_token: "tok".to_string(),
        };

        let err = adapter.send(&destination, "subject", "body").unwrap_err();
        assert!(matches!(err, AdapterError::ConfigError(_)));
    }

    #[test]
    fn rejects_non_push_destination() {
        let adapter = PushAdapter::new(None);
        let destination = Destination::Email {
            address: "a@example.com".to_string(),
        };

        let err = adapter.send(&destination, "subject", "body").unwrap_err();
        assert!(matches!(err, AdapterError::ConfigError(message) if message.contains("email")));
    }
}
