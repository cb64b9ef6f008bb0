//! Email delivery over the shared SMTP relay.

use mailer_module::{send_mail, SendMailError, SendMailParams, SmtpConfig};

use crate::channel::{AdapterError, Channel, DeliveryAdapter, Destination, SendResult};

/// Sends the daily message as a plain-text email. The recipient address
/// is the profile key itself.
#[derive(Debug, Clone)]
pub struct EmailAdapter {
    smtp: Option<SmtpConfig>,
}

impl EmailAdapter {
    pub fn new(smtp: Option<SmtpConfig>) -> Self {
        Self { smtp }
    }
}

impl DeliveryAdapter for EmailAdapter {
    fn send(
        &self,
        destination: &Destination,
        subject: &str,
        body: &str,
    ) -> Result<SendResult, AdapterError> {
        let address = match destination {
            Destination::Email { address } => address,
            other => {
                return Err(AdapterError::ConfigError(format!(
                    "email adapter received a {} destination",
                    other.channel()
                )))
            }
        };
        let smtp = self.smtp.as_ref().ok_or_else(|| {
            AdapterError::ConfigError("smtp credentials are not configured".to_string())
        })?;

        let params = SendMailParams {
            to: address.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        };
        submit(smtp, &params)
    }

    fn channel(&self) -> Channel {
        Channel::Email
    }
}

/// Shared SMTP submission path for the email and SMS adapters. Address
/// and compose problems map to `ConfigError`; only a refusal from the
/// relay itself becomes a `SendError`.
pub(super) fn submit(smtp: &SmtpConfig, params: &SendMailParams) -> Result<SendResult, AdapterError> {
    match send_mail(smtp, params) {
        Ok(()) => Ok(SendResult {
            success: true,
            // SMTP submission does not hand back a provider message id.
            message_id: String::new(),
            submitted_at: chrono::Utc::now().to_rfc3339(),
            error: None,
        }),
        Err(SendMailError::Smtp(err)) => Err(AdapterError::SendError(err.to_string())),
        Err(err) => Err(AdapterError::ConfigError(err.to_string())),
    }
}
