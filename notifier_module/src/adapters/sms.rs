//! SMS delivery through carrier email-to-SMS gateways.

use mailer_module::{SendMailParams, SmtpConfig};

use crate::carriers::CarrierGateways;
use crate::channel::{AdapterError, Channel, DeliveryAdapter, Destination, SendResult};

use super::email;

/// Texts ride the carriers' mail bridges: the message is mailed to
/// `<digits>@<gateway-domain>` over the same SMTP relay the email channel
/// uses, and the carrier forwards it as SMS.
#[derive(Debug, Clone)]
pub struct SmsAdapter {
    smtp: Option<SmtpConfig>,
    gateways: CarrierGateways,
}

impl SmsAdapter {
    pub fn new(smtp: Option<SmtpConfig>, gateways: CarrierGateways) -> Self {
        Self { smtp, gateways }
    }
}

impl DeliveryAdapter for SmsAdapter {
    fn send(
        &self,
        destination: &Destination,
        subject: &str,
        body: &str,
    ) -> Result<SendResult, AdapterError> {
        let (phone, carrier) = match destination {
            Destination::Sms { phone, carrier } => (phone, carrier),
            other => {
                return Err(AdapterError::ConfigError(format!(
                    "sms adapter received a {} destination",
                    other.channel()
                )))
            }
        };
        let to = self
            .gateways
            .gateway_address(phone, carrier)
            .map_err(|err| AdapterError::ConfigError(err.to_string()))?;
        let smtp = self.smtp.as_ref().ok_or_else(|| {
            AdapterError::ConfigError("smtp credentials are not configured".to_string())
        })?;

        let params = SendMailParams {
            to,
            subject: subject.to_string(),
            body: body.to_string(),
        };
        email::submit(smtp, &params)
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }
}
