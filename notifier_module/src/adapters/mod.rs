//! Delivery adapters for the supported notification channels.
//!
//! Each adapter wraps one transport and implements the
//! [`DeliveryAdapter`](crate::channel::DeliveryAdapter) contract: email
//! and SMS share the SMTP relay, push talks to an HTTP relay service.

pub mod email;
pub mod push;
pub mod sms;

pub use email::EmailAdapter;
pub use push::{PushAdapter, PushNotifyRequest, PushNotifyResponse, PushRelayConfig};
pub use sms::SmsAdapter;
