use crate::adapters::{EmailAdapter, PushAdapter, SmsAdapter};
use crate::channel::{AdapterError, Channel, DeliveryAdapter, Destination, SendResult};

/// Routes a rendered message to the adapter for its channel. This is the
/// scheduler's only send-side seam, so tests substitute a recording fake
/// here rather than stubbing individual transports.
pub trait Dispatcher: Send {
    fn dispatch(
        &self,
        channel: Channel,
        destination: &Destination,
        subject: &str,
        body: &str,
    ) -> Result<SendResult, AdapterError>;
}

/// Production dispatcher holding one adapter per channel.
pub struct ChannelDispatcher {
    email: EmailAdapter,
    sms: SmsAdapter,
    push: PushAdapter,
}

impl ChannelDispatcher {
    pub fn new(email: EmailAdapter, sms: SmsAdapter, push: PushAdapter) -> Self {
        Self { email, sms, push }
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(
        &self,
        channel: Channel,
        destination: &Destination,
        subject: &str,
        body: &str,
    ) -> Result<SendResult, AdapterError> {
        match channel {
            Channel::Email => self.email.send(destination, subject, body),
            Channel::Sms => self.sms.send(destination, subject, body),
            Channel::Push => self.push.send(destination, subject, body),
        }
    }
}
