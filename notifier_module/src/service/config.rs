use std::env;
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use mailer_module::SmtpConfig;

use crate::adapters::PushRelayConfig;
use crate::carriers::CarrierGateways;

use super::BoxError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
/// Delivery windows are one minute wide; polling slower than this could
/// step over a user's notification minute entirely.
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub profile_api_base_url: String,
    pub calendar_api_base_url: String,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    /// SMTP credentials shared by the email and SMS gateway channels.
    pub smtp: Option<SmtpConfig>,
    /// Push relay endpoint; absent means push deliveries are rejected.
    pub push_relay: Option<PushRelayConfig>,
    pub carrier_gateways: CarrierGateways,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, BoxError> {
        dotenvy::dotenv().ok();

        let profile_api_base_url = env_var_non_empty("PROFILE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let calendar_api_base_url = env_var_non_empty("CALENDAR_API_BASE_URL")
            .unwrap_or_else(|| profile_api_base_url.clone());

        let requested_interval = env::var("NOTIFIER_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let poll_interval_secs = requested_interval.min(MAX_POLL_INTERVAL_SECS);
        if poll_interval_secs != requested_interval {
            warn!(
                "NOTIFIER_POLL_INTERVAL_SECS={} exceeds the delivery window, using {}",
                requested_interval, poll_interval_secs
            );
        }
        let poll_interval = Duration::from_secs(poll_interval_secs);

        let http_timeout = env::var("NOTIFIER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        let smtp = SmtpConfig::from_env();

        let push_relay = env_var_non_empty("PUSH_API_BASE_URL").map(|base_url| PushRelayConfig {
            base_url,
            api_token: env_var_non_empty("PUSH_API_TOKEN"),
        });

        let carrier_gateways = match env_var_non_empty("CARRIER_GATEWAYS_PATH") {
            Some(path) => CarrierGateways::load(Path::new(&path))?,
            None => CarrierGateways::builtin(),
        };

        Ok(Self {
            profile_api_base_url,
            calendar_api_base_url,
            poll_interval,
            http_timeout,
            smtp,
            push_relay,
            carrier_gateways,
        })
    }
}

fn env_var_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        key: String,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let previous = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                previous,
            }
        }

        fn clear(key: &str) -> Self {
            let previous = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                previous,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => env::set_var(&self.key, value),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clear_notifier_env() -> Vec<EnvGuard> {
        [
            "PROFILE_API_BASE_URL",
            "CALENDAR_API_BASE_URL",
            "NOTIFIER_POLL_INTERVAL_SECS",
            "NOTIFIER_HTTP_TIMEOUT_SECS",
            "PUSH_API_BASE_URL",
            "PUSH_API_TOKEN",
            "CARRIER_GATEWAYS_PATH",
            "SMTP_USERNAME",
            "SMTP_PASSWORD",
        ]
        .iter()
        .map(|key| EnvGuard::clear(key))
        .collect()
    }

    #[test]
    fn from_env_uses_documented_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guards = clear_notifier_env();

        let config = ServiceConfig::from_env().expect("config");
        assert_eq!(config.profile_api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.calendar_api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(
            config.poll_interval,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );
        assert!(config.smtp.is_none());
        assert!(config.push_relay.is_none());
        assert_eq!(config.carrier_gateways.domain("att"), Some("txt.att.net"));
    }

    #[test]
    fn calendar_base_url_falls_back_to_profile_base_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guards = clear_notifier_env();
        let _profile = EnvGuard::set("PROFILE_API_BASE_URL", "http://backend:5000");

        let config = ServiceConfig::from_env().expect("config");
        assert_eq!(config.profile_api_base_url, "http://backend:5000");
        assert_eq!(config.calendar_api_base_url, "http://backend:5000");
    }

    #[test]
    fn poll_interval_is_capped_at_the_delivery_window() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guards = clear_notifier_env();
        let _interval = EnvGuard::set("NOTIFIER_POLL_INTERVAL_SECS", "900");

        let config = ServiceConfig::from_env().expect("config");
        assert_eq!(
            config.poll_interval,
            Duration::from_secs(MAX_POLL_INTERVAL_SECS)
        );
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guards = clear_notifier_env();
        let _interval = EnvGuard::set("NOTIFIER_POLL_INTERVAL_SECS", "0");

        let config = ServiceConfig::from_env().expect("config");
        assert_eq!(
            config.poll_interval,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );
    }

    #[test]
    fn push_relay_requires_a_base_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guards = clear_notifier_env();
        let _token = EnvGuard::set("PUSH_API_TOKEN", "secret");

        let config = ServiceConfig::from_env().expect("config");
        assert!(config.push_relay.is_none());

        let _base = EnvGuard::set("PUSH_API_BASE_URL", "http://push.internal:8080");
        let config = ServiceConfig::from_env().expect("config");
        let relay = config.push_relay.expect("push relay");
        assert_eq!(relay.base_url, "http://push.internal:8080");
        assert_eq!(relay.api_token.as_deref(), Some("secret"));
    }
}
