use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use mailer_module::{send_mail, SendMailParams, SmtpConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn env_enabled(key: &str) -> bool {
    matches!(env::var(key).as_deref(), Ok("1"))
}

fn timestamp_suffix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[test]
fn smtp_live_send() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    if !env_enabled("SMTP_LIVE_TEST") {
        eprintln!("Skipping SMTP live send test. Set SMTP_LIVE_TEST=1 to run.");
        return Ok(());
    }

    let config = SmtpConfig::from_env()
        .ok_or("SMTP_USERNAME and SMTP_PASSWORD must be set for live tests")?;
    let to = env::var("SMTP_LIVE_TEST_TO").unwrap_or_else(|_| config.sender.clone());

    let params = SendMailParams {
        to,
        subject: format!("Notifier SMTP live test {}", timestamp_suffix()),
        body: "Live SMTP delivery check from the notifier test suite.".to_string(),
    };
    send_mail(&config, &params)?;
    Ok(())
}
