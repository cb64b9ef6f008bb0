use std::error::Error;

use tracing::info;

use notifier_module::service::{start_scheduler_thread, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = ServiceConfig::from_env()?;
    info!(
        "profile source: {} (calendar: {})",
        config.profile_api_base_url, config.calendar_api_base_url
    );
    info!(
        "poll interval: {}s, smtp configured: {}, push relay configured: {}",
        config.poll_interval.as_secs(),
        config.smtp.is_some(),
        config.push_relay.is_some()
    );

    let mut control = start_scheduler_thread(&config);

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping delivery loop");
    control.stop_and_join();
    Ok(())
}
