mod config;
mod runtime;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use config::{
    ServiceConfig, DEFAULT_API_BASE_URL, DEFAULT_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS,
};
pub use runtime::{start_scheduler_thread, SchedulerControl};
