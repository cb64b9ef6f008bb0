use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::adapters::{EmailAdapter, PushAdapter, SmsAdapter};
use crate::calendar::HttpEntrySource;
use crate::clock::SystemClock;
use crate::profiles::HttpProfileSource;
use crate::{ChannelDispatcher, Scheduler};

use super::config::ServiceConfig;

/// Handle over the background delivery thread.
pub struct SchedulerControl {
    stop: Arc<AtomicBool>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl SchedulerControl {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_and_join(&mut self) {
        self.stop();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Wires the HTTP sources and channel adapters together and runs the
/// delivery loop on a background thread until the control is stopped.
pub fn start_scheduler_thread(config: &ServiceConfig) -> SchedulerControl {
    let stop = Arc::new(AtomicBool::new(false));

    if config.smtp.is_none() {
        warn!("SMTP credentials are not configured; email and sms deliveries will fail");
    }
    if config.push_relay.is_none() {
        warn!("PUSH_API_BASE_URL is not configured; push deliveries will fail");
    }

    let profiles = HttpProfileSource::new(config.profile_api_base_url.clone(), config.http_timeout);
    let entries = HttpEntrySource::new(config.calendar_api_base_url.clone(), config.http_timeout);
    let dispatcher = ChannelDispatcher::new(
        EmailAdapter::new(config.smtp.clone()),
        SmsAdapter::new(config.smtp.clone(), config.carrier_gateways.clone()),
        PushAdapter::new(config.push_relay.clone()),
    );
    let mut scheduler = Scheduler::new(
        Box::new(SystemClock),
        Box::new(profiles),
        Box::new(entries),
        dispatcher,
    );

    let poll_interval = config.poll_interval;
    let thread_stop = stop.clone();
    let handle = thread::spawn(move || {
        info!(
            "delivery loop started (poll_interval_ms={})",
            poll_interval.as_millis()
        );
        scheduler.run_loop(poll_interval, &thread_stop);
        info!("delivery loop stopped");
    });

    SchedulerControl {
        stop,
        handles: vec![handle],
    }
}
