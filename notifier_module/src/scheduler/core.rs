use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::calendar::{CalendarEntry, EntrySource};
use crate::channel::Channel;
use crate::clock::{local_moment, valid_clock_string, Clock, LocalMoment};
use crate::message::{render_body, render_subject};
use crate::profiles::{Profile, ProfileSource};

use super::dispatch::Dispatcher;
use super::types::{CycleReport, SchedulerError, SentState, UserOutcome};

/// Upper bound on one uninterrupted sleep so a stop request is honoured
/// promptly even with a long poll interval.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// The notification loop. Collaborators are injected so tests can drive
/// it with a fixed clock, canned stores, and a recording dispatcher.
///
/// The invariant it enforces: for any user, at most one notification per
/// distinct local calendar date, no matter how many cycles observe the
/// matching minute.
pub struct Scheduler<D: Dispatcher> {
    clock: Box<dyn Clock>,
    profiles: Box<dyn ProfileSource>,
    entries: Box<dyn EntrySource>,
    dispatcher: D,
    sent: SentState,
    /// (user, raw time) pairs already warned about, so a malformed
    /// profile does not flood the log every cycle.
    warned_times: HashSet<(String, String)>,
}

impl<D: Dispatcher> Scheduler<D> {
    pub fn new(
        clock: Box<dyn Clock>,
        profiles: Box<dyn ProfileSource>,
        entries: Box<dyn EntrySource>,
        dispatcher: D,
    ) -> Self {
        Self {
            clock,
            profiles,
            entries,
            dispatcher,
            sent: SentState::new(),
            warned_times: HashSet::new(),
        }
    }

    pub fn sent_state(&self) -> &SentState {
        &self.sent
    }

    /// One full pass: fetch a fresh snapshot, evaluate every profile,
    /// record outcomes. A snapshot fetch failure aborts the pass with no
    /// state change; per-user problems never abort the pass.
    pub fn run_cycle(&mut self) -> Result<CycleReport, SchedulerError> {
        let snapshot = self.profiles.list_profiles()?;
        let now = self.clock.now_utc();

        let mut report = CycleReport::default();
        report.profiles_seen = snapshot.len();
        for (user_id, profile) in &snapshot {
            let outcome = self.evaluate_user(user_id, profile, now);
            log_outcome(user_id, &outcome);
            report.record(user_id, outcome);
        }

        // Deleted profiles should warn again if they ever come back.
        self.warned_times
            .retain(|(user, _)| snapshot.contains_key(user));

        Ok(report)
    }

    fn evaluate_user(&mut self, user_id: &str, profile: &Profile, now: DateTime<Utc>) -> UserOutcome {
        let moment = local_moment(now, profile.offset_hours());

        if self.sent.already_sent(user_id, moment.date) {
            return UserOutcome::AlreadyNotified;
        }

        let notify_time = profile.time.as_deref().unwrap_or("").trim();
        if !valid_clock_string(notify_time) {
            let key = (user_id.to_string(), notify_time.to_string());
            if self.warned_times.insert(key) {
                warn!(
                    "user {} has an unusable notify time {:?}; it will never fire",
                    user_id, notify_time
                );
            }
            return UserOutcome::InvalidTime {
                raw: notify_time.to_string(),
            };
        }
        self.warned_times.retain(|(user, _)| user != user_id);

        if notify_time != moment.clock {
            return UserOutcome::NotDue;
        }

        let entry = match self.entries.get_entry(moment.date.month, moment.date.day) {
            Ok(entry) => entry,
            Err(err) => {
                // No state change: the user stays eligible and the next
                // cycle inside the matching minute retries the fetch.
                return UserOutcome::EntryUnavailable {
                    error: err.to_string(),
                };
            }
        };

        let outcome = self.dispatch_user(user_id, profile, &moment, &entry);
        if outcome.consumes_slot() {
            self.sent.mark_sent(user_id, moment.date);
        }
        outcome
    }

    fn dispatch_user(
        &mut self,
        user_id: &str,
        profile: &Profile,
        moment: &LocalMoment,
        entry: &CalendarEntry,
    ) -> UserOutcome {
        let raw_method = profile.method.as_deref().unwrap_or("").trim();
        let channel = match raw_method.parse::<Channel>() {
            Ok(channel) => channel,
            Err(_) => {
                return UserOutcome::UnknownMethod {
                    raw: raw_method.to_string(),
                }
            }
        };

        let destination = match profile.destination(user_id, channel) {
            Ok(destination) => destination,
            Err(err) => {
                return UserOutcome::BadDestination {
                    channel,
                    error: err.to_string(),
                }
            }
        };

        let subject = render_subject(moment.date);
        let body = render_body(moment, entry);

        match self
            .dispatcher
            .dispatch(channel, &destination, &subject, &body)
        {
            Ok(result) if result.success => UserOutcome::Dispatched {
                channel,
                message_id: result.message_id,
            },
            Ok(result) => UserOutcome::DeliveryFailed {
                channel,
                error: result
                    .error
                    .unwrap_or_else(|| "unknown transport error".to_string()),
            },
            Err(err) => UserOutcome::DeliveryFailed {
                channel,
                error: err.to_string(),
            },
        }
    }

    /// Long-running entry point: evaluate, sleep, repeat until
    /// `stop_flag` is set.
    pub fn run_loop(&mut self, poll_interval: Duration, stop_flag: &AtomicBool) {
        while !stop_flag.load(Ordering::Relaxed) {
            match self.run_cycle() {
                Ok(report) => {
                    if report.dispatched > 0 || report.failed > 0 {
                        info!(
                            "cycle complete: {} profiles, {} dispatched, {} failed",
                            report.profiles_seen, report.dispatched, report.failed
                        );
                    }
                }
                Err(err) => {
                    warn!("cycle skipped: {}", err);
                }
            }
            sleep_until_next_cycle(poll_interval, stop_flag);
        }
    }
}

fn sleep_until_next_cycle(poll_interval: Duration, stop_flag: &AtomicBool) {
    let mut remaining = poll_interval;
    while !remaining.is_zero() && !stop_flag.load(Ordering::Relaxed) {
        let chunk = remaining.min(STOP_CHECK_INTERVAL);
        std::thread::sleep(chunk);
        remaining = remaining.saturating_sub(chunk);
    }
}

fn log_outcome(user_id: &str, outcome: &UserOutcome) {
    match outcome {
        UserOutcome::Dispatched {
            channel,
            message_id,
        } => {
            if message_id.is_empty() {
                info!("notified {} via {}", user_id, channel);
            } else {
                info!(
                    "notified {} via {} (message id {})",
                    user_id, channel, message_id
                );
            }
        }
        UserOutcome::DeliveryFailed { channel, error } => {
            error!("delivery to {} via {} failed: {}", user_id, channel, error);
        }
        UserOutcome::UnknownMethod { raw } => {
            error!("user {} has unknown delivery method {:?}", user_id, raw);
        }
        UserOutcome::BadDestination { channel, error } => {
            error!(
                "user {} cannot receive {} notifications: {}",
                user_id, channel, error
            );
        }
        UserOutcome::EntryUnavailable { error } => {
            warn!("calendar entry unavailable for {}: {}", user_id, error);
        }
        // Routine skips and the once-warned invalid times stay quiet.
        UserOutcome::NotDue | UserOutcome::AlreadyNotified | UserOutcome::InvalidTime { .. } => {}
    }
}
