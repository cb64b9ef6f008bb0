use std::collections::HashMap;

use thiserror::Error;

use crate::channel::Channel;
use crate::clock::MonthDay;
use crate::profiles::ProfileSourceError;

/// Per-user record of the last local calendar date a notification was
/// dispatched. Process-memory only: a restart forgets everything, so a
/// matching minute that is still current fires once more.
#[derive(Debug, Default)]
pub struct SentState {
    last_sent: HashMap<String, MonthDay>,
}

impl SentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_sent(&self, user_id: &str, date: MonthDay) -> bool {
        self.last_sent.get(user_id) == Some(&date)
    }

    pub fn mark_sent(&mut self, user_id: &str, date: MonthDay) {
        self.last_sent.insert(user_id.to_string(), date);
    }

    pub fn last_sent(&self, user_id: &str) -> Option<MonthDay> {
        self.last_sent.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}

/// Per-user result of one evaluation pass, recorded for logging and
/// asserted on by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    /// Local clock does not match the profile's notify time.
    NotDue,
    /// A notification already went out on this local date.
    AlreadyNotified,
    /// The profile's notify time can never match a formatted clock.
    InvalidTime { raw: String },
    /// Entry fetch failed; the user stays eligible on this date.
    EntryUnavailable { error: String },
    /// The profile's method names no known channel.
    UnknownMethod { raw: String },
    /// The profile lacks the fields its channel needs.
    BadDestination { channel: Channel, error: String },
    Dispatched { channel: Channel, message_id: String },
    DeliveryFailed { channel: Channel, error: String },
}

impl UserOutcome {
    /// Whether this outcome uses up the user's send slot for the local
    /// date. Unknown methods and bad destinations fail closed for the
    /// day, the same as a transport failure.
    pub fn consumes_slot(&self) -> bool {
        matches!(
            self,
            UserOutcome::Dispatched { .. }
                | UserOutcome::DeliveryFailed { .. }
                | UserOutcome::UnknownMethod { .. }
                | UserOutcome::BadDestination { .. }
        )
    }
}

/// Summary of one full pass over the profile snapshot.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub profiles_seen: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub skipped: usize,
    outcomes: Vec<(String, UserOutcome)>,
}

impl CycleReport {
    pub(super) fn record(&mut self, user_id: &str, outcome: UserOutcome) {
        match &outcome {
            UserOutcome::Dispatched { .. } => self.dispatched += 1,
            UserOutcome::DeliveryFailed { .. }
            | UserOutcome::UnknownMethod { .. }
            | UserOutcome::BadDestination { .. } => self.failed += 1,
            UserOutcome::NotDue
            | UserOutcome::AlreadyNotified
            | UserOutcome::InvalidTime { .. }
            | UserOutcome::EntryUnavailable { .. } => self.skipped += 1,
        }
        self.outcomes.push((user_id.to_string(), outcome));
    }

    pub fn outcome_for(&self, user_id: &str) -> Option<&UserOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, outcome)| outcome)
    }

    pub fn outcomes(&self) -> &[(String, UserOutcome)] {
        &self.outcomes
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("profile snapshot fetch failed: {0}")]
    ProfileFetch(#[from] ProfileSourceError),
}
