mod core;
mod dispatch;
mod types;

pub use core::Scheduler;
pub use dispatch::{ChannelDispatcher, Dispatcher};
pub use types::{CycleReport, SchedulerError, SentState, UserOutcome};
