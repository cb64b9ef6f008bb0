pub mod adapters;
pub mod calendar;
pub mod carriers;
pub mod channel;
pub mod clock;
pub mod message;
pub mod profiles;
pub mod service;

mod scheduler;

pub use scheduler::{
    ChannelDispatcher, CycleReport, Dispatcher, Scheduler, SchedulerError, SentState, UserOutcome,
};
