//! Trigger scheduling loop.

mod runner;

pub use runner::{LifecycleState, SchedulerLoop, local_minute_key};
