//! Vigil: daily coding-activity reminder daemon.
//!
//! Watches whether a user has performed a tracked daily activity (a GitHub
//! commit, or solving the LeetCode daily challenge) and records a reminder
//! when the activity is still missing at a user-configured time of day.
//!
//! # Architecture
//!
//! Independent pieces wired together by the scheduler:
//! - **Probes**: stateless HTTP adapters answering "did it happen today?"
//! - **Stores**: trigger configurations plus the append-only notification ledger
//! - **Evaluator**: one trigger in, one notification record out
//! - **Scheduler**: the per-minute driver with explicit lifecycle state

pub mod config;
pub mod error;
pub mod evaluator;
pub mod probe;
pub mod scheduler;
pub mod store;
pub mod trigger;

pub use config::VigilConfig;
pub use error::{Result, VigilError};
pub use evaluator::TriggerEvaluator;
pub use scheduler::{LifecycleState, SchedulerLoop};
pub use store::{JsonStore, MemoryStore, NotificationLog, TriggerStore};
pub use trigger::{NotificationRecord, Outcome, Platform, Trigger};
