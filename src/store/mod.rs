//! Trigger and notification storage.
//!
//! The scheduling core needs only two access patterns: read the triggers
//! due at a given minute, and append evaluation outcomes. Both traits are
//! object-safe so the core runs against [`MemoryStore`] in tests and
//! [`JsonStore`] in the daemon. Triggers are re-read fresh on every cycle;
//! the store is the source of truth between ticks.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::Result;
use crate::trigger::{NotificationRecord, Trigger};
use async_trait::async_trait;

/// Read access to trigger configurations.
#[async_trait]
pub trait TriggerStore: Send + Sync {
    /// Returns all enabled triggers whose `trigger_time` equals `minute`
    /// exactly.
    async fn find_due(&self, minute: &str) -> Result<Vec<Trigger>>;
}

/// Append-only ledger of evaluation outcomes.
#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Append one record.
    ///
    /// Failures must surface as errors so the caller can log them; they are
    /// never fatal to a cycle.
    async fn append(&self, record: NotificationRecord) -> Result<()>;
}
