//! In-memory store for tests and embedders.

use super::{NotificationLog, TriggerStore};
use crate::Result;
use crate::trigger::{NotificationRecord, Trigger};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mutex-guarded in-memory implementation of both store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    triggers: Mutex<Vec<Trigger>>,
    records: Mutex<Vec<NotificationRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trigger, replacing any existing one with the same id.
    pub fn insert_trigger(&self, trigger: Trigger) {
        let mut triggers = self.triggers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = triggers.iter_mut().find(|t| t.id == trigger.id) {
            *existing = trigger;
        } else {
            triggers.push(trigger);
        }
    }

    /// Remove a trigger by id. Returns `true` when found.
    pub fn remove_trigger(&self, id: &str) -> bool {
        let mut triggers = self.triggers.lock().unwrap_or_else(|e| e.into_inner());
        let before = triggers.len();
        triggers.retain(|t| t.id != id);
        triggers.len() != before
    }

    /// Snapshot of all triggers.
    pub fn triggers(&self) -> Vec<Trigger> {
        self.triggers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Snapshot of the notification ledger.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl TriggerStore for MemoryStore {
    async fn find_due(&self, minute: &str) -> Result<Vec<Trigger>> {
        let triggers = self.triggers.lock().unwrap_or_else(|e| e.into_inner());
        Ok(triggers
            .iter()
            .filter(|t| t.is_due_at(minute))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationLog for MemoryStore {
    async fn append(&self, record: NotificationRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
        Ok(())
    }
}
