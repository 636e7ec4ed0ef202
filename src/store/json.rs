//! JSON-file-backed store.
//!
//! Persists trigger definitions and a bounded notification history to a
//! single versioned state file. A missing file is an empty store; parent
//! directories are created on first save.

use super::{NotificationLog, TriggerStore};
use crate::Result;
use crate::error::VigilError;
use crate::trigger::{NotificationRecord, Trigger};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Number of ledger entries to keep on disk.
const DEFAULT_HISTORY_LIMIT: usize = 400;

/// Persisted store state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    /// Schema version.
    #[serde(default = "default_state_version")]
    version: u8,
    /// Trigger definitions.
    #[serde(default)]
    triggers: Vec<Trigger>,
    /// Notification ledger, oldest first.
    #[serde(default)]
    notifications: Vec<NotificationRecord>,
}

fn default_state_version() -> u8 {
    1
}

/// File-backed implementation of both store traits.
pub struct JsonStore {
    path: PathBuf,
    state: Mutex<StoreState>,
    max_history_entries: usize,
}

impl JsonStore {
    /// Open the store at `path`, starting empty when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(state),
            max_history_entries: DEFAULT_HISTORY_LIMIT,
        })
    }

    /// Override the persisted ledger limit.
    pub fn with_history_limit(mut self, max_entries: usize) -> Self {
        self.max_history_entries = max_entries.max(1);
        self
    }

    /// Default state file path: `~/.local/share/vigil/state.json`.
    pub fn default_state_path() -> PathBuf {
        if let Some(data) = std::env::var_os("XDG_DATA_HOME") {
            PathBuf::from(data).join("vigil").join("state.json")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("vigil")
                .join("state.json")
        } else {
            PathBuf::from("/tmp/vigil/state.json")
        }
    }

    /// Insert a trigger, replacing any existing one with the same id.
    pub fn insert_trigger(&self, trigger: Trigger) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = state.triggers.iter_mut().find(|t| t.id == trigger.id) {
            *existing = trigger;
        } else {
            state.triggers.push(trigger);
        }
        save_state(&self.path, &state)
    }

    /// Remove a trigger by id. Returns `true` when found.
    pub fn remove_trigger(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let before = state.triggers.len();
        state.triggers.retain(|t| t.id != id);
        let removed = state.triggers.len() != before;
        if removed {
            save_state(&self.path, &state)?;
        }
        Ok(removed)
    }

    /// Snapshot of all triggers.
    pub fn triggers(&self) -> Vec<Trigger> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .triggers
            .clone()
    }

    /// Snapshot of the notification ledger, oldest first.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .notifications
            .clone()
    }
}

fn load_state(path: &Path) -> Result<StoreState> {
    let bytes = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(StoreState::default());
        }
        Err(e) => {
            return Err(VigilError::Store(format!("cannot read state: {e}")));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| VigilError::Store(format!("cannot parse state: {e}")))
}

fn save_state(path: &Path, state: &StoreState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| VigilError::Store(format!("cannot create state dir: {e}")))?;
    }

    let json = serde_json::to_string_pretty(state)
        .map_err(|e| VigilError::Store(format!("cannot serialize state: {e}")))?;

    std::fs::write(path, json).map_err(|e| VigilError::Store(format!("cannot write state: {e}")))
}

#[async_trait]
impl TriggerStore for JsonStore {
    async fn find_due(&self, minute: &str) -> Result<Vec<Trigger>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .triggers
            .iter()
            .filter(|t| t.is_due_at(minute))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationLog for JsonStore {
    async fn append(&self, record: NotificationRecord) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.notifications.push(record);
        let len = state.notifications.len();
        if len > self.max_history_entries {
            let drop_count = len - self.max_history_entries;
            state.notifications.drain(0..drop_count);
        }
        save_state(&self.path, &state)
    }
}
